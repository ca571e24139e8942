//! Agent context: owns the model client, the toolset and the executor built from it.

use std::path::PathBuf;
use std::sync::Arc;

use crate::catalog::{ApiCatalog, ApiDescriptor, CatalogError};
use crate::config::AgentConfig;
use crate::llm::LlmClient;
use crate::responses::{ResponseRecord, ResponseStore};
use crate::tools::{CachedResponseTool, Tool, ToolRegistry};

use super::agent_loop::ReactExecutor;
use super::relevance::{select_best, RelevanceScorer};

/// Whether an executor has been built, and from which toolset.
pub enum AgentState {
    Uninitialized,
    Initialized(ReactExecutor),
}

pub struct AgentManager {
    llm: Arc<dyn LlmClient>,
    config: AgentConfig,
    db_path: PathBuf,
    store: ResponseStore,
    scorer: RelevanceScorer,
    apis: Vec<ApiDescriptor>,
    tools: ToolRegistry,
    state: AgentState,
}

impl AgentManager {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        config: AgentConfig,
        db_path: PathBuf,
        store: ResponseStore,
    ) -> Self {
        let scorer = RelevanceScorer::new(llm.clone(), config.model.clone());
        Self {
            llm,
            config,
            db_path,
            store,
            scorer,
            apis: Vec::new(),
            tools: ToolRegistry::new(),
            state: AgentState::Uninitialized,
        }
    }

    /// Load the catalog; descriptors are only used as prompt context.
    pub fn load_apis(&mut self) -> Result<&[ApiDescriptor], CatalogError> {
        self.apis = ApiCatalog::load(&self.db_path)?.apis;
        Ok(&self.apis)
    }

    pub fn apis(&self) -> &[ApiDescriptor] {
        &self.apis
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.executor().is_some()
    }

    /// The executor built by the last initialization.
    pub fn executor(&self) -> Option<&ReactExecutor> {
        match &self.state {
            AgentState::Initialized(executor) => Some(executor),
            AgentState::Uninitialized => None,
        }
    }

    /// Build a fresh executor from the current toolset.
    pub fn initialize(&mut self) {
        tracing::info!(
            "Initializing agent with {} tools (toolset v{})",
            self.tools.len(),
            self.tools.version()
        );
        let executor = ReactExecutor::new(
            self.llm.clone(),
            self.config.model.clone(),
            self.config.max_iterations,
            self.apis.clone(),
            self.tools.clone(),
        );
        self.state = AgentState::Initialized(executor);
    }

    /// Reuse the current executor unless the toolset changed since it was built.
    pub fn ensure_initialized(&mut self) {
        let current = self
            .executor()
            .is_some_and(|executor| executor.toolset_version() == self.tools.version());
        if !current {
            self.initialize();
        }
    }

    /// Best stored response for `query`, if any scores above the threshold.
    pub async fn check_stored_responses(&self, query: &str) -> Option<ResponseRecord> {
        let stored = match self.store.load_all().await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::error!("Error checking stored responses: {}", e);
                return None;
            }
        };

        let mut scores = Vec::with_capacity(stored.len());
        for candidate in &stored {
            let score = self.scorer.score(query, &candidate.record).await;
            tracing::debug!("{} scored {:.2}", candidate.record.api_name, score);
            scores.push(score);
        }

        let best = select_best(&scores, self.config.relevance_threshold)?;
        let chosen = stored.into_iter().nth(best)?;
        tracing::info!(
            "Using stored response {} (score {:.2})",
            chosen.path.display(),
            scores[best]
        );
        Some(chosen.record)
    }

    pub fn create_tool_for_api(record: &ResponseRecord) -> CachedResponseTool {
        CachedResponseTool::new(record)
    }

    /// Register `tool` and rebuild the executor.
    pub fn update_tools(&mut self, tool: Arc<dyn Tool>) {
        self.tools.register(tool);
        self.initialize();
    }
}
