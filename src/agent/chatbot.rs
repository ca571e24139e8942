//! Single-turn question answering over stored responses.

use std::sync::Arc;

use super::manager::AgentManager;

pub const NO_MATCH_MESSAGE: &str = "No suitable response found in stored responses.";

const EXIT_COMMANDS: [&str; 3] = ["quit", "exit", "bye"];

/// Whether `input` ends the interactive session.
pub fn is_exit_command(input: &str) -> bool {
    let input = input.trim();
    EXIT_COMMANDS.iter().any(|c| c.eq_ignore_ascii_case(input))
}

pub struct Chatbot {
    manager: AgentManager,
}

impl Chatbot {
    pub fn new(manager: AgentManager) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &AgentManager {
        &self.manager
    }

    /// Answer `query`. Errors are turned into a message for the user.
    pub async fn process_query(&mut self, query: &str) -> String {
        match self.try_process_query(query).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!("Error processing query: {}", e);
                format!("An error occurred: {}", e)
            }
        }
    }

    async fn try_process_query(&mut self, query: &str) -> anyhow::Result<String> {
        self.manager.ensure_initialized();

        let Some(record) = self.manager.check_stored_responses(query).await else {
            return Ok(NO_MATCH_MESSAGE.to_string());
        };

        let tool = AgentManager::create_tool_for_api(&record);
        self.manager.update_tools(Arc::new(tool));
        let executor = self
            .manager
            .executor()
            .ok_or_else(|| anyhow::anyhow!("agent executor is not initialized"))?;
        let outcome = executor.run(query, &[]).await?;
        Ok(outcome.output)
    }
}
