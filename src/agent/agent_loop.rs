//! Core ReAct loop implementation.

use std::sync::Arc;

use crate::catalog::ApiDescriptor;
use crate::llm::{ChatMessage, CompletionRequest, LlmClient};
use crate::tools::ToolRegistry;

use super::prompt::build_react_prompt;
use super::react::{parse_step, ReactStep};

/// Output when the loop runs out of iterations.
pub const ITERATION_LIMIT_MESSAGE: &str = "Agent stopped due to iteration limit.";

const STOP_SEQUENCE: &str = "\nObservation:";

/// A tool invocation made while answering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentStep {
    pub tool: String,
    pub input: String,
    pub observation: String,
}

#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub output: String,
    pub steps: Vec<AgentStep>,
}

/// Runs the ReAct loop against a fixed snapshot of the toolset.
pub struct ReactExecutor {
    llm: Arc<dyn LlmClient>,
    model: String,
    max_iterations: usize,
    apis: Vec<ApiDescriptor>,
    tools: ToolRegistry,
}

impl ReactExecutor {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        model: impl Into<String>,
        max_iterations: usize,
        apis: Vec<ApiDescriptor>,
        tools: ToolRegistry,
    ) -> Self {
        Self {
            llm,
            model: model.into(),
            max_iterations,
            apis,
            tools,
        }
    }

    /// Version of the toolset this executor was built from.
    pub fn toolset_version(&self) -> u64 {
        self.tools.version()
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Answer `input`, calling tools as the model requests.
    pub async fn run(&self, input: &str, history: &[ChatMessage]) -> anyhow::Result<AgentOutcome> {
        let mut scratchpad = String::new();
        let mut steps = Vec::new();

        for iteration in 0..self.max_iterations {
            tracing::debug!("Agent iteration {}", iteration + 1);

            let prompt = build_react_prompt(&self.apis, &self.tools, history, input, &scratchpad);
            let request = CompletionRequest::prompt(&self.model, prompt).with_stop(STOP_SEQUENCE);
            let reply = self.llm.complete(request).await?;
            let reply = reply
                .split(STOP_SEQUENCE)
                .next()
                .unwrap_or_default()
                .trim_end()
                .to_string();

            let observation = match parse_step(&reply) {
                Ok(ReactStep::Finish { answer, .. }) => {
                    tracing::info!("Agent finished after {} iterations", iteration + 1);
                    return Ok(AgentOutcome {
                        output: answer,
                        steps,
                    });
                }
                Ok(ReactStep::Action { tool, input, .. }) => {
                    let observation = self.observe(&tool, &input).await;
                    steps.push(AgentStep {
                        tool,
                        input,
                        observation: observation.clone(),
                    });
                    observation
                }
                Err(e) => {
                    tracing::warn!("Could not parse model output: {}", e);
                    format!("Invalid Format: {}", e)
                }
            };

            scratchpad.push_str(&reply);
            scratchpad.push_str("\nObservation: ");
            scratchpad.push_str(&observation);
            scratchpad.push_str("\nThought: ");
        }

        tracing::warn!("Max iterations ({}) reached", self.max_iterations);
        Ok(AgentOutcome {
            output: ITERATION_LIMIT_MESSAGE.to_string(),
            steps,
        })
    }

    async fn observe(&self, tool: &str, input: &str) -> String {
        if !self.tools.contains(tool) {
            return format!(
                "{} is not a valid tool, try one of [{}].",
                tool,
                self.tools.names().join(", ")
            );
        }

        tracing::info!("Calling tool: {} with input: {}", tool, input);
        match self.tools.execute(tool, input).await {
            Ok(output) => output,
            Err(e) => format!("Error: {}", e),
        }
    }
}
