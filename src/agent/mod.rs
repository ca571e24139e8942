//! Agent module - answers questions from stored API responses.
//!
//! Each query goes through these steps:
//! 1. Score every stored response against the query with the model
//! 2. Keep the best one if it clears the relevance threshold
//! 3. Register it as a tool and rebuild the executor
//! 4. Run a short ReAct loop that may call the tool before answering

mod agent_loop;
mod chatbot;
mod manager;
mod prompt;
mod react;
mod relevance;

pub use agent_loop::{AgentOutcome, AgentStep, ReactExecutor, ITERATION_LIMIT_MESSAGE};
pub use chatbot::{is_exit_command, Chatbot, NO_MATCH_MESSAGE};
pub use manager::{AgentManager, AgentState};
pub use prompt::{build_react_prompt, build_relevance_prompt};
pub use react::{parse_step, ParseError, ReactStep};
pub use relevance::{clamp_score, parse_score, select_best, RelevanceScorer};
