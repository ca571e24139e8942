//! Prompt templates for the agent.

use crate::catalog::ApiDescriptor;
use crate::llm::{ChatMessage, Role};
use crate::responses::ResponseRecord;
use crate::tools::ToolRegistry;

/// Prompt asking the model for a bare relevance number.
pub fn build_relevance_prompt(query: &str, response: &ResponseRecord) -> String {
    format!(
        r#"Given the query: {query}
And the API response: {response}
Rate how relevant the response is to the query on a scale from 0 to 1.
Return only the number."#,
        query = query,
        response = response.to_json_string()
    )
}

/// Render the ReAct prompt for one iteration.
///
/// `scratchpad` holds the Thought/Action/Observation turns taken so far.
pub fn build_react_prompt(
    apis: &[ApiDescriptor],
    tools: &ToolRegistry,
    history: &[ChatMessage],
    input: &str,
    scratchpad: &str,
) -> String {
    let tool_descriptions = tools
        .list_tools()
        .iter()
        .map(|t| format!("- {}: {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n");
    let tool_names = tools.names().join(", ");

    let api_context = if apis.is_empty() {
        "No APIs are configured.".to_string()
    } else {
        apis.iter()
            .map(|api| format!("- {} ({} {})", api.name, api.method, api.url))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let chat_history = history
        .iter()
        .map(|m| {
            let speaker = match m.role {
                Role::User => "Human",
                Role::Assistant => "Assistant",
                Role::System => "System",
            };
            format!("{}: {}", speaker, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a helpful assistant that answers questions using stored API responses.
The responses were collected from these APIs:
{api_context}

You have access to the following tools:
{tool_descriptions}

The available tools are: {tool_names}

To use a tool, you MUST use the following format:
Thought: I need to use X tool because...
Action: the_tool_name
Action Input: the input to the tool
Observation: the result of the action

When you have a final response:
Thought: I have all the information I need...
Final Answer: your response

Current conversation:
{chat_history}
Human: {input}
Assistant: Let me help you with that.
{scratchpad}"#,
        api_context = api_context,
        tool_descriptions = tool_descriptions,
        tool_names = tool_names,
        chat_history = chat_history,
        input = input,
        scratchpad = scratchpad
    )
}
