//! Parsing of ReAct-formatted model output.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

const FINAL_ANSWER: &str = "Final Answer:";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Missing 'Action:' after 'Thought:'")]
    MissingAction,

    #[error("Missing 'Action Input:' after 'Action:'")]
    MissingActionInput,
}

/// One decoded model turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactStep {
    Action {
        thought: String,
        tool: String,
        input: String,
    },
    Finish {
        thought: String,
        answer: String,
    },
}

fn action_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)Action\s*\d*\s*:(.*?)Action\s*\d*\s*Input\s*\d*\s*:(.*)")
            .expect("valid action regex")
    })
}

fn action_only_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Action\s*\d*\s*:").expect("valid action regex"))
}

/// Text before `end`, without a leading `Thought:` label.
fn thought_before(text: &str, end: usize) -> String {
    let head = text[..end].trim();
    head.strip_prefix("Thought:").unwrap_or(head).trim().to_string()
}

fn clean_input(raw: &str) -> String {
    let raw = raw.split("\nObservation").next().unwrap_or(raw);
    raw.trim().trim_matches('"').trim().to_string()
}

/// Decode model output. Whichever of an action or a final answer comes
/// first decides the step.
pub fn parse_step(text: &str) -> Result<ReactStep, ParseError> {
    let answer_at = text.find(FINAL_ANSWER);
    let action = action_re().captures(text);
    let action_at = action
        .as_ref()
        .and_then(|c| c.get(0))
        .map(|m| m.start());

    if let Some(answer_at) = answer_at {
        if action_at.map_or(true, |a| answer_at < a) {
            let answer = text[answer_at + FINAL_ANSWER.len()..].trim().to_string();
            return Ok(ReactStep::Finish {
                thought: thought_before(text, answer_at),
                answer,
            });
        }
    }

    match action {
        Some(caps) => {
            let start = caps.get(0).map_or(0, |m| m.start());
            let tool = caps
                .get(1)
                .map_or("", |m| m.as_str())
                .trim()
                .trim_matches('*')
                .trim()
                .to_string();
            let input = clean_input(caps.get(2).map_or("", |m| m.as_str()));
            Ok(ReactStep::Action {
                thought: thought_before(text, start),
                tool,
                input,
            })
        }
        None if action_only_re().is_match(text) => Err(ParseError::MissingActionInput),
        None => Err(ParseError::MissingAction),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_action_with_quoted_input() {
        let step = parse_step(
            "Thought: I should check the weather tool\nAction: api_weather\nAction Input: \"today\"",
        )
        .unwrap();
        assert_eq!(
            step,
            ReactStep::Action {
                thought: "I should check the weather tool".to_string(),
                tool: "api_weather".to_string(),
                input: "today".to_string(),
            }
        );
    }

    #[test]
    fn parses_final_answer() {
        let step =
            parse_step("Thought: I have all the information I need\nFinal Answer: It is 21C.")
                .unwrap();
        assert_eq!(
            step,
            ReactStep::Finish {
                thought: "I have all the information I need".to_string(),
                answer: "It is 21C.".to_string(),
            }
        );
    }

    #[test]
    fn bare_answer_without_thought() {
        let step = parse_step("Final Answer: yes").unwrap();
        assert!(matches!(step, ReactStep::Finish { ref answer, .. } if answer == "yes"));
    }

    #[test]
    fn action_before_answer_wins() {
        let step = parse_step(
            "Action: api_users\nAction Input: all\nObservation: ...\nFinal Answer: guessed",
        )
        .unwrap();
        match step {
            ReactStep::Action { tool, input, .. } => {
                assert_eq!(tool, "api_users");
                assert_eq!(input, "all");
            }
            other => panic!("expected action, got {other:?}"),
        }
    }

    #[test]
    fn answer_before_action_wins() {
        let step = parse_step("Final Answer: done. Action: x\nAction Input: y").unwrap();
        assert!(matches!(step, ReactStep::Finish { .. }));
    }

    #[test]
    fn reports_missing_pieces() {
        assert_eq!(
            parse_step("I am just chatting"),
            Err(ParseError::MissingAction)
        );
        assert_eq!(
            parse_step("Thought: hmm\nAction: api_weather"),
            Err(ParseError::MissingActionInput)
        );
    }
}
