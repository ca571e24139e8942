//! Relevance scoring of stored responses against a query.

use std::sync::Arc;

use crate::llm::{CompletionRequest, LlmClient};
use crate::responses::ResponseRecord;

use super::prompt::build_relevance_prompt;

/// Parse a model reply such as `"0.85"`. NaN is rejected.
pub fn parse_score(text: &str) -> Option<f64> {
    let value: f64 = text.trim().parse().ok()?;
    (!value.is_nan()).then_some(value)
}

pub fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Index of the first strictly-highest score, if it exceeds `threshold`.
pub fn select_best(scores: &[f64], threshold: f64) -> Option<usize> {
    let mut best: Option<usize> = None;
    let mut best_score = 0.0;

    for (index, &score) in scores.iter().enumerate() {
        if score > best_score {
            best_score = score;
            best = Some(index);
        }
    }

    best.filter(|_| best_score > threshold)
}

/// Asks the model how well a stored response answers a query.
pub struct RelevanceScorer {
    llm: Arc<dyn LlmClient>,
    model: String,
}

impl RelevanceScorer {
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    /// Score in `[0, 1]`. Any call or parse failure scores exactly 0.
    pub async fn score(&self, query: &str, response: &ResponseRecord) -> f64 {
        let prompt = build_relevance_prompt(query, response);
        let reply = match self
            .llm
            .complete(CompletionRequest::prompt(&self.model, prompt))
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("Scoring {} failed: {}", response.api_name, e);
                return 0.0;
            }
        };

        match parse_score(&reply) {
            Some(score) => clamp_score(score),
            None => {
                tracing::warn!(
                    "Unparseable relevance score for {}: {:?}",
                    response.api_name,
                    reply
                );
                0.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::FnLlm;
    use crate::llm::LlmError;
    use serde_json::json;

    fn record() -> ResponseRecord {
        ResponseRecord::success("weather", 8000, 200, json!({"temp": 21}))
    }

    async fn score_with_reply(reply: &'static str) -> f64 {
        let llm = Arc::new(FnLlm::new(move |_: &str| Ok(reply.to_string())));
        RelevanceScorer::new(llm, "m").score("warm?", &record()).await
    }

    #[test]
    fn parse_score_trims_and_rejects_garbage() {
        assert_eq!(parse_score(" 0.42\n"), Some(0.42));
        assert_eq!(parse_score("high"), None);
        assert_eq!(parse_score("NaN"), None);
        assert_eq!(parse_score(""), None);
    }

    #[tokio::test]
    async fn out_of_range_scores_are_clamped() {
        assert_eq!(score_with_reply("1.7").await, 1.0);
        assert_eq!(score_with_reply("-0.3").await, 0.0);
        assert_eq!(score_with_reply("0.65").await, 0.65);
    }

    #[tokio::test]
    async fn failures_score_zero() {
        assert_eq!(score_with_reply("definitely relevant").await, 0.0);

        let llm = Arc::new(FnLlm::new(|_: &str| Err(LlmError::EmptyResponse)));
        let score = RelevanceScorer::new(llm, "m").score("q", &record()).await;
        assert_eq!(score, 0.0);
    }

    #[test]
    fn selects_highest_above_threshold() {
        assert_eq!(select_best(&[0.9, 0.5, 0.71], 0.7), Some(0));
        assert_eq!(select_best(&[0.3, 0.5], 0.7), None);
    }

    #[test]
    fn ties_keep_first_and_threshold_is_strict() {
        assert_eq!(select_best(&[0.8, 0.8], 0.7), Some(0));
        assert_eq!(select_best(&[0.7], 0.7), None);
        assert_eq!(select_best(&[], 0.0), None);
        assert_eq!(select_best(&[0.0, 0.0], 0.0), None);
    }
}
