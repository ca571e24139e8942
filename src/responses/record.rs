//! The record written after each API call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of a single API invocation.
///
/// Serialized flat: `{api_name, port, timestamp, status_code, response}` on
/// success, `{api_name, port, timestamp, error}` on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub api_name: String,
    pub port: u16,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: CallOutcome,
}

/// What the call produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallOutcome {
    /// The server answered with a JSON body (any status code)
    Success { status_code: u16, response: Value },
    /// Transport, header or body decoding failure
    Failure { error: String },
}

impl ResponseRecord {
    pub fn success(api_name: impl Into<String>, port: u16, status_code: u16, response: Value) -> Self {
        Self {
            api_name: api_name.into(),
            port,
            timestamp: Utc::now(),
            outcome: CallOutcome::Success {
                status_code,
                response,
            },
        }
    }

    pub fn failure(api_name: impl Into<String>, port: u16, error: impl Into<String>) -> Self {
        Self {
            api_name: api_name.into(),
            port,
            timestamp: Utc::now(),
            outcome: CallOutcome::Failure {
                error: error.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, CallOutcome::Success { .. })
    }

    pub fn status_code(&self) -> Option<u16> {
        match &self.outcome {
            CallOutcome::Success { status_code, .. } => Some(*status_code),
            CallOutcome::Failure { .. } => None,
        }
    }

    pub fn response(&self) -> Option<&Value> {
        match &self.outcome {
            CallOutcome::Success { response, .. } => Some(response),
            CallOutcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            CallOutcome::Success { .. } => None,
            CallOutcome::Failure { error } => Some(error),
        }
    }

    /// Compact JSON form, as handed to the language model and returned by tools.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_serializes_without_error_field() {
        let record = ResponseRecord::success("weather", 8000, 200, json!({"temp": 21}));
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["api_name"], "weather");
        assert_eq!(value["port"], 8000);
        assert_eq!(value["status_code"], 200);
        assert_eq!(value["response"]["temp"], 21);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn failure_serializes_without_status_or_response() {
        let record = ResponseRecord::failure("weather", 8000, "connection refused");
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["error"], "connection refused");
        assert!(value.get("status_code").is_none());
        assert!(value.get("response").is_none());
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn deserializes_both_shapes() {
        let ok: ResponseRecord = serde_json::from_value(json!({
            "api_name": "users",
            "port": 8001,
            "status_code": 404,
            "timestamp": "2024-05-01T10:00:00Z",
            "response": {"detail": "not found"}
        }))
        .unwrap();
        assert_eq!(ok.status_code(), Some(404));
        assert_eq!(ok.response().unwrap()["detail"], "not found");

        let failed: ResponseRecord = serde_json::from_value(json!({
            "api_name": "users",
            "port": 8001,
            "error": "timed out",
            "timestamp": "2024-05-01T10:00:00+02:00"
        }))
        .unwrap();
        assert!(!failed.is_success());
        assert_eq!(failed.error(), Some("timed out"));
        assert_eq!(failed.timestamp.to_rfc3339(), "2024-05-01T08:00:00+00:00");
    }
}
