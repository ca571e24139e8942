//! Tool that serves a stored API response.

use async_trait::async_trait;

use super::Tool;
use crate::responses::ResponseRecord;

/// Returns the same stored record on every call, whatever the input.
pub struct CachedResponseTool {
    name: String,
    description: String,
    payload: String,
}

impl CachedResponseTool {
    pub fn new(record: &ResponseRecord) -> Self {
        Self {
            name: format!("api_{}", record.api_name),
            description: format!("Use this tool for queries about {}", record.api_name),
            payload: record.to_json_string(),
        }
    }
}

#[async_trait]
impl Tool for CachedResponseTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn execute(&self, _input: &str) -> anyhow::Result<String> {
        Ok(self.payload.clone())
    }
}
