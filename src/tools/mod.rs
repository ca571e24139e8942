//! Tools the agent can invoke, and the registry that holds them.

mod cached;

use std::sync::Arc;

use async_trait::async_trait;

pub use cached::CachedResponseTool;

/// A named unit of work the agent may call with a free-text input.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    async fn execute(&self, input: &str) -> anyhow::Result<String>;
}

/// Name and description, as shown to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

/// Ordered set of tools with unique names.
///
/// `version` increases on every registration so holders of a snapshot can
/// tell when theirs is stale.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    version: u64,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool, replacing any tool with the same name in place.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(index) => {
                tracing::debug!("Replacing tool {}", tool.name());
                self.tools[index] = tool;
            }
            None => {
                tracing::debug!("Registering tool {}", tool.name());
                self.tools.push(tool);
            }
        }
        self.version += 1;
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn list_tools(&self) -> Vec<ToolInfo> {
        self.tools
            .iter()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run the named tool.
    pub async fn execute(&self, name: &str, input: &str) -> anyhow::Result<String> {
        let tool = self
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown tool: {}", name))?;
        tool.execute(input).await
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .field("version", &self.version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo(&'static str);

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "Echoes its input"
        }

        async fn execute(&self, input: &str) -> anyhow::Result<String> {
            Ok(format!("{}:{}", self.0, input))
        }
    }

    #[tokio::test]
    async fn register_and_execute() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register(Arc::new(Echo("a")));
        registry.register(Arc::new(Echo("b")));

        assert_eq!(registry.names(), vec!["a", "b"]);
        assert_eq!(registry.execute("b", "hi").await.unwrap(), "b:hi");
        assert!(registry.execute("c", "hi").await.is_err());
    }

    #[test]
    fn same_name_replaces_and_bumps_version() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo("a")));
        registry.register(Arc::new(Echo("b")));
        registry.register(Arc::new(Echo("a")));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["a", "b"]);
        assert_eq!(registry.version(), 3);
    }
}
