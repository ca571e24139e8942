//! Container runtime abstraction and the run specification it consumes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("{count} containers do not fit in the port range starting at {base_port}")]
    PortRange { base_port: u16, count: usize },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ContainerResult<T> = Result<T, ContainerError>;

/// A host path mounted into the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMount {
    pub host: PathBuf,
    pub container: String,
}

/// A published port, `host:container`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortMapping {
    pub host: u16,
    pub container: u16,
}

/// Everything needed to start one detached container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub env: Vec<(String, String)>,
    pub ports: Vec<PortMapping>,
    pub volumes: Vec<VolumeMount>,
}

impl ContainerSpec {
    /// Arguments for `docker run`, starting with `run`.
    pub fn to_run_args(&self) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            self.name.clone(),
        ];

        for (key, value) in &self.env {
            args.extend(["-e".to_string(), format!("{}={}", key, value)]);
        }
        for port in &self.ports {
            args.extend(["-p".to_string(), format!("{}:{}", port.host, port.container)]);
        }
        for volume in &self.volumes {
            args.extend([
                "-v".to_string(),
                format!("{}:{}", volume.host.display(), volume.container),
            ]);
        }

        args.push(self.image.clone());
        args
    }
}

/// Operations the container manager needs from a container engine.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    async fn build_image(&self, tag: &str, context: &Path) -> ContainerResult<()>;

    /// Force-remove a container. Best-effort: never fails.
    async fn remove_container(&self, name: &str);

    async fn run_container(&self, spec: &ContainerSpec) -> ContainerResult<()>;

    async fn stop_container(&self, name: &str) -> ContainerResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_args_follow_flag_order() {
        let spec = ContainerSpec {
            name: "api-runner-1".to_string(),
            image: "api-runner:latest".to_string(),
            env: vec![("API_ID".to_string(), "1".to_string())],
            ports: vec![PortMapping {
                host: 8000,
                container: 8000,
            }],
            volumes: vec![
                VolumeMount {
                    host: PathBuf::from("/srv/responses"),
                    container: "/app/responses".to_string(),
                },
                VolumeMount {
                    host: PathBuf::from("/srv/db.json"),
                    container: "/app/db.json".to_string(),
                },
            ],
        };

        assert_eq!(
            spec.to_run_args(),
            vec![
                "run",
                "-d",
                "--name",
                "api-runner-1",
                "-e",
                "API_ID=1",
                "-p",
                "8000:8000",
                "-v",
                "/srv/responses:/app/responses",
                "-v",
                "/srv/db.json:/app/db.json",
                "api-runner:latest",
            ]
        );
    }
}
