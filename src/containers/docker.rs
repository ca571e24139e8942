//! Docker backend driven through the `docker` CLI.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::runtime::{ContainerError, ContainerResult, ContainerRuntime, ContainerSpec};

/// Runs containers by shelling out to a docker-compatible CLI.
#[derive(Debug, Clone)]
pub struct DockerCli {
    cli: String,
}

impl DockerCli {
    pub fn new() -> Self {
        Self::with_cli("docker")
    }

    /// Use a different binary with the same command surface (e.g. `podman`).
    pub fn with_cli(cli: impl Into<String>) -> Self {
        Self { cli: cli.into() }
    }

    /// Run the CLI and fail on a non-zero exit status.
    async fn checked(&self, args: &[String]) -> ContainerResult<()> {
        let command = format!("{} {}", self.cli, args.first().map(String::as_str).unwrap_or(""));
        let output = Command::new(&self.cli)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ContainerError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ContainerError::CommandFailed {
                command,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(())
    }

    /// Run the CLI discarding output and exit status.
    async fn quiet(&self, args: &[&str]) {
        let _ = Command::new(&self.cli)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn build_image(&self, tag: &str, context: &Path) -> ContainerResult<()> {
        tracing::info!("Building image {} from {}", tag, context.display());
        let args = vec![
            "build".to_string(),
            "-t".to_string(),
            tag.to_string(),
            context.display().to_string(),
        ];
        self.checked(&args).await
    }

    async fn remove_container(&self, name: &str) {
        self.quiet(&["rm", "-f", name]).await;
    }

    async fn run_container(&self, spec: &ContainerSpec) -> ContainerResult<()> {
        self.checked(&spec.to_run_args()).await
    }

    /// Stop then remove `name`. Removal is attempted even when stop fails;
    /// the first error is returned.
    async fn stop_container(&self, name: &str) -> ContainerResult<()> {
        let stopped = self.checked(&["stop".to_string(), name.to_string()]).await;
        let removed = self.checked(&["rm".to_string(), name.to_string()]).await;
        stopped.and(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let docker = DockerCli::with_cli("definitely-not-a-container-cli");
        let err = docker
            .build_image("t:latest", Path::new("."))
            .await
            .unwrap_err();
        assert!(matches!(err, ContainerError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_command_reports_stderr() {
        // `false` ignores its arguments and exits 1.
        let docker = DockerCli::with_cli("false");
        let err = docker.stop_container("x").await.unwrap_err();
        match err {
            ContainerError::CommandFailed { command, .. } => assert_eq!(command, "false stop"),
            other => panic!("unexpected error: {other}"),
        }
    }

    /// Write an executable CLI stand-in that logs its arguments and fails on `stop`.
    #[cfg(unix)]
    fn scripted_cli(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
        use std::os::unix::fs::PermissionsExt;

        let log = dir.join("calls.log");
        let cli = dir.join("fake-docker");
        let script = format!(
            "#!/bin/sh\necho \"$@\" >> '{}'\n[ \"$1\" = stop ] && {{ echo 'no such container' >&2; exit 1; }}\nexit 0\n",
            log.display()
        );
        std::fs::write(&cli, script).unwrap();
        std::fs::set_permissions(&cli, std::fs::Permissions::from_mode(0o755)).unwrap();
        (cli, log)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stop_failure_still_removes_container() {
        let tmp = tempfile::tempdir().unwrap();
        let (cli, log) = scripted_cli(tmp.path());
        let docker = DockerCli::with_cli(cli.display().to_string());

        let err = docker.stop_container("api-runner-1").await.unwrap_err();
        match err {
            ContainerError::CommandFailed { command, stderr } => {
                assert!(command.ends_with(" stop"));
                assert_eq!(stderr, "no such container");
            }
            other => panic!("unexpected error: {other}"),
        }

        let calls = std::fs::read_to_string(&log).unwrap();
        assert_eq!(calls, "stop api-runner-1\nrm api-runner-1\n");
    }

    #[tokio::test]
    async fn remove_is_best_effort() {
        let docker = DockerCli::with_cli("definitely-not-a-container-cli");
        docker.remove_container("anything").await;
    }
}
