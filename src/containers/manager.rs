//! One runner container per catalog entry.
//!
//! The manager tracks the containers it started so a failed or interrupted
//! startup can be rolled back.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use super::runtime::{
    ContainerError, ContainerResult, ContainerRuntime, ContainerSpec, PortMapping, VolumeMount,
};
use crate::catalog::{ApiCatalog, ApiDescriptor};
use crate::config::Config;

/// Prefix of every runner container name.
pub const CONTAINER_PREFIX: &str = "api-runner";

/// Where the runner image expects its inputs.
pub const CONTAINER_RESPONSES_DIR: &str = "/app/responses";
pub const CONTAINER_DB_PATH: &str = "/app/db.json";

/// Give each descriptor `base_port + index`, in list order.
///
/// Fails without touching `apis` when the last port would exceed `u16::MAX`.
pub fn assign_ports(apis: &mut [ApiDescriptor], base_port: u16) -> ContainerResult<()> {
    let out_of_range = || ContainerError::PortRange {
        base_port,
        count: apis.len(),
    };
    let last = u16::try_from(apis.len().saturating_sub(1)).map_err(|_| out_of_range())?;
    base_port.checked_add(last).ok_or_else(out_of_range)?;

    for (offset, api) in (0u16..).zip(apis.iter_mut()) {
        api.port = Some(base_port + offset);
    }
    Ok(())
}

/// Name of the container that runs `api`.
pub fn container_name(api: &ApiDescriptor) -> String {
    format!("{}-{}", CONTAINER_PREFIX, api.id)
}

fn absolute(path: &Path) -> ContainerResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|source| ContainerError::Io {
            path: path.to_path_buf(),
            source,
        })
}

pub struct ContainerManager {
    runtime: Arc<dyn ContainerRuntime>,
    apis: Vec<ApiDescriptor>,
    image: String,
    build_context: PathBuf,
    responses_dir: PathBuf,
    db_path: PathBuf,
    containers: Vec<String>,
}

impl ContainerManager {
    /// Create a manager for `catalog`, assigning ports from `config.containers.base_port`.
    pub fn new(
        runtime: Arc<dyn ContainerRuntime>,
        catalog: ApiCatalog,
        config: &Config,
    ) -> ContainerResult<Self> {
        let mut apis = catalog.apis;
        assign_ports(&mut apis, config.containers.base_port)?;

        Ok(Self {
            runtime,
            apis,
            image: config.containers.image.clone(),
            build_context: config.containers.build_context.clone(),
            responses_dir: config.responses_dir.clone(),
            db_path: config.db_path.clone(),
            containers: Vec::new(),
        })
    }

    pub fn apis(&self) -> &[ApiDescriptor] {
        &self.apis
    }

    /// Names of the containers started by this manager.
    pub fn containers(&self) -> &[String] {
        &self.containers
    }

    pub async fn build_image(&self) -> ContainerResult<&str> {
        self.runtime
            .build_image(&self.image, &self.build_context)
            .await?;
        Ok(&self.image)
    }

    /// Run specification for one descriptor.
    pub fn spec_for(&self, api: &ApiDescriptor) -> ContainerResult<ContainerSpec> {
        let port = api.port_or_default();
        Ok(ContainerSpec {
            name: container_name(api),
            image: self.image.clone(),
            env: vec![("API_ID".to_string(), api.id.to_string())],
            ports: vec![PortMapping {
                host: port,
                container: port,
            }],
            volumes: vec![
                VolumeMount {
                    host: absolute(&self.responses_dir)?,
                    container: CONTAINER_RESPONSES_DIR.to_string(),
                },
                VolumeMount {
                    host: absolute(&self.db_path)?,
                    container: CONTAINER_DB_PATH.to_string(),
                },
            ],
        })
    }

    /// Replace any container with the same name and start a fresh one.
    pub async fn start_container(&mut self, api: &ApiDescriptor) -> ContainerResult<()> {
        let spec = self.spec_for(api)?;

        self.runtime.remove_container(&spec.name).await;
        self.runtime.run_container(&spec).await?;

        info!(
            "Started container {} for API {} on port {}",
            spec.name,
            api.name,
            api.port_or_default()
        );
        self.containers.push(spec.name);
        Ok(())
    }

    /// Build the image and start every container. Rolls back on failure.
    pub async fn start_all(&mut self) -> ContainerResult<()> {
        match self.try_start_all().await {
            Ok(()) => {
                info!("Successfully started {} containers", self.apis.len());
                Ok(())
            }
            Err(e) => {
                error!("Error starting containers: {}", e);
                self.stop_all().await;
                Err(e)
            }
        }
    }

    async fn try_start_all(&mut self) -> ContainerResult<()> {
        tokio::fs::create_dir_all(&self.responses_dir)
            .await
            .map_err(|source| ContainerError::Io {
                path: self.responses_dir.clone(),
                source,
            })?;

        self.build_image().await?;

        let apis = self.apis.clone();
        for api in &apis {
            self.start_container(api).await?;
        }
        Ok(())
    }

    /// Stop and remove every tracked container. Errors are logged only.
    pub async fn stop_all(&mut self) {
        for name in self.containers.drain(..) {
            if let Err(e) = self.runtime.stop_container(&name).await {
                warn!("Failed to stop {}: {}", name, e);
            }
        }
        info!("All containers stopped and removed");
    }

    /// Remove the container of every catalog entry, tracked or not.
    pub async fn down_all(&mut self) {
        self.containers.clear();
        for api in &self.apis {
            let name = container_name(api);
            self.runtime.remove_container(&name).await;
            info!("Removed container {}", name);
        }
    }
}
