//! Container orchestration for the API runner image.
//!
//! The manager builds one shared image and starts one detached container per
//! catalog entry. The engine itself sits behind [`ContainerRuntime`]; the
//! shipped backend drives the `docker` CLI.

mod docker;
mod manager;
mod runtime;

pub use docker::DockerCli;
pub use manager::{assign_ports, container_name, ContainerManager, CONTAINER_PREFIX};
pub use runtime::{
    ContainerError, ContainerResult, ContainerRuntime, ContainerSpec, PortMapping, VolumeMount,
};
