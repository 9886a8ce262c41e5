use async_trait::async_trait;
use bollard::container::ListContainersOptions;
use bollard::models::ContainerSummary;
use bollard::Docker;

use crate::domain::{ContainerId, ContainerInfo};
use crate::error::BoxError;
use crate::ports::ContainerSource;

/// Docker adapter using bollard client
pub struct DockerAdapter {
    client: Docker,
}

impl DockerAdapter {
    pub fn new() -> Result<Self, BoxError> {
        let client = Docker::connect_with_local_defaults()?;
        Ok(Self { client })
    }

    pub fn with_socket(socket_path: &str) -> Result<Self, BoxError> {
        let client = Docker::connect_with_socket(socket_path, 120, bollard::API_DEFAULT_VERSION)?;
        Ok(Self { client })
    }

    fn parse_container_name(names: &Option<Vec<String>>) -> String {
        names
            .as_ref()
            .and_then(|n| n.first())
            .map(|s| s.trim_start_matches('/').to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    fn to_container_info(summary: ContainerSummary) -> ContainerInfo {
        let running = summary.state.as_deref() == Some("running");
        let status = summary
            .status
            .or(summary.state)
            .unwrap_or_else(|| "unknown".to_string());

        ContainerInfo::new(
            ContainerId::new(summary.id.unwrap_or_default()),
            Self::parse_container_name(&summary.names),
            summary.image.unwrap_or_else(|| "unknown".to_string()),
            status,
            running,
        )
    }
}

#[async_trait]
impl ContainerSource for DockerAdapter {
    async fn list_containers(&self) -> Result<Vec<ContainerInfo>, BoxError> {
        let options = Some(ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        });

        let summaries = self.client.list_containers(options).await?;
        Ok(summaries.into_iter().map(Self::to_container_info).collect())
    }
}
