use async_trait::async_trait;

use crate::domain::ContainerInfo;
use crate::error::BoxError;

/// Port for fetching the container inventory from a runtime
#[async_trait]
pub trait ContainerSource: Send + Sync {
    /// List all containers (running and stopped)
    async fn list_containers(&self) -> Result<Vec<ContainerInfo>, BoxError>;
}
