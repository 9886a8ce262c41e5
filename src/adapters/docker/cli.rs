use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{ContainerId, ContainerInfo};
use crate::error::BoxError;
use crate::ports::{CommandContext, CommandRunner, ContainerSource};

const PS_ARGS: &[&str] = &["ps", "--all", "--no-trunc", "--format", "{{json .}}"];

/// One line of `docker ps --format '{{json .}}'`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PsLine {
    #[serde(rename = "ID")]
    id: String,
    names: String,
    image: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    status: String,
}

impl From<PsLine> for ContainerInfo {
    fn from(line: PsLine) -> Self {
        let running = match line.state.as_deref() {
            Some(state) => state == "running",
            None => line.status.starts_with("Up"),
        };
        // Names is comma separated when a container has links.
        let name = line.names.split(',').next().unwrap_or_default().to_string();

        ContainerInfo::new(ContainerId::new(line.id), name, line.image, line.status, running)
    }
}

/// Container source that shells out to the docker CLI
pub struct DockerCliSource {
    runner: Arc<dyn CommandRunner>,
    binary: String,
    timeout: Option<Duration>,
}

impl DockerCliSource {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            binary: "docker".to_string(),
            timeout: None,
        }
    }

    /// Use another CLI speaking the same `ps` format, e.g. `podman`
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn parse(output: &[u8]) -> Result<Vec<ContainerInfo>, serde_json::Error> {
        String::from_utf8_lossy(output)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| serde_json::from_str::<PsLine>(line).map(ContainerInfo::from))
            .collect()
    }
}

#[async_trait]
impl ContainerSource for DockerCliSource {
    async fn list_containers(&self) -> Result<Vec<ContainerInfo>, BoxError> {
        let mut ctx = CommandContext::new();
        if let Some(timeout) = self.timeout {
            ctx = ctx.with_timeout(timeout);
        }

        let output = self.runner.output(&ctx, &self.binary, PS_ARGS).await?;
        let containers = Self::parse(&output)?;
        debug!(count = containers.len(), binary = %self.binary, "Listed containers");
        Ok(containers)
    }
}
