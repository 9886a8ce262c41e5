use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a container
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ContainerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ContainerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One entry of the container inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerInfo {
    pub name: String,
    /// Human-readable runtime status, e.g. "Up 2 hours"
    pub status: String,
    pub image: String,
    pub id: ContainerId,
    pub running: bool,
}

impl ContainerInfo {
    pub fn new(
        id: ContainerId,
        name: impl Into<String>,
        image: impl Into<String>,
        status: impl Into<String>,
        running: bool,
    ) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
            image: image.into(),
            id,
            running,
        }
    }
}

/// A full container inventory as returned by one runtime query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub containers: Vec<ContainerInfo>,
    pub fetched_at: DateTime<Utc>,
}

impl InventorySnapshot {
    pub fn new(containers: Vec<ContainerInfo>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            containers,
            fetched_at,
        }
    }

    pub fn running(&self) -> impl Iterator<Item = &ContainerInfo> {
        self.containers.iter().filter(|c| c.running)
    }

    pub fn running_count(&self) -> usize {
        self.running().count()
    }

    pub fn find(&self, name: &str) -> Option<&ContainerInfo> {
        self.containers.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_counts_running_containers() {
        let snapshot = InventorySnapshot::new(
            vec![
                ContainerInfo::new("a1".into(), "web", "nginx:1.27", "Up 3 hours", true),
                ContainerInfo::new("b2".into(), "job", "alpine", "Exited (0) 2 days ago", false),
            ],
            Utc::now(),
        );

        assert_eq!(snapshot.running_count(), 1);
        assert_eq!(snapshot.find("job").map(|c| c.id.as_str()), Some("b2"));
        assert!(snapshot.find("db").is_none());
    }
}
