pub mod container;
pub mod event;
pub mod metrics;
pub mod stats;
pub mod trend;

pub use container::{ContainerId, ContainerInfo, InventorySnapshot};
pub use event::{EventKind, ReportEvent};
pub use metrics::{DiskIo, LoadAverage, ProcInfo};
pub use stats::{Stats, VolumeStats, BYTES_PER_GB};
pub use trend::{DiskPrediction, TrendPoint};
