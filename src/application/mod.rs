pub mod inventory;
pub mod monitoring;
pub mod predictor;
pub mod stress;

pub use inventory::InventoryCache;
pub use monitoring::MonitoringService;
pub use predictor::predict;
pub use stress::{StressBoard, StressStatus, StressTracker};
