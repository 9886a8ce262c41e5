use async_trait::async_trait;

use crate::domain::Stats;
use crate::error::BoxError;

/// Port for the per-tick resource snapshot
#[async_trait]
pub trait SampleSource: Send + Sync {
    /// Take one snapshot of the host
    async fn sample(&self) -> Result<Stats, BoxError>;
}
