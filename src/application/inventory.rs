//! Time-to-live cache in front of the container runtime.
//!
//! Refreshes are single-flight: one caller holds the refresh gate across the
//! external call, and every caller that queued behind it takes the outcome of
//! that attempt, success or failure, instead of fetching again. The snapshot
//! itself sits behind a short-held lock so `peek` never waits on a refresh.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::{ContainerInfo, InventorySnapshot};
use crate::error::{BoxError, InventoryError};
use crate::ports::ContainerSource;

#[derive(Debug)]
struct Cached {
    snapshot: Arc<InventorySnapshot>,
    fetched: Instant,
    invalidated: bool,
}

#[derive(Debug, Default)]
struct State {
    cached: Option<Cached>,
    /// Refresh attempts completed so far
    attempts: u64,
    /// Message of the last failed attempt, kept for callers that shared it
    last_error: Option<String>,
}

/// TTL cache for the container inventory
#[derive(Debug)]
pub struct InventoryCache {
    ttl: Duration,
    state: RwLock<State>,
    refresh: Mutex<()>,
}

impl InventoryCache {
    /// A zero `ttl` refetches on every call
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: RwLock::new(State::default()),
            refresh: Mutex::new(()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Inventory from `source`, refreshed when older than the TTL
    pub async fn get(&self, source: &dyn ContainerSource) -> Result<Arc<InventorySnapshot>, InventoryError> {
        self.get_with(|| source.list_containers()).await
    }

    /// Inventory from `fetch`, refreshed when older than the TTL.
    ///
    /// A failed refresh falls back to the previous snapshot; the error only
    /// surfaces when nothing was ever fetched.
    pub async fn get_with<F, Fut>(&self, fetch: F) -> Result<Arc<InventorySnapshot>, InventoryError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<ContainerInfo>, BoxError>>,
    {
        let seen = {
            let state = self.state.read();
            if let Some(snapshot) = self.fresh(&state) {
                debug!("Container inventory served from cache");
                return Ok(snapshot);
            }
            state.attempts
        };

        let _gate = self.refresh.lock().await;

        {
            let state = self.state.read();
            if state.attempts != seen {
                debug!("Container inventory taken from a concurrent refresh");
                return Self::outcome(&state);
            }
        }

        let result = fetch().await;

        let mut state = self.state.write();
        state.attempts += 1;
        match result {
            Ok(containers) => {
                let snapshot = Arc::new(InventorySnapshot::new(containers, Utc::now()));
                info!(
                    containers = snapshot.containers.len(),
                    running = snapshot.running_count(),
                    "Container inventory refreshed"
                );
                state.cached = Some(Cached {
                    snapshot: Arc::clone(&snapshot),
                    fetched: Instant::now(),
                    invalidated: false,
                });
                state.last_error = None;
                Ok(snapshot)
            }
            Err(e) => {
                state.last_error = Some(e.to_string());
                match state.cached.as_ref() {
                    Some(entry) => {
                        warn!(error = %e, fetched_at = %entry.snapshot.fetched_at, "Inventory refresh failed, serving stale snapshot");
                        Ok(Arc::clone(&entry.snapshot))
                    }
                    None => {
                        warn!(error = %e, "Inventory fetch failed with no cached snapshot");
                        Err(InventoryError::Fetch(e))
                    }
                }
            }
        }
    }

    /// Current snapshot regardless of age, without fetching
    pub fn peek(&self) -> Option<Arc<InventorySnapshot>> {
        self.state.read().cached.as_ref().map(|entry| Arc::clone(&entry.snapshot))
    }

    /// Force the next `get` to refetch; the stale snapshot stays as fallback
    pub fn invalidate(&self) {
        if let Some(entry) = self.state.write().cached.as_mut() {
            entry.invalidated = true;
        }
    }

    fn fresh(&self, state: &State) -> Option<Arc<InventorySnapshot>> {
        state
            .cached
            .as_ref()
            .filter(|entry| !entry.invalidated && entry.fetched.elapsed() < self.ttl)
            .map(|entry| Arc::clone(&entry.snapshot))
    }

    fn outcome(state: &State) -> Result<Arc<InventorySnapshot>, InventoryError> {
        match (&state.cached, &state.last_error) {
            (Some(entry), _) => Ok(Arc::clone(&entry.snapshot)),
            (None, Some(message)) => Err(InventoryError::Fetch(message.clone().into())),
            (None, None) => Err(InventoryError::Fetch("container inventory unavailable".into())),
        }
    }
}
