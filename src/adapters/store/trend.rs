use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::trace;

use crate::domain::TrendPoint;
use crate::error::AnalyticsError;

use super::RingBuffer;

/// Bounded per-volume history of trend points
#[derive(Debug)]
pub struct TrendStore {
    series: RwLock<HashMap<String, RingBuffer<TrendPoint>>>,
    capacity: usize,
}

impl TrendStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            series: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a point; time must not go backwards within a series
    pub fn append(&self, volume: &str, point: TrendPoint) -> Result<(), AnalyticsError> {
        if !point.value.is_finite() {
            return Err(AnalyticsError::invalid(format!("trend[{volume}]"), point.value));
        }

        let mut series = self.series.write();
        let ring = series
            .entry(volume.to_string())
            .or_insert_with(|| RingBuffer::new(self.capacity));

        if let Some(last) = ring.back() {
            if point.at < last.at {
                return Err(AnalyticsError::InvalidOrder {
                    series: volume.to_string(),
                    at: point.at,
                    last: last.at,
                });
            }
        }

        if let Some(evicted) = ring.push(point) {
            trace!(volume, evicted_at = %evicted.at, "Trend point evicted");
        }
        Ok(())
    }

    /// Copy of the series for `volume`, oldest first
    pub fn series(&self, volume: &str) -> Vec<TrendPoint> {
        self.series
            .read()
            .get(volume)
            .map(RingBuffer::to_vec)
            .unwrap_or_default()
    }

    pub fn volumes(&self) -> Vec<String> {
        let mut volumes: Vec<String> = self.series.read().keys().cloned().collect();
        volumes.sort();
        volumes
    }

    pub fn len(&self, volume: &str) -> usize {
        self.series.read().get(volume).map_or(0, RingBuffer::len)
    }

    pub fn clear(&self, volume: &str) {
        if let Some(ring) = self.series.write().get_mut(volume) {
            ring.clear();
        }
    }
}
