use parking_lot::Mutex;
use tracing::debug;

use crate::domain::ReportEvent;

use super::RingBuffer;

#[derive(Debug)]
struct Inner {
    events: RingBuffer<ReportEvent>,
    dropped: u64,
}

/// Bounded log of report events awaiting the reporter
#[derive(Debug)]
pub struct EventLog {
    inner: Mutex<Inner>,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                events: RingBuffer::new(capacity),
                dropped: 0,
            }),
        }
    }

    pub fn record(&self, event: ReportEvent) {
        let mut inner = self.inner.lock();
        if let Some(oldest) = inner.events.push(event) {
            inner.dropped += 1;
            debug!(kind = %oldest.kind, message = %oldest.message, "Event log full, dropped oldest event");
        }
    }

    pub fn record_all(&self, events: impl IntoIterator<Item = ReportEvent>) {
        for event in events {
            self.record(event);
        }
    }

    /// Take every recorded event, oldest first, leaving the log empty
    pub fn drain(&self) -> Vec<ReportEvent> {
        self.inner.lock().events.drain()
    }

    /// Copy of the recorded events without clearing them
    pub fn snapshot(&self) -> Vec<ReportEvent> {
        self.inner.lock().events.to_vec()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Events lost to overflow since creation
    pub fn dropped(&self) -> u64 {
        self.inner.lock().dropped
    }
}
