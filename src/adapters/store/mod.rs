mod events;
mod memory;
mod trend;

pub use events::EventLog;
pub use memory::RingBuffer;
pub use trend::TrendStore;
