pub mod command_runner;
pub mod container_source;
pub mod sample_source;

pub use command_runner::{CancelHandle, CommandContext, CommandRunner};
pub use container_source::ContainerSource;
pub use sample_source::SampleSource;
