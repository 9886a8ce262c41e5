pub mod command;
pub mod docker;
pub mod store;

pub use command::{ScriptedReply, ScriptedRunner, SystemCommandRunner};
pub use docker::{DockerAdapter, DockerCliSource};
pub use store::{EventLog, RingBuffer, TrendStore};
