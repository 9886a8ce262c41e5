mod scripted;
mod system;

pub use scripted::{ScriptedReply, ScriptedRunner};
pub use system::SystemCommandRunner;
