use std::collections::{HashMap, VecDeque};
use std::process::ExitStatus;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::CommandError;
use crate::ports::{CommandContext, CommandRunner};

/// Canned reply for one command invocation
pub type ScriptedReply = Result<Vec<u8>, CommandError>;

/// In-memory command runner that replays canned replies.
///
/// Replies are queued per command name and consumed in order. Unknown
/// commands fail with `CommandNotFound`, mirroring a missing binary.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    replies: Mutex<HashMap<String, VecDeque<ScriptedReply>>>,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, name: &str, reply: ScriptedReply) -> Self {
        self.push(name, reply);
        self
    }

    pub fn push(&self, name: &str, reply: ScriptedReply) {
        self.replies
            .lock()
            .entry(name.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Every invocation seen so far, as (name, args)
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().clone()
    }

    fn next(&self, ctx: &CommandContext, name: &str, args: &[&str]) -> ScriptedReply {
        self.calls
            .lock()
            .push((name.to_string(), args.iter().map(|a| a.to_string()).collect()));

        if ctx.is_cancelled() {
            return Err(CommandError::Cancelled(name.to_string()));
        }

        self.replies
            .lock()
            .get_mut(name)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(CommandError::CommandNotFound(name.to_string())))
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, ctx: &CommandContext, name: &str, args: &[&str]) -> Result<ExitStatus, CommandError> {
        self.next(ctx, name, args).map(|_| ExitStatus::default())
    }

    async fn output(&self, ctx: &CommandContext, name: &str, args: &[&str]) -> Result<Vec<u8>, CommandError> {
        self.next(ctx, name, args)
    }

    async fn combined_output(
        &self,
        ctx: &CommandContext,
        name: &str,
        args: &[&str],
    ) -> Result<Vec<u8>, CommandError> {
        self.next(ctx, name, args)
    }
}
