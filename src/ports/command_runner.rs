use std::process::ExitStatus;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::CommandError;

/// Cancellation and deadline for one command invocation
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    cancel: Option<watch::Receiver<bool>>,
    timeout: Option<Duration>,
}

impl CommandContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context together with the handle that cancels it
    pub fn cancellable() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                cancel: Some(rx),
                timeout: None,
            },
            CancelHandle(tx),
        )
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolves once the context is cancelled; pending forever otherwise
    pub async fn cancelled(&self) {
        let Some(rx) = self.cancel.as_ref() else {
            return std::future::pending().await;
        };
        let mut rx = rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // Handle dropped without cancelling.
            std::future::pending::<()>().await;
        }
    }
}

/// Cancels every context cloned from the one it was created with
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

/// Port for executing external OS commands
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command, discarding its output
    async fn run(&self, ctx: &CommandContext, name: &str, args: &[&str]) -> Result<ExitStatus, CommandError>;

    /// Run the command and return its stdout
    async fn output(&self, ctx: &CommandContext, name: &str, args: &[&str]) -> Result<Vec<u8>, CommandError>;

    /// Run the command and return stdout followed by stderr
    async fn combined_output(
        &self,
        ctx: &CommandContext,
        name: &str,
        args: &[&str],
    ) -> Result<Vec<u8>, CommandError>;
}
