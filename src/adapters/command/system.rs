use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output, Stdio};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::CommandError;
use crate::ports::{CommandContext, CommandRunner};

/// Operating systems the host probes are written for
const SUPPORTED_PLATFORMS: &[&str] = &["linux"];

/// Command runner backed by real child processes
#[derive(Debug, Clone)]
pub struct SystemCommandRunner {
    platform: String,
    search_path: Option<OsString>,
}

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self {
            platform: env::consts::OS.to_string(),
            search_path: None,
        }
    }

    /// Override the detected operating system
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// Resolve executables against this list instead of `$PATH`
    pub fn with_search_path(mut self, path: impl Into<OsString>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    fn check_platform(&self) -> Result<(), CommandError> {
        if SUPPORTED_PLATFORMS.contains(&self.platform.as_str()) {
            Ok(())
        } else {
            Err(CommandError::UnsupportedPlatform(self.platform.clone()))
        }
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, CommandError> {
        if name.contains(std::path::MAIN_SEPARATOR) {
            let path = PathBuf::from(name);
            return if is_executable(&path) {
                Ok(path)
            } else {
                Err(CommandError::CommandNotFound(name.to_string()))
            };
        }

        let search_path = self.search_path.clone().or_else(|| env::var_os("PATH"));
        search_path
            .iter()
            .flat_map(|paths| env::split_paths(paths))
            .map(|dir| dir.join(name))
            .find(|candidate| is_executable(candidate))
            .ok_or_else(|| CommandError::CommandNotFound(name.to_string()))
    }

    async fn execute(&self, ctx: &CommandContext, name: &str, args: &[&str]) -> Result<Output, CommandError> {
        if ctx.is_cancelled() {
            return Err(CommandError::Cancelled(name.to_string()));
        }
        self.check_platform()?;
        let program = self.resolve(name)?;

        debug!(command = name, ?args, "Spawning external command");

        let child = Command::new(&program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CommandError::Io {
                name: name.to_string(),
                source,
            })?;

        // Dropping the wait future drops the child, which kills it.
        let wait = child.wait_with_output();
        let finished = async {
            let waited = match ctx.timeout() {
                Some(limit) => match tokio::time::timeout(limit, wait).await {
                    Ok(waited) => waited,
                    Err(_) => return Err(CommandError::TimedOut(name.to_string())),
                },
                None => wait.await,
            };
            waited.map_err(|source| CommandError::Io {
                name: name.to_string(),
                source,
            })
        };

        tokio::select! {
            output = finished => output,
            _ = ctx.cancelled() => {
                debug!(command = name, "External command cancelled");
                Err(CommandError::Cancelled(name.to_string()))
            }
        }
    }
}

impl Default for SystemCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, ctx: &CommandContext, name: &str, args: &[&str]) -> Result<ExitStatus, CommandError> {
        let output = self.execute(ctx, name, args).await?;
        if output.status.success() {
            Ok(output.status)
        } else {
            Err(failed(name, output.status, output.stderr))
        }
    }

    async fn output(&self, ctx: &CommandContext, name: &str, args: &[&str]) -> Result<Vec<u8>, CommandError> {
        let output = self.execute(ctx, name, args).await?;
        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(failed(name, output.status, output.stderr))
        }
    }

    async fn combined_output(
        &self,
        ctx: &CommandContext,
        name: &str,
        args: &[&str],
    ) -> Result<Vec<u8>, CommandError> {
        let output = self.execute(ctx, name, args).await?;
        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);
        if output.status.success() {
            Ok(combined)
        } else {
            Err(failed(name, output.status, combined))
        }
    }
}

fn failed(name: &str, status: ExitStatus, output: Vec<u8>) -> CommandError {
    CommandError::Failed {
        name: name.to_string(),
        status,
        output,
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    #[tokio::test]
    async fn unsupported_platform_is_rejected_before_lookup() {
        let runner = SystemCommandRunner::new().with_platform("plan9");
        let err = runner
            .output(&CommandContext::new(), "definitely-not-a-binary", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::UnsupportedPlatform(p) if p == "plan9"));
    }

    #[tokio::test]
    async fn missing_binary_is_command_not_found() {
        let runner = SystemCommandRunner::new()
            .with_platform("linux")
            .with_search_path("/nonexistent-dir");
        let err = runner.run(&CommandContext::new(), "sh", &[]).await.unwrap_err();
        assert!(matches!(err, CommandError::CommandNotFound(n) if n == "sh"));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn output_returns_stdout() {
        let runner = SystemCommandRunner::new();
        let out = runner
            .output(&CommandContext::new(), "sh", &["-c", "echo hello"])
            .await
            .unwrap();
        assert_eq!(out, b"hello\n");
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn combined_output_keeps_stderr() {
        let runner = SystemCommandRunner::new();
        let out = runner
            .combined_output(&CommandContext::new(), "sh", &["-c", "echo out; echo err 1>&2"])
            .await
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&out), "out\nerr\n");
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn non_zero_exit_propagates_status_and_output() {
        let runner = SystemCommandRunner::new();
        let err = runner
            .combined_output(&CommandContext::new(), "sh", &["-c", "echo boom; exit 3"])
            .await
            .unwrap_err();
        match err {
            CommandError::Failed { status, output, .. } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(output, b"boom\n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn cancellation_terminates_running_command() {
        let runner = SystemCommandRunner::new();
        let (ctx, handle) = CommandContext::cancellable();

        let started = Instant::now();
        let cancel = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            handle.cancel();
        });

        let err = runner.run(&ctx, "sleep", &["10"]).await.unwrap_err();
        cancel.await.unwrap();

        assert!(matches!(err, CommandError::Cancelled(_)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn timeout_terminates_running_command() {
        let runner = SystemCommandRunner::new();
        let ctx = CommandContext::new().with_timeout(Duration::from_millis(100));
        let err = runner.run(&ctx, "sleep", &["10"]).await.unwrap_err();
        assert!(matches!(err, CommandError::TimedOut(_)));
    }

    #[tokio::test]
    async fn already_cancelled_context_never_spawns() {
        let runner = SystemCommandRunner::new().with_platform("plan9");
        let (ctx, handle) = CommandContext::cancellable();
        handle.cancel();
        let err = runner.run(&ctx, "sleep", &["10"]).await.unwrap_err();
        assert!(matches!(err, CommandError::Cancelled(_)));
    }
}
