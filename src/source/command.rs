//! Bounded-timeout invocation of external tools.
//!
//! Everything the monitor knows comes from command-line utilities, some
//! of which can hang on a misbehaving device. Invocations therefore run
//! under a hard timeout; a child that outlives its window is killed and
//! its result abandoned.

use std::process::{ExitStatus, Output};
use std::time::Duration;

use anyhow::Result;
use thiserror::Error;
use tokio::process::Command;
use tokio::runtime::Runtime;

/// Failure modes of an external tool invocation.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{tool} not found on PATH")]
    NotFound { tool: String },

    #[error("{tool} did not finish within {timeout:?}")]
    TimedOut { tool: String, timeout: Duration },

    #[error("{tool} exited with {status}")]
    Failed { tool: String, status: ExitStatus },

    #[error("failed to run {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

/// Runs external tools synchronously with a bounded timeout.
///
/// Owns a current-thread tokio runtime; `tokio::process` gives us a
/// portable kill-on-timeout that `std::process` cannot express without
/// platform-specific wait loops.
#[derive(Debug)]
pub struct CommandRunner {
    runtime: Runtime,
}

impl CommandRunner {
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self { runtime })
    }

    /// Run `tool` with `args`, requiring a successful exit status.
    pub fn run(
        &self,
        tool: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<String, CommandError> {
        let output = self.output(tool, args, timeout)?;
        if !output.status.success() {
            return Err(CommandError::Failed {
                tool: tool.to_string(),
                status: output.status,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run `tool` with `args`, capturing stdout regardless of exit status.
    ///
    /// Some tools exit non-zero while still printing usable output (the
    /// temperature tool does this without elevated privileges).
    pub fn run_unchecked(
        &self,
        tool: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<String, CommandError> {
        let output = self.output(tool, args, timeout)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn output(
        &self,
        tool: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output, CommandError> {
        let result = self.runtime.block_on(async {
            let child = Command::new(tool)
                .args(args)
                .kill_on_drop(true)
                .output();
            tokio::time::timeout(timeout, child).await
        });

        match result {
            Err(_elapsed) => Err(CommandError::TimedOut {
                tool: tool.to_string(),
                timeout,
            }),
            Ok(Err(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(CommandError::NotFound {
                    tool: tool.to_string(),
                })
            }
            Ok(Err(err)) => Err(CommandError::Io {
                tool: tool.to_string(),
                source: err,
            }),
            Ok(Ok(output)) => Ok(output),
        }
    }
}
