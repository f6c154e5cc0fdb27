//! Shell execution for `Command` and `Script` dependencies.
use std::io::Write as _;
use std::process::{Command, ExitStatus};

use anyhow::{Context, Result};

/// Program and flag used to hand a command line to the system shell.
#[cfg(windows)]
const COMMAND_PROCESSOR: (&str, &str) = ("cmd", "/C");
#[cfg(not(windows))]
const COMMAND_PROCESSOR: (&str, &str) = ("sh", "-c");

/// Result of a command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecResult {
    /// Whether the process exited successfully.
    pub success: bool,
    /// Exit code, `None` if the process was terminated by a signal.
    pub code: Option<i32>,
}

impl From<ExitStatus> for ExecResult {
    fn from(status: ExitStatus) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
        }
    }
}

/// Runs command lines through the system command processor.
#[cfg_attr(test, mockall::automock)]
pub trait Executor: Send + Sync {
    /// Whether a command processor (`sh` or `cmd`) is available.
    fn has_command_processor(&self) -> bool;

    /// Run `code` through the command processor and wait for it to exit.
    ///
    /// Standard streams are inherited so the child's output interleaves with
    /// ours.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be started.
    fn run_shell(&self, code: &str) -> Result<ExecResult>;
}

/// Production [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn has_command_processor(&self) -> bool {
        which::which(COMMAND_PROCESSOR.0).is_ok()
    }

    fn run_shell(&self, code: &str) -> Result<ExecResult> {
        std::io::stdout().flush().ok();
        let (program, flag) = COMMAND_PROCESSOR;
        let status = Command::new(program)
            .arg(flag)
            .arg(code)
            .status()
            .with_context(|| format!("failed to execute: {code}"))?;
        Ok(ExecResult::from(status))
    }
}
