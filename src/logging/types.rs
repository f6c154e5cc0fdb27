//! Core logging types: step entries, status, and the [`Log`] trait.

/// Outcome of one realized dependency, kept for the run summary.
#[derive(Debug, Clone)]
pub struct StepEntry {
    /// Human-readable step description (e.g. `FILE /src/a.txt`).
    pub name: String,
    /// Final status of the step.
    pub status: StepStatus,
    /// Optional detail message (e.g. the error that failed the step).
    pub message: Option<String>,
}

/// Status of a realized dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The side effect was performed.
    Ok,
    /// Debug mode: the side effect was only reported.
    DryRun,
    /// The side effect failed.
    Failed,
}

/// Logging handle passed explicitly to every component.
///
/// [`Logger`](super::logger::Logger) is the production implementation; the
/// verbosity flag is fixed at construction instead of being process state.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (shown only in verbose mode).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log an unrecoverable error.
    fn critical(&self, msg: &str);
    /// Log a planned action in debug (dry-run) mode.
    fn dry_run(&self, msg: &str);
    /// Record a step result for the summary.
    fn record_step(&self, name: &str, status: StepStatus, message: Option<&str>);
    /// Whether verbose output was requested.
    fn is_verbose(&self) -> bool;

    /// Log an informational message only in verbose mode.
    fn info_verbose(&self, msg: &str) {
        if self.is_verbose() {
            self.info(msg);
        }
    }

    /// Log a warning only in verbose mode.
    fn warn_verbose(&self, msg: &str) {
        if self.is_verbose() {
            self.warn(msg);
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::RecordingLog;

    #[test]
    fn step_status_equality() {
        assert_eq!(StepStatus::Ok, StepStatus::Ok);
        assert_ne!(StepStatus::Ok, StepStatus::Failed);
        assert_ne!(StepStatus::DryRun, StepStatus::Ok);
    }

    #[test]
    fn verbose_helpers_respect_flag() {
        let quiet = RecordingLog::new(false);
        quiet.info_verbose("hidden");
        quiet.warn_verbose("hidden");
        assert!(quiet.messages().is_empty());

        let loud = RecordingLog::new(true);
        loud.info_verbose("shown");
        loud.warn_verbose("shown too");
        assert_eq!(loud.messages().len(), 2);
        assert!(loud.contains_warning("shown too"));
    }
}
