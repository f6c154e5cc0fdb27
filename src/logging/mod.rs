//! Logging infrastructure for structured console output.

mod logger;
mod subscriber;
mod types;

pub use logger::Logger;
pub use subscriber::init_subscriber;
pub use types::{Log, StepEntry, StepStatus};

/// Severity of a captured message.
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Level {
    Stage,
    Info,
    Debug,
    Warn,
    Error,
    Critical,
    DryRun,
}

/// In-memory [`Log`] for unit tests.
///
/// Captures every message with its severity so tests can assert on
/// diagnostics without installing a subscriber.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingLog {
    verbose: bool,
    entries: std::sync::Mutex<Vec<(Level, String)>>,
    steps: std::sync::Mutex<Vec<StepEntry>>,
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl RecordingLog {
    pub(crate) fn new(verbose: bool) -> Self {
        Self {
            verbose,
            ..Self::default()
        }
    }

    fn push(&self, level: Level, msg: &str) {
        self.entries
            .lock()
            .expect("recording log poisoned")
            .push((level, msg.to_string()));
    }

    pub(crate) fn messages(&self) -> Vec<(Level, String)> {
        self.entries.lock().expect("recording log poisoned").clone()
    }

    pub(crate) fn steps(&self) -> Vec<StepEntry> {
        self.steps.lock().expect("recording log poisoned").clone()
    }

    fn contains(&self, level: Level, needle: &str) -> bool {
        self.messages()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }

    pub(crate) fn contains_warning(&self, needle: &str) -> bool {
        self.contains(Level::Warn, needle)
    }

    pub(crate) fn contains_error(&self, needle: &str) -> bool {
        self.contains(Level::Error, needle)
    }

    pub(crate) fn contains_dry_run(&self, needle: &str) -> bool {
        self.contains(Level::DryRun, needle)
    }

    pub(crate) fn count(&self, level: Level) -> usize {
        self.messages().iter().filter(|(l, _)| *l == level).count()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl Log for RecordingLog {
    fn stage(&self, msg: &str) {
        self.push(Level::Stage, msg);
    }
    fn info(&self, msg: &str) {
        self.push(Level::Info, msg);
    }
    fn debug(&self, msg: &str) {
        self.push(Level::Debug, msg);
    }
    fn warn(&self, msg: &str) {
        self.push(Level::Warn, msg);
    }
    fn error(&self, msg: &str) {
        self.push(Level::Error, msg);
    }
    fn critical(&self, msg: &str) {
        self.push(Level::Critical, msg);
    }
    fn dry_run(&self, msg: &str) {
        self.push(Level::DryRun, msg);
    }
    fn record_step(&self, name: &str, status: StepStatus, message: Option<&str>) {
        self.steps
            .lock()
            .expect("recording log poisoned")
            .push(StepEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
    }
    fn is_verbose(&self) -> bool {
        self.verbose
    }
}
