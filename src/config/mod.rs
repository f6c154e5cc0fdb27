//! Invocation settings threaded through parsing, checking and realizing.
pub mod toml_loader;
pub mod variables;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::logging::Log;
use crate::platform::Platform;
pub use variables::Variables;

/// Reserved variable holding the active install root.
pub const OUTPUT_DIR: &str = "OUTPUT_DIR";

/// Reserved variable holding the platform token (e.g. `win64d`).
pub const PLATFORM_DIR: &str = "PLATFORM_DIR";

/// What the invocation does with the parsed dependency tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Realize every dependency.
    Install,
    /// Report what an install would do without side effects.
    Debug,
    /// Look for version and overwrite conflicts.
    Check,
    /// Print the dependency tree.
    List,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Install => write!(f, "Install"),
            Self::Debug => write!(f, "Debug"),
            Self::Check => write!(f, "Check"),
            Self::List => write!(f, "List"),
        }
    }
}

/// How command and script exit statuses affect realize results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitCodePolicy {
    /// A non-zero exit fails the step.
    #[default]
    Enforce,
    /// A non-zero exit is reported as a warning only.
    Ignore,
}

/// Settings for one breadcrumb parse.
///
/// Values are never mutated while a tree is being built: nested breadcrumbs
/// receive a derived copy from [`Settings::nested`].
#[derive(Debug, Clone)]
pub struct Settings {
    /// Selected mode.
    pub mode: Mode,
    /// Absolute path of the breadcrumb being parsed.
    pub target: PathBuf,
    /// Install root given on the command line.
    pub output: PathBuf,
    /// Target platform.
    pub platform: Platform,
    /// Variables available to placeholders and restrict conditions.
    pub variables: Variables,
    /// Verbose output.
    pub verbose: bool,
    /// Exit status handling for commands and scripts.
    pub exit_codes: ExitCodePolicy,
}

impl Settings {
    /// Directory containing the target breadcrumb.
    #[must_use]
    pub fn target_directory(&self) -> &Path {
        self.target.parent().unwrap_or_else(|| Path::new(""))
    }

    /// File name of the target breadcrumb, for display.
    #[must_use]
    pub fn target_file_name(&self) -> String {
        self.target.file_name().map_or_else(
            || self.target.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        )
    }

    /// Install root for the active platform (`output/<platform-token>`).
    #[must_use]
    pub fn platform_output(&self) -> PathBuf {
        self.output.join(self.platform.to_string())
    }

    /// Define `OUTPUT_DIR` and `PLATFORM_DIR`, warning when the user tried to
    /// set either of them.
    #[must_use]
    pub fn with_reserved_variables(mut self, log: &dyn Log) -> Self {
        let output_dir = self.platform_output();
        let platform_dir = self.platform.to_string();

        if self.variables.contains(OUTPUT_DIR) {
            log.warn(&format!(
                "{OUTPUT_DIR} is a reserved variable, the provided value will be replaced by '{}'",
                output_dir.display()
            ));
        }
        if self.variables.contains(PLATFORM_DIR) {
            log.warn(&format!(
                "{PLATFORM_DIR} is a reserved variable, the provided value will be replaced by '{platform_dir}'"
            ));
        }
        self.variables
            .insert(OUTPUT_DIR, output_dir.to_string_lossy().into_owned());
        self.variables.insert(PLATFORM_DIR, platform_dir);
        self
    }

    /// Settings for a nested breadcrumb: `target` replaced and `OUTPUT_DIR`
    /// pointing at the declaring node's destination.
    #[must_use]
    pub fn nested(&self, target: PathBuf, output_dir: &Path) -> Self {
        let mut variables = self.variables.clone();
        variables.insert(OUTPUT_DIR, output_dir.to_string_lossy().into_owned());
        Self {
            target,
            variables,
            ..self.clone()
        }
    }

    /// Multi-line description of the effective settings.
    #[must_use]
    pub fn describe(&self) -> String {
        use std::fmt::Write as _;

        let mut message = String::from("Hansel execution settings:");
        let _ = write!(message, "\n    - Mode: {}", self.mode);
        let _ = write!(message, "\n    - Target: '{}'", self.target.display());
        if self.mode != Mode::List {
            let _ = write!(message, "\n    - Output path: '{}'", self.output.display());
        }
        let _ = write!(message, "\n    - Platform: {}", self.platform);
        message.push_str("\n    - Environment variables:");
        for (name, value) in self.variables.iter() {
            let _ = write!(message, "\n        - {name} = {value}");
        }
        let _ = write!(
            message,
            "\n    - Verbose: {}",
            if self.verbose { "Yes" } else { "No" }
        );
        message
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::logging::RecordingLog;
    use crate::platform::{Architecture, Configuration, Os};

    /// Settings for `target` on `win64d` with output `/out`.
    pub(crate) fn settings_for(target: &Path) -> Settings {
        Settings {
            mode: Mode::Install,
            target: target.to_path_buf(),
            output: PathBuf::from("/out"),
            platform: Platform::new(Os::Windows, Architecture::X64, Configuration::Debug),
            variables: Variables::new(),
            verbose: false,
            exit_codes: ExitCodePolicy::Enforce,
        }
    }

    #[test]
    fn reserved_variables_are_injected() {
        let log = RecordingLog::new(false);
        let s = settings_for(Path::new("/work/app.hbc")).with_reserved_variables(&log);
        assert_eq!(
            PathBuf::from(s.variables.get(OUTPUT_DIR).unwrap()),
            Path::new("/out").join("win64d")
        );
        assert_eq!(s.variables.get(PLATFORM_DIR), Some("win64d"));
        assert!(log.messages().is_empty());
    }

    #[test]
    fn reserved_variables_override_user_values() {
        let log = RecordingLog::new(false);
        let mut s = settings_for(Path::new("/work/app.hbc"));
        s.variables.insert("output_dir", "/elsewhere");
        s.variables.insert("PLATFORM_DIR", "x");
        let s = s.with_reserved_variables(&log);
        assert_eq!(s.variables.get(PLATFORM_DIR), Some("win64d"));
        assert!(log.contains_warning("OUTPUT_DIR is a reserved variable"));
        assert!(log.contains_warning("PLATFORM_DIR is a reserved variable"));
    }

    #[test]
    fn nested_overrides_target_and_output_only() {
        let log = RecordingLog::new(false);
        let parent = settings_for(Path::new("/work/app.hbc")).with_reserved_variables(&log);
        let child = parent.nested(PathBuf::from("/libs/zlib/zlib.hbc"), Path::new("/out/win64d/libs"));

        assert_eq!(child.target, Path::new("/libs/zlib/zlib.hbc"));
        assert_eq!(child.variables.get(OUTPUT_DIR), Some("/out/win64d/libs"));
        assert_eq!(child.variables.get(PLATFORM_DIR), Some("win64d"));
        assert_eq!(parent.target, Path::new("/work/app.hbc"));
        assert_ne!(parent.variables.get(OUTPUT_DIR), child.variables.get(OUTPUT_DIR));
    }

    #[test]
    fn target_helpers() {
        let s = settings_for(Path::new("/work/app.hbc"));
        assert_eq!(s.target_directory(), Path::new("/work"));
        assert_eq!(s.target_file_name(), "app.hbc");
    }

    #[test]
    fn describe_lists_settings() {
        let mut s = settings_for(Path::new("/work/app.hbc"));
        s.variables.insert("SDK", "/opt/sdk");
        let text = s.describe();
        assert!(text.contains("- Mode: Install"));
        assert!(text.contains("- Platform: win64d"));
        assert!(text.contains("- SDK = /opt/sdk"));
        assert!(text.contains("- Verbose: No"));

        s.mode = Mode::List;
        assert!(!s.describe().contains("Output path"));
    }
}
