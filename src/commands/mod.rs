//! Top-level subcommand implementations.
pub mod check;
pub mod install;
pub mod list;
pub mod version;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::{ExitCodePolicy, Mode, Settings, Variables, toml_loader};
use crate::error::HanselError;
use crate::logging::Log;
use crate::paths;
use crate::platform::Platform;

/// Command-line inputs common to every mode, before validation.
#[derive(Debug, Clone)]
pub struct Invocation<'a> {
    /// Selected mode.
    pub mode: Mode,
    /// Root breadcrumb as given on the command line.
    pub target: &'a Path,
    /// Output directory; `None` means the current directory.
    pub output: Option<&'a Path>,
    /// Target platform.
    pub platform: Platform,
    /// Verbose output.
    pub verbose: bool,
}

/// Build the settings for the root breadcrumb.
///
/// Relative paths are resolved against the current directory, variables from
/// `--vars-file` are overridden by `-e` definitions, and the reserved
/// variables are injected last.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined, the
/// variables file cannot be loaded, or a variable definition is invalid.
pub fn build_settings(invocation: &Invocation<'_>, global: &GlobalOpts, log: &dyn Log) -> Result<Settings> {
    let cwd = std::env::current_dir().context("failed to determine the current directory")?;
    let target = absolute(invocation.target, &cwd);
    let output = invocation
        .output
        .map_or_else(|| cwd.clone(), |output| absolute(output, &cwd));

    let mut variables = match &global.vars_file {
        Some(path) => {
            let path = absolute(path, &cwd);
            let variables = toml_loader::load_variables(&path).map_err(HanselError::from)?;
            log.debug(&format!(
                "loaded {} variable(s) from {}",
                variables.len(),
                path.display()
            ));
            variables
        }
        None => Variables::new(),
    };
    let overrides = Variables::from_definitions(global.env.as_slice()).map_err(HanselError::from)?;
    for (name, value) in overrides.iter() {
        if let Some(previous) = variables.insert(name, value) {
            log.debug(&format!(
                "{name} from the command line overrides the file value '{previous}'"
            ));
        }
    }

    let settings = Settings {
        mode: invocation.mode,
        target,
        output,
        platform: invocation.platform,
        variables,
        verbose: invocation.verbose,
        exit_codes: if global.ignore_exit_codes {
            ExitCodePolicy::Ignore
        } else {
            ExitCodePolicy::Enforce
        },
    }
    .with_reserved_variables(log);

    log.info_verbose(&settings.describe());
    Ok(settings)
}

/// Absolute form of `path`, canonical when it exists.
fn absolute(path: &Path, cwd: &Path) -> PathBuf {
    let path = paths::make_absolute(path, cwd);
    dunce::canonicalize(&path).unwrap_or(path)
}
