//! Command: look for conflicts in a dependency tree.
use anyhow::Result;

use crate::checker;
use crate::cli::{GlobalOpts, TargetArgs};
use crate::config::{Mode, Settings};
use crate::error::HanselError;
use crate::logging::Log;
use crate::manifest;
use crate::operations::{FileSystemOps, SystemFileSystemOps};

/// Run the check command.
///
/// # Errors
///
/// Returns an error if parsing fails or a conflict was found.
pub fn run(global: &GlobalOpts, args: &TargetArgs, verbose: bool, log: &dyn Log) -> Result<()> {
    let settings = super::build_settings(
        &super::Invocation {
            mode: Mode::Check,
            target: &args.target,
            output: Some(&args.output),
            platform: args.platform,
            verbose,
        },
        global,
        log,
    )?;
    if !run_with(&settings, &SystemFileSystemOps, log)? {
        anyhow::bail!("conflicts detected in {}", settings.target.display());
    }
    Ok(())
}

/// Parse the tree for `settings` and check it. Returns `true` when no
/// conflict was found.
///
/// # Errors
///
/// Returns an error if any breadcrumb fails to parse.
pub fn run_with(settings: &Settings, fs: &dyn FileSystemOps, log: &dyn Log) -> Result<bool> {
    let root = manifest::parse_root(settings, fs, log).map_err(HanselError::from)?;
    Ok(checker::check(&root, fs, log))
}
