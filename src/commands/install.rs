//! Command: install the dependency tree into the output directory.
use anyhow::Result;

use crate::cli::{GlobalOpts, TargetArgs};
use crate::config::{Mode, Settings};
use crate::dependency::realize::Realizer;
use crate::error::HanselError;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::Logger;
use crate::manifest;
use crate::operations::{FileSystemOps, SystemFileSystemOps};

/// Run the install command, or its dry-run variant when `mode` is
/// [`Mode::Debug`].
///
/// # Errors
///
/// Returns an error if the settings are invalid, any breadcrumb fails to
/// parse, or one or more dependencies could not be realized.
pub fn run(global: &GlobalOpts, args: &TargetArgs, mode: Mode, verbose: bool, log: &Logger) -> Result<()> {
    let settings = super::build_settings(
        &super::Invocation {
            mode,
            target: &args.target,
            output: Some(&args.output),
            platform: args.platform,
            verbose,
        },
        global,
        log,
    )?;
    run_with(&settings, &SystemFileSystemOps, &SystemExecutor, log)
}

/// Parse the tree for `settings` and realize it through `fs` and `executor`.
///
/// # Errors
///
/// Returns an error if parsing fails or any step failed.
pub fn run_with(
    settings: &Settings,
    fs: &dyn FileSystemOps,
    executor: &dyn Executor,
    log: &Logger,
) -> Result<()> {
    log.stage(&format!("Reading {}", settings.target_file_name()));
    let root = manifest::parse_root(settings, fs, log).map_err(HanselError::from)?;
    log.info(&format!(
        "{} dependencies found",
        root.all_dependencies().len()
    ));

    if settings.mode == Mode::Debug {
        log.stage(&format!(
            "Realizing dependencies into {} (dry run)",
            root.output_directory.display()
        ));
    } else {
        log.stage(&format!(
            "Realizing dependencies into {}",
            root.output_directory.display()
        ));
    }
    let ok = Realizer::new(fs, executor, log, settings).realize_root(&root);

    log.print_summary();

    let count = log.failure_count();
    if !ok || count > 0 {
        anyhow::bail!("{count} dependency step(s) failed");
    }
    Ok(())
}
