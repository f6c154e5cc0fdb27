//! Command: print the dependency tree.
use std::io::Write;

use anyhow::{Context as _, Result};

use crate::cli::{GlobalOpts, ListArgs, ListFormat};
use crate::config::{Mode, Settings};
use crate::error::HanselError;
use crate::logging::Log;
use crate::manifest;
use crate::operations::{FileSystemOps, SystemFileSystemOps};

/// Run the list command, writing the tree to stdout.
///
/// # Errors
///
/// Returns an error if parsing fails or stdout cannot be written.
pub fn run(global: &GlobalOpts, args: &ListArgs, verbose: bool, log: &dyn Log) -> Result<()> {
    let settings = super::build_settings(
        &super::Invocation {
            mode: Mode::List,
            target: &args.target,
            output: None,
            platform: args.platform,
            verbose,
        },
        global,
        log,
    )?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_with(&settings, args.format, &SystemFileSystemOps, log, &mut out)
}

/// Parse the tree for `settings` and write it to `out` in `format`.
///
/// # Errors
///
/// Returns an error if parsing, serialization or writing fails.
pub fn run_with(
    settings: &Settings,
    format: ListFormat,
    fs: &dyn FileSystemOps,
    log: &dyn Log,
    out: &mut dyn Write,
) -> Result<()> {
    let root = manifest::parse_root(settings, fs, log).map_err(HanselError::from)?;
    match format {
        ListFormat::Text => out
            .write_all(root.render().as_bytes())
            .context("failed to write dependency tree")?,
        ListFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &root).context("failed to serialize dependency tree")?;
            writeln!(out).context("failed to write dependency tree")?;
        }
    }
    out.flush().context("failed to flush output")
}
