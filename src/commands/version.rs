//! Command: print version information.
use std::io::Write;

use anyhow::{Context as _, Result};

use crate::manifest::SUPPORTED_FORMAT_VERSION;

/// Version string baked in at build time.
#[must_use]
pub fn version() -> &'static str {
    option_env!("HANSEL_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the Hansel version and supported breadcrumb format to stdout.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn run() -> Result<()> {
    let mut out = std::io::stdout().lock();
    writeln!(
        out,
        "hansel {} (breadcrumb format {SUPPORTED_FORMAT_VERSION})",
        version()
    )
    .context("failed to write version")
}
