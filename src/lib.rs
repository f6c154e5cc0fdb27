//! Hansel build-time dependency installer.
//!
//! Every project or library describes what it needs in a breadcrumb
//! (`.hbc`) manifest: sub-projects, versioned libraries, files to copy and
//! commands or scripts to run. Hansel follows the breadcrumbs from a root
//! manifest, filters them for a target platform and installs everything
//! into `<output>/<platform>`.
//!
//! The public API is organised into four layers:
//!
//! - **[`manifest`]**: parse breadcrumbs into a dependency tree
//! - **[`dependency`]**: the tree itself, its rendering and realization
//! - **[`checker`]**: version and overwrite conflict detection
//! - **[`commands`]**: top-level subcommand orchestration (`install`, `debug`, `check`, `list`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod checker;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dependency;
pub mod error;
pub mod exec;
pub mod logging;
pub mod manifest;
pub mod operations;
pub mod paths;
pub mod platform;
pub mod version;
