// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed workspace and a fluent builder so
// each integration test can lay out its own breadcrumb tree without
// repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use hansel_cli::cli::GlobalOpts;
use hansel_cli::commands::{self, Invocation};
use hansel_cli::config::{Mode, Settings};
use hansel_cli::logging::Logger;

/// Wrap `body` in a `<Breadcrumb>` root with the supported format version.
pub fn breadcrumb(body: &str) -> String {
    format!("<Breadcrumb FormatVersion=\"0.1.0\">\n{body}\n</Breadcrumb>\n")
}

/// An isolated workspace backed by a [`tempfile::TempDir`].
///
/// Breadcrumbs and source files live under the root; installs go to
/// `<root>/out`.
pub struct Workspace {
    /// Temporary directory holding the breadcrumb tree.
    pub root: tempfile::TempDir,
}

impl Workspace {
    /// Create an empty workspace.
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Canonical path of the workspace root.
    pub fn path(&self) -> PathBuf {
        dunce::canonicalize(self.root.path()).expect("canonicalize temp dir")
    }

    /// Install root passed on the command line.
    pub fn output(&self) -> PathBuf {
        self.path().join("out")
    }

    /// Per-platform install directory.
    pub fn platform_output(&self, platform: &str) -> PathBuf {
        self.output().join(platform)
    }

    /// Settings for `target` (relative to the root) as the CLI would build them.
    pub fn settings(&self, mode: Mode, target: &str, platform: &str, global: &GlobalOpts) -> Settings {
        let log = Logger::new(false);
        let target = self.path().join(target);
        let output = self.output();
        commands::build_settings(
            &Invocation {
                mode,
                target: &target,
                output: Some(&output),
                platform: platform.parse().expect("valid platform token"),
                verbose: false,
            },
            global,
            &log,
        )
        .expect("build settings")
    }
}

/// Fluent builder for [`Workspace`].
pub struct WorkspaceBuilder {
    workspace: Workspace,
}

impl WorkspaceBuilder {
    /// Begin building an empty workspace.
    pub fn new() -> Self {
        Self {
            workspace: Workspace::new(),
        }
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn with_file(self, relative: &str, content: &str) -> Self {
        let path = self.workspace.root.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, content).expect("write file");
        self
    }

    /// Write a breadcrumb whose `<Breadcrumb>` element wraps `body`.
    pub fn with_breadcrumb(self, relative: &str, body: &str) -> Self {
        self.with_file(relative, &breadcrumb(body))
    }

    /// Finish building and return the workspace.
    pub fn build(self) -> Workspace {
        self.workspace
    }
}

/// Whether `path` exists.
pub fn exists(path: &Path) -> bool {
    path.exists()
}
