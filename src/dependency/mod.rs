//! Dependency tree: typed nodes produced by the breadcrumb parser.
//!
//! The tree is built once per invocation and read-only afterwards. Each
//! node records the breadcrumb that declared it; `Project` and `Library`
//! nodes own the dependencies parsed from their own breadcrumb.
pub mod realize;

use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;

use crate::version::Version;

/// Prefix used for top-level entries when rendering a tree.
const ROOT_PREFIX: &str = "  |";

/// Extra indentation added for each nesting level.
const CHILD_PREFIX: &str = "      |";

/// One node of the dependency tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    /// Breadcrumb that declared this node.
    pub parent_breadcrumb: PathBuf,
    /// Node payload.
    #[serde(flatten)]
    pub kind: DependencyKind,
}

/// The kinds of dependency a breadcrumb can declare.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DependencyKind {
    /// A sub-project with its own breadcrumb.
    Project {
        /// Project name; also the breadcrumb file stem.
        name: String,
        /// Resolved project directory.
        path: PathBuf,
        /// Install directory.
        destination: PathBuf,
        /// Dependencies declared by the project's breadcrumb.
        dependencies: Vec<Dependency>,
    },
    /// A versioned library with its own breadcrumb.
    Library {
        /// Library name; conflict identity, compared case-insensitively.
        name: String,
        /// Requested version.
        version: Version,
        /// Resolved library directory.
        path: PathBuf,
        /// Install directory.
        destination: PathBuf,
        /// Dependencies declared by the library's breadcrumb.
        dependencies: Vec<Dependency>,
    },
    /// A single file copied into a directory.
    File {
        /// Absolute source file.
        path: PathBuf,
        /// Destination directory.
        destination: PathBuf,
    },
    /// Every match of a glob pattern copied into a directory.
    Files {
        /// Absolute glob pattern.
        path: PathBuf,
        /// Destination directory.
        destination: PathBuf,
    },
    /// A directory tree copied recursively.
    Directory {
        /// Absolute source directory.
        path: PathBuf,
        /// Destination directory.
        destination: PathBuf,
    },
    /// A shell command line.
    Command {
        /// Command line after variable substitution.
        code: String,
    },
    /// A script run through an optional interpreter.
    Script {
        /// Interpreter program, if any.
        interpreter: Option<String>,
        /// Display name of the script.
        name: String,
        /// Resolved script file.
        path: PathBuf,
        /// Arguments after variable substitution.
        arguments: String,
    },
}

impl Dependency {
    /// Create a node declared by `parent_breadcrumb`.
    #[must_use]
    pub const fn new(parent_breadcrumb: PathBuf, kind: DependencyKind) -> Self {
        Self {
            parent_breadcrumb,
            kind,
        }
    }

    /// Children of a `Project` or `Library`; empty for leaves.
    #[must_use]
    pub fn direct_dependencies(&self) -> &[Self] {
        match &self.kind {
            DependencyKind::Project { dependencies, .. }
            | DependencyKind::Library { dependencies, .. } => dependencies,
            _ => &[],
        }
    }

    /// All descendants: direct children first, then each child's subtree in
    /// child order.
    #[must_use]
    pub fn all_dependencies(&self) -> Vec<&Self> {
        let direct = self.direct_dependencies();
        let mut all: Vec<&Self> = direct.iter().collect();
        for child in direct {
            all.extend(child.all_dependencies());
        }
        all
    }

    /// Whether this node is a `Project` or `Library`.
    #[must_use]
    pub const fn is_package(&self) -> bool {
        matches!(
            self.kind,
            DependencyKind::Project { .. } | DependencyKind::Library { .. }
        )
    }

    /// Upper-case kind label used in listings.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self.kind {
            DependencyKind::Project { .. } => "PROJECT",
            DependencyKind::Library { .. } => "LIBRARY",
            DependencyKind::File { .. } => "FILE",
            DependencyKind::Files { .. } => "FILES",
            DependencyKind::Directory { .. } => "DIRECTORY",
            DependencyKind::Command { .. } => "COMMAND",
            DependencyKind::Script { .. } => "SCRIPT",
        }
    }

    /// Identifying value shown next to the label.
    #[must_use]
    pub fn value(&self) -> String {
        match &self.kind {
            DependencyKind::Project { name, .. } => name.clone(),
            DependencyKind::Library { name, version, .. } => format!("{name} {version}"),
            DependencyKind::File { path, .. }
            | DependencyKind::Files { path, .. }
            | DependencyKind::Directory { path, .. }
            | DependencyKind::Script { path, .. } => path.display().to_string(),
            DependencyKind::Command { code } => code.clone(),
        }
    }

    /// `LABEL value`, used in logs and the install summary.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} {}", self.label(), self.value())
    }

    /// Append this node and its children to `out`.
    ///
    /// Each child is preceded by a spacer line carrying the extended prefix.
    pub fn print(&self, prefix: &str, out: &mut String) {
        let _ = writeln!(out, "{prefix}-- [{}] {}", self.label(), self.value());
        let children = self.direct_dependencies();
        if children.is_empty() {
            return;
        }
        let next_prefix = format!("{prefix}{CHILD_PREFIX}");
        for child in children {
            let _ = writeln!(out, "{next_prefix}");
            child.print(&next_prefix, out);
        }
    }
}

/// The tree rooted at the breadcrumb named on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootDependency {
    /// File name of the root breadcrumb.
    pub breadcrumb_name: String,
    /// Absolute path of the root breadcrumb.
    pub breadcrumb_path: PathBuf,
    /// Install root for the active platform.
    pub output_directory: PathBuf,
    /// Top-level dependencies in document order.
    pub dependencies: Vec<Dependency>,
}

impl RootDependency {
    /// Every node in the tree, top-level entries first.
    #[must_use]
    pub fn all_dependencies(&self) -> Vec<&Dependency> {
        let mut all: Vec<&Dependency> = self.dependencies.iter().collect();
        for dependency in &self.dependencies {
            all.extend(dependency.all_dependencies());
        }
        all
    }

    /// Text rendering of the tree, headed by the breadcrumb name.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("{}\n", self.breadcrumb_name);
        if self.dependencies.is_empty() {
            out.push_str("\n  NO DEPENDENCIES\n");
            return out;
        }
        for dependency in &self.dependencies {
            let _ = writeln!(out, "{ROOT_PREFIX}");
            dependency.print(ROOT_PREFIX, &mut out);
        }
        out
    }
}
