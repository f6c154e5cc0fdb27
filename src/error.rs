//! Domain-specific error types for the Hansel dependency installer.
//!
//! Internal modules return typed errors (e.g. [`ParseError`], [`ConfigError`]).
//! Command handlers wrap them in [`HanselError`] at the CLI boundary, which
//! then travels as an [`anyhow::Error`] and can be recovered with
//! `downcast_ref`.
//!
//! # Error hierarchy
//!
//! ```text
//! HanselError
//! ├── Parse(ParseError)     breadcrumb loading, restrict evaluation, references
//! ├── Config(ConfigError)   platform token, variable definitions, vars file
//! └── Realize(RealizeError) command processor, process exit status
//! ```

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::version::Version;

/// Top-level error type for the installer.
#[derive(Error, Debug)]
pub enum HanselError {
    /// A breadcrumb could not be turned into a dependency tree.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// The invocation settings are invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A dependency could not be realized.
    #[error("Realize error: {0}")]
    Realize(#[from] RealizeError),
}

/// Position of an element inside a breadcrumb file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Breadcrumb file containing the element.
    pub path: PathBuf,
    /// One-based line number of the element's start tag.
    pub line: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {})", self.path.display(), self.line)
    }
}

/// Errors raised while expanding `$(NAME)` placeholders.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubstitutionError {
    /// The placeholder names a variable that is not defined.
    #[error("Undefined variable '{0}'")]
    UndefinedVariable(String),

    /// Expansion kept producing placeholders (e.g. a self-referencing variable).
    #[error("Variable substitution of '{value}' did not terminate after {limit} replacements")]
    Overflow {
        /// The original value being substituted.
        value: String,
        /// Replacement limit that was reached.
        limit: usize,
    },
}

/// A version string that is not `MAJOR.MINOR[.PATCH]`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid version '{0}': expected MAJOR.MINOR[.PATCH]")]
pub struct VersionError(pub String);

/// Errors that abort parsing of a breadcrumb tree.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The breadcrumb file does not exist.
    #[error("No breadcrumb file found at {}", .0.display())]
    MissingFile(PathBuf),

    /// The breadcrumb file exists but could not be read.
    #[error("Failed to read breadcrumb {}: {source}", .path.display())]
    Io {
        /// Breadcrumb path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The document is not well-formed XML.
    #[error("Malformed breadcrumb {}: {message}", .path.display())]
    Malformed {
        /// Breadcrumb path.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// The root element is not `<Breadcrumb>`.
    #[error("Root element of {} must be <Breadcrumb>, found <{found}>", .path.display())]
    MissingRoot {
        /// Breadcrumb path.
        path: PathBuf,
        /// Name of the element found at the root.
        found: String,
    },

    /// The root element lacks a `FormatVersion` attribute.
    #[error("The <Breadcrumb> element of {} has no 'FormatVersion' attribute", .path.display())]
    MissingFormatVersion {
        /// Breadcrumb path.
        path: PathBuf,
    },

    /// The declared format is newer than this parser understands.
    #[error("Breadcrumb {} uses format version {found}, newer than the supported {supported}", .path.display())]
    UnsupportedFormatVersion {
        /// Breadcrumb path.
        path: PathBuf,
        /// Declared format version.
        found: Version,
        /// Newest format this parser reads.
        supported: Version,
    },

    /// A version attribute is malformed.
    #[error("{source} at {location}")]
    InvalidVersion {
        /// Underlying version error.
        source: VersionError,
        /// Element position.
        location: Location,
    },

    /// An element appears where it is not allowed.
    #[error("Element of type <{element}> is not supported at this location: {location}")]
    UnsupportedElement {
        /// Element name.
        element: String,
        /// Element position.
        location: Location,
    },

    /// A dependency specifier element has child elements.
    #[error("Dependency specifier elements must not have any children: <{element}> at {location}")]
    UnexpectedChildren {
        /// Element name.
        element: String,
        /// Element position.
        location: Location,
    },

    /// A required attribute is absent or unusable.
    #[error("Invalid <{element}> node (missing '{attribute}' attribute) at {location}")]
    MissingAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: &'static str,
        /// Element position.
        location: Location,
    },

    /// A `Destination` attribute does not start with `$(OUTPUT_DIR)`.
    #[error("Destination '{value}' must begin with '$(OUTPUT_DIR)' at {location}")]
    InvalidDestination {
        /// Raw attribute value.
        value: String,
        /// Element position.
        location: Location,
    },

    /// A project, library or script could not be found in any search root.
    #[error("Unable to resolve {kind} '{name}' at {location}")]
    UnresolvedReference {
        /// Kind of reference (`project`, `library`, `script`).
        kind: &'static str,
        /// Referenced name.
        name: String,
        /// Element position.
        location: Location,
    },

    /// A placeholder could not be expanded.
    #[error("{source} at {location}")]
    Substitution {
        /// Underlying substitution error.
        source: SubstitutionError,
        /// Element position.
        location: Location,
    },

    /// A `<Restrict>` attribute is neither a filter nor a defined variable.
    #[error("The <Restrict> attribute '{attribute}' does not match with any available filter or environment variable at {location}")]
    UnknownRestrictAttribute {
        /// Attribute name.
        attribute: String,
        /// Element position.
        location: Location,
    },

    /// A `<Restrict>` flag token is not recognised.
    #[error("'{flag}' is not a valid <{attribute}> flag at {location}")]
    InvalidRestrictFlag {
        /// Attribute name.
        attribute: &'static str,
        /// Offending token.
        flag: String,
        /// Element position.
        location: Location,
    },

    /// A `<Restrict>` flag attribute yields no flags.
    #[error("Platform specifier flags cannot be left empty: <{attribute}> at {location}")]
    EmptyRestrictFlags {
        /// Attribute name.
        attribute: &'static str,
        /// Element position.
        location: Location,
    },

    /// A breadcrumb transitively depends on itself.
    #[error("Circular dependency detected: {chain}")]
    CircularDependency {
        /// The breadcrumb chain, outermost first.
        chain: String,
    },
}

/// Errors that arise from invocation settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The platform token is not one of the known combinations.
    #[error("'{0}' is not a valid platform (expected win|macosx|linux followed by 32|64 and an optional 'd')")]
    InvalidPlatform(String),

    /// A `NAME=VALUE` definition is malformed.
    #[error("Variable definition '{definition}' is not valid: {reason}")]
    InvalidVariable {
        /// The offending definition.
        definition: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The same variable was defined twice.
    #[error("Variable '{0}' has been already defined")]
    DuplicateVariable(String),

    /// The variables file could not be read or parsed.
    #[error("Invalid variables file {}: {message}", .path.display())]
    VarsFile {
        /// Path to the file.
        path: PathBuf,
        /// Reader or parser diagnostic.
        message: String,
    },
}

/// Errors raised while realizing a single dependency.
#[derive(Error, Debug)]
pub enum RealizeError {
    /// No shell is available to run commands and scripts.
    #[error("No command processor is available to run '{0}'")]
    CommandProcessorUnavailable(String),

    /// The process could not be started.
    #[error("Failed to run '{command}': {message}")]
    Spawn {
        /// Command line.
        command: String,
        /// Diagnostic from the process layer.
        message: String,
    },

    /// The process exited unsuccessfully.
    #[error("'{command}' exited with status {}", .code.map_or_else(|| "unknown".to_string(), |c| c.to_string()))]
    NonZeroExit {
        /// Command line.
        command: String,
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
    },
}
