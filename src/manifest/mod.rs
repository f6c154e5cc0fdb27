//! Breadcrumb (`.hbc`) parsing.
//!
//! A breadcrumb is an XML manifest:
//!
//! ```xml
//! <Breadcrumb FormatVersion="0.1.0">
//!   <Dependencies LibraryPath="../libs">
//!     <Library Name="Zlib" Version="1.2.11" Destination="$(OUTPUT_DIR)/libs"/>
//!     <Restrict Platform="win">
//!       <File Path="redist/vcruntime.dll" Destination="$(OUTPUT_DIR)"/>
//!     </Restrict>
//!   </Dependencies>
//! </Breadcrumb>
//! ```
//!
//! Parsing happens in three passes over an owned element tree: the XML is
//! read into [`document::Element`]s, `<Restrict>` blocks are pruned for the
//! active settings, and the remaining elements are turned into
//! [`Dependency`] nodes. `Project` and `Library` nodes recurse into their
//! own breadcrumbs with derived settings.
mod document;
mod restrict;
mod scope;

use std::path::{Path, PathBuf};

pub use document::Element;
use scope::Scope;

use crate::config::{OUTPUT_DIR, Settings};
use crate::dependency::{Dependency, DependencyKind, RootDependency};
use crate::error::{Location, ParseError};
use crate::logging::Log;
use crate::operations::FileSystemOps;
use crate::paths;
use crate::version::Version;

/// Newest breadcrumb format this build understands.
pub const SUPPORTED_FORMAT_VERSION: Version = Version::new(0, 1, Some(0));

/// File extension of breadcrumb manifests.
pub const BREADCRUMB_EXTENSION: &str = "hbc";

const ROOT_ELEMENT: &str = "Breadcrumb";
const FORMAT_VERSION_ATTRIBUTE: &str = "FormatVersion";
const DEPENDENCIES_ELEMENT: &str = "Dependencies";

/// Parse the breadcrumb named by `settings.target` into a tree.
///
/// # Errors
///
/// Returns the first [`ParseError`] found anywhere in the tree.
pub fn parse_root(
    settings: &Settings,
    fs: &dyn FileSystemOps,
    log: &dyn Log,
) -> Result<RootDependency, ParseError> {
    Parser::new(fs, log).parse_root(settings)
}

/// Recursive breadcrumb parser.
///
/// Tracks the breadcrumbs currently being parsed so that a manifest which
/// (directly or indirectly) includes itself fails instead of recursing
/// forever.
pub struct Parser<'a> {
    fs: &'a dyn FileSystemOps,
    log: &'a dyn Log,
    in_progress: Vec<PathBuf>,
}

impl std::fmt::Debug for Parser<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("in_progress", &self.in_progress)
            .finish_non_exhaustive()
    }
}

impl<'a> Parser<'a> {
    /// Create a parser reading through `fs`.
    #[must_use]
    pub fn new(fs: &'a dyn FileSystemOps, log: &'a dyn Log) -> Self {
        Self {
            fs,
            log,
            in_progress: Vec::new(),
        }
    }

    /// Parse the top-level breadcrumb.
    ///
    /// # Errors
    ///
    /// See [`parse_breadcrumb`](Self::parse_breadcrumb).
    pub fn parse_root(&mut self, settings: &Settings) -> Result<RootDependency, ParseError> {
        let dependencies = self.parse_breadcrumb(settings)?;
        let output_directory = settings
            .variables
            .get(OUTPUT_DIR)
            .map_or_else(|| settings.platform_output(), PathBuf::from);
        Ok(RootDependency {
            breadcrumb_name: settings.target_file_name(),
            breadcrumb_path: settings.target.clone(),
            output_directory,
            dependencies,
        })
    }

    /// Parse the breadcrumb at `settings.target` and, recursively, every
    /// breadcrumb it references.
    ///
    /// # Errors
    ///
    /// Fails on I/O and XML errors, unsupported format versions, unknown
    /// elements, missing or invalid attributes, unresolved references,
    /// substitution errors, invalid `<Restrict>` conditions and cycles.
    pub fn parse_breadcrumb(&mut self, settings: &Settings) -> Result<Vec<Dependency>, ParseError> {
        let path = settings.target.as_path();
        if !self.fs.exists(path) {
            return Err(ParseError::MissingFile(path.to_path_buf()));
        }
        let key = self
            .fs
            .canonicalize(path)
            .unwrap_or_else(|_| paths::normalize(path));
        if self.in_progress.contains(&key) {
            let chain = self
                .in_progress
                .iter()
                .chain(std::iter::once(&key))
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(ParseError::CircularDependency { chain });
        }

        self.in_progress.push(key);
        let result = self.parse_document(settings);
        self.in_progress.pop();
        result
    }

    fn parse_document(&mut self, settings: &Settings) -> Result<Vec<Dependency>, ParseError> {
        let path = settings.target.as_path();
        self.log.debug(&format!("Parsing {}", path.display()));
        let source = self.fs.read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let root = Element::parse(&source).map_err(|e| ParseError::Malformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if root.name != ROOT_ELEMENT {
            return Err(ParseError::MissingRoot {
                path: path.to_path_buf(),
                found: root.name,
            });
        }
        let format: Version = root
            .attribute(FORMAT_VERSION_ATTRIBUTE)
            .ok_or_else(|| ParseError::MissingFormatVersion {
                path: path.to_path_buf(),
            })?
            .parse()
            .map_err(|source| ParseError::InvalidVersion {
                source,
                location: Location {
                    path: path.to_path_buf(),
                    line: root.line,
                },
            })?;
        if format > SUPPORTED_FORMAT_VERSION {
            return Err(ParseError::UnsupportedFormatVersion {
                path: path.to_path_buf(),
                found: format,
                supported: SUPPORTED_FORMAT_VERSION,
            });
        }

        let scope = Scope::new(settings, self.log);
        let sections = restrict::prune(root.children, &scope)?;

        let mut dependencies = Vec::new();
        for section in &sections {
            if section.name != DEPENDENCIES_ELEMENT {
                return Err(unsupported(section, &scope));
            }
            dependencies.extend(self.parse_section(section, &scope)?);
        }

        if dependencies.is_empty() {
            self.log
                .info_verbose(&format!("{} declares no dependencies", path.display()));
        }
        Ok(dependencies)
    }

    /// Parse the children of one `<Dependencies>` element.
    fn parse_section(&mut self, section: &Element, scope: &Scope<'_>) -> Result<Vec<Dependency>, ParseError> {
        let roots = SearchRoots {
            projects: self.roots(section, "ProjectPath", scope)?,
            libraries: self.roots(section, "LibraryPath", scope)?,
            scripts: self.roots(section, "ScriptPath", scope)?,
        };

        let mut dependencies = Vec::with_capacity(section.children.len());
        for element in &section.children {
            let kind = match element.name.as_str() {
                "Project" | "Library" | "File" | "Files" | "Directory" | "Command" | "Script" => {
                    if !element.children.is_empty() {
                        return Err(ParseError::UnexpectedChildren {
                            element: element.name.clone(),
                            location: scope.location(element),
                        });
                    }
                    self.parse_kind(element, scope, &roots)?
                }
                _ => return Err(unsupported(element, scope)),
            };
            dependencies.push(Dependency::new(scope.breadcrumb.to_path_buf(), kind));
        }
        Ok(dependencies)
    }

    fn roots(&self, section: &Element, attribute: &str, scope: &Scope<'_>) -> Result<Vec<PathBuf>, ParseError> {
        let list = scope.substituted(section, attribute)?;
        Ok(paths::split_roots(list.as_deref(), scope.directory()))
    }

    fn parse_kind(
        &mut self,
        element: &Element,
        scope: &Scope<'_>,
        roots: &SearchRoots,
    ) -> Result<DependencyKind, ParseError> {
        let kind = match element.name.as_str() {
            "Project" => {
                let name = scope.required_name(element, "Name")?;
                let destination = scope.destination(element)?;
                let path = self.locate(element, scope, &roots.projects, Path::new(&name), "project", &name)?;
                let dependencies = self.parse_nested(&path, &name, &destination, scope)?;
                DependencyKind::Project {
                    name,
                    path,
                    destination,
                    dependencies,
                }
            }
            "Library" => {
                let name = scope.required_name(element, "Name")?;
                let version = scope.version(element, "Version")?;
                let destination = scope.destination(element)?;
                let relative = Path::new(&name).join(version.to_string());
                let display = format!("{name}/{version}");
                let path = self.locate(element, scope, &roots.libraries, &relative, "library", &display)?;
                let dependencies = self.parse_nested(&path, &name, &destination, scope)?;
                DependencyKind::Library {
                    name,
                    version,
                    path,
                    destination,
                    dependencies,
                }
            }
            "File" => DependencyKind::File {
                path: scope.required_path(element, "Path")?,
                destination: scope.destination(element)?,
            },
            "Files" => DependencyKind::Files {
                path: scope.required_path(element, "Path")?,
                destination: scope.destination(element)?,
            },
            "Directory" => DependencyKind::Directory {
                path: scope.required_path(element, "Path")?,
                destination: scope.destination(element)?,
            },
            "Command" => DependencyKind::Command {
                code: scope.required(element, "Code")?,
            },
            _ => self.parse_script(element, scope, &roots.scripts)?,
        };
        Ok(kind)
    }

    fn parse_script(
        &self,
        element: &Element,
        scope: &Scope<'_>,
        roots: &[PathBuf],
    ) -> Result<DependencyKind, ParseError> {
        let interpreter = scope.name(element, "Interpreter")?.map(|interpreter| {
            if interpreter.contains(['/', '\\']) {
                paths::make_absolute(Path::new(&interpreter), scope.directory())
                    .to_string_lossy()
                    .into_owned()
            } else {
                interpreter
            }
        });
        let name = scope.name(element, "Name")?;

        let path = match (scope.absolute_path(element, "Path")?, &name) {
            (Some(path), _) => path,
            (None, Some(name)) => paths::resolve(Path::new(name), roots, self.fs).ok_or_else(|| {
                ParseError::UnresolvedReference {
                    kind: "script",
                    name: name.clone(),
                    location: scope.location(element),
                }
            })?,
            (None, None) => return Err(scope.missing(element, "Path")),
        };
        let name = name.unwrap_or_else(|| {
            path.file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
        });

        Ok(DependencyKind::Script {
            interpreter,
            name,
            path,
            arguments: scope.required(element, "Arguments")?,
        })
    }

    /// Directory of a project or library: explicit `Path`, else the first
    /// search root containing `relative`.
    fn locate(
        &self,
        element: &Element,
        scope: &Scope<'_>,
        roots: &[PathBuf],
        relative: &Path,
        kind: &'static str,
        display: &str,
    ) -> Result<PathBuf, ParseError> {
        if let Some(path) = scope.absolute_path(element, "Path")? {
            return Ok(path);
        }
        paths::resolve(relative, roots, self.fs).ok_or_else(|| ParseError::UnresolvedReference {
            kind,
            name: display.to_string(),
            location: scope.location(element),
        })
    }

    /// Parse `<directory>/<name>.hbc` with `OUTPUT_DIR` set to `destination`.
    fn parse_nested(
        &mut self,
        directory: &Path,
        name: &str,
        destination: &Path,
        scope: &Scope<'_>,
    ) -> Result<Vec<Dependency>, ParseError> {
        let breadcrumb = directory.join(format!("{name}.{BREADCRUMB_EXTENSION}"));
        let nested = scope.settings.nested(breadcrumb, destination);
        self.parse_breadcrumb(&nested)
    }
}

/// Search roots declared on a `<Dependencies>` element.
struct SearchRoots {
    projects: Vec<PathBuf>,
    libraries: Vec<PathBuf>,
    scripts: Vec<PathBuf>,
}

fn unsupported(element: &Element, scope: &Scope<'_>) -> ParseError {
    ParseError::UnsupportedElement {
        element: element.name.clone(),
        location: scope.location(element),
    }
}
