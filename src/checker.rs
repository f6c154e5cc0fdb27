//! Conflict detection over a parsed dependency tree.
//!
//! Two analyses run over the whole tree: libraries requested in more than one
//! version, and install destinations written by more than one source file.
//! Findings are logged; nothing is ever modified.
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::dependency::{Dependency, DependencyKind, RootDependency};
use crate::logging::Log;
use crate::operations::FileSystemOps;
use crate::paths;
use crate::version::{Version, VersionDifference};

/// Run both analyses on `root`. Returns `true` when no conflict was found.
pub fn check(root: &RootDependency, fs: &dyn FileSystemOps, log: &dyn Log) -> bool {
    let mut checker = Checker::new(fs, log);
    checker.check_root(root)
}

#[derive(Debug, Clone)]
struct LibraryEntry {
    declared_by: PathBuf,
    version: Version,
}

#[derive(Debug, Clone)]
struct FileEntry {
    declared_by: PathBuf,
    source: PathBuf,
}

/// Accumulates library versions and destinations seen so far.
pub struct Checker<'a> {
    fs: &'a dyn FileSystemOps,
    log: &'a dyn Log,
    libraries: HashMap<String, LibraryEntry>,
    files: HashMap<String, FileEntry>,
}

impl fmt::Debug for Checker<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checker")
            .field("libraries", &self.libraries.len())
            .field("files", &self.files.len())
            .finish_non_exhaustive()
    }
}

impl<'a> Checker<'a> {
    /// Create a checker with empty conflict maps.
    #[must_use]
    pub fn new(fs: &'a dyn FileSystemOps, log: &'a dyn Log) -> Self {
        Self {
            fs,
            log,
            libraries: HashMap::new(),
            files: HashMap::new(),
        }
    }

    /// Check every dependency of `root`, logging a verdict.
    pub fn check_root(&mut self, root: &RootDependency) -> bool {
        self.log.stage(&format!(
            "Checking dependencies of {} for potential conflicts...",
            root.breadcrumb_name
        ));
        if root.dependencies.is_empty() {
            self.log.info("NO DEPENDENCIES");
            self.log.info("...done! No issues detected.");
            return true;
        }

        let versions_ok = self.check_libraries(&root.dependencies);
        let files_ok = self.check_files(&root.dependencies);
        if versions_ok && files_ok {
            self.log.info("...done! No issues detected.");
            true
        } else {
            self.log
                .error("Some issues detected, read the logs for more details");
            false
        }
    }

    /// Version retained for `name` (case-insensitive) after checking.
    #[must_use]
    pub fn library_version(&self, name: &str) -> Option<&Version> {
        self.libraries
            .get(&name.to_lowercase())
            .map(|entry| &entry.version)
    }

    fn check_libraries(&mut self, dependencies: &[Dependency]) -> bool {
        let mut ok = true;
        for dependency in dependencies {
            if let DependencyKind::Library { name, version, .. } = &dependency.kind {
                ok &= self.record_library(dependency, name, version);
            }
            ok &= self.check_libraries(dependency.direct_dependencies());
        }
        ok
    }

    fn record_library(&mut self, dependency: &Dependency, name: &str, version: &Version) -> bool {
        let key = name.to_lowercase();
        let Some(existing) = self.libraries.get(&key).cloned() else {
            self.libraries.insert(
                key,
                LibraryEntry {
                    declared_by: dependency.parent_breadcrumb.clone(),
                    version: *version,
                },
            );
            return true;
        };
        let Some(difference) = existing.version.difference(version) else {
            return true;
        };

        let message = format!(
            "Library '{name}' is required in version {} by {} and in version {version} by {}",
            existing.version,
            existing.declared_by.display(),
            dependency.parent_breadcrumb.display()
        );
        match difference {
            VersionDifference::Major => self.log.error(&format!("{message} (major version mismatch)")),
            VersionDifference::Minor => self.log.warn(&format!("{message} (minor version mismatch)")),
            VersionDifference::Patch => self.log.warn(&format!("{message} (patch version mismatch)")),
        }

        if *version > existing.version {
            self.libraries.insert(
                key,
                LibraryEntry {
                    declared_by: dependency.parent_breadcrumb.clone(),
                    version: *version,
                },
            );
        }
        false
    }

    fn check_files(&mut self, dependencies: &[Dependency]) -> bool {
        let mut ok = true;
        for dependency in dependencies {
            for (source, target) in self.installed_files(dependency) {
                ok &= self.record_file(dependency, source, &target);
            }
            ok &= self.check_files(dependency.direct_dependencies());
        }
        ok
    }

    /// `(source, installed path)` pairs produced by a copy dependency.
    fn installed_files(&self, dependency: &Dependency) -> Vec<(PathBuf, PathBuf)> {
        match &dependency.kind {
            DependencyKind::File { path, destination } => path
                .file_name()
                .map(|name| vec![(path.clone(), destination.join(name))])
                .unwrap_or_default(),
            DependencyKind::Files { path, destination } => match self.fs.glob(path) {
                Ok(matches) => matches
                    .into_iter()
                    .flat_map(|entry| {
                        if self.fs.is_dir(&entry) {
                            let target = entry
                                .file_name()
                                .map_or_else(|| destination.clone(), |name| destination.join(name));
                            self.directory_files(&entry, &target)
                        } else {
                            entry
                                .file_name()
                                .map(|name| vec![(entry.clone(), destination.join(name))])
                                .unwrap_or_default()
                        }
                    })
                    .collect(),
                Err(e) => {
                    self.log
                        .warn(&format!("Unable to expand {}: {e}", path.display()));
                    Vec::new()
                }
            },
            DependencyKind::Directory { path, destination } => self.directory_files(path, destination),
            _ => Vec::new(),
        }
    }

    fn directory_files(&self, directory: &Path, destination: &Path) -> Vec<(PathBuf, PathBuf)> {
        match self.fs.files_in_directory(directory) {
            Ok(files) => files
                .into_iter()
                .filter_map(|file| {
                    let relative = file.strip_prefix(directory).ok()?.to_path_buf();
                    Some((file, destination.join(relative)))
                })
                .collect(),
            Err(e) => {
                self.log
                    .warn(&format!("Unable to list {}: {e}", directory.display()));
                Vec::new()
            }
        }
    }

    fn record_file(&mut self, dependency: &Dependency, source: PathBuf, target: &Path) -> bool {
        let key = paths::destination_key(target);
        let Some(existing) = self.files.get(&key) else {
            self.files.insert(
                key,
                FileEntry {
                    declared_by: dependency.parent_breadcrumb.clone(),
                    source,
                },
            );
            return true;
        };
        // Only destinations fold case; sources must match exactly.
        if paths::normalize(&existing.source) == paths::normalize(&source) {
            return true;
        }
        self.log.warn(&format!(
            "'{}' is written by {} (declared in {}) and overwritten by {} (declared in {})",
            target.display(),
            existing.source.display(),
            existing.declared_by.display(),
            source.display(),
            dependency.parent_breadcrumb.display()
        ));
        false
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::dependency::tests::{command, file, library, project, root};
    use crate::logging::{Level, RecordingLog};
    use crate::operations::MockFileSystemOps;

    const APP: &str = "/work/app.hbc";

    #[test]
    fn empty_tree_passes() {
        let fs = MockFileSystemOps::new();
        let log = RecordingLog::new(false);
        assert!(check(&root(vec![]), &fs, &log));
        assert!(log.messages().iter().any(|(_, m)| m == "NO DEPENDENCIES"));
    }

    #[test]
    fn minor_conflict_warns_and_keeps_higher_version() {
        let fs = MockFileSystemOps::new();
        let log = RecordingLog::new(false);
        let tree = root(vec![
            library(APP, "Zlib", "1.2.0", vec![]),
            project(APP, "Core", vec![library("/projects/Core/Core.hbc", "zlib", "1.3.0", vec![])]),
        ]);

        let mut checker = Checker::new(&fs, &log);
        assert!(!checker.check_root(&tree));
        assert_eq!(checker.library_version("ZLIB").unwrap().to_string(), "1.3.0");
        assert!(log.contains_warning("minor version mismatch"));
        assert!(log.contains_error("Some issues detected"));
    }

    #[test]
    fn major_conflict_is_an_error() {
        let fs = MockFileSystemOps::new();
        let log = RecordingLog::new(false);
        let tree = root(vec![
            library(APP, "Zlib", "2.0", vec![]),
            library(APP, "Zlib", "1.9", vec![]),
        ]);

        let mut checker = Checker::new(&fs, &log);
        assert!(!checker.check_root(&tree));
        assert!(log.contains_error("major version mismatch"));
        assert_eq!(checker.library_version("zlib").unwrap().to_string(), "2.0");
    }

    #[test]
    fn same_version_is_not_a_conflict() {
        let fs = MockFileSystemOps::new();
        let log = RecordingLog::new(false);
        let tree = root(vec![
            library(APP, "Zlib", "1.2", vec![]),
            library(APP, "ZLIB", "1.2.0", vec![command("/libs/zlib.hbc", "make")]),
        ]);
        assert!(check(&tree, &fs, &log));
        assert_eq!(log.count(Level::Warn), 0);
    }

    #[test]
    fn overwrites_from_different_sources_conflict() {
        let fs = MockFileSystemOps::new();
        let log = RecordingLog::new(false);
        let tree = root(vec![
            file(APP, "/a/zlib.dll", "/out/win64d/bin"),
            project(
                APP,
                "Core",
                vec![file("/projects/Core/Core.hbc", "/b/ZLIB.dll", "/out/win64d/BIN")],
            ),
        ]);
        assert!(!check(&tree, &fs, &log));
        assert!(log.contains_warning("overwritten by /b/ZLIB.dll"));
    }

    #[test]
    fn same_source_twice_is_fine() {
        let fs = MockFileSystemOps::new();
        let log = RecordingLog::new(false);
        let tree = root(vec![
            file(APP, "/a/zlib.dll", "/out/win64d/bin"),
            file("/other.hbc", "/a/zlib.dll", "/out/win64d/bin"),
        ]);
        assert!(check(&tree, &fs, &log));
    }

    #[test]
    fn sources_differing_only_in_case_conflict() {
        let fs = MockFileSystemOps::new();
        let log = RecordingLog::new(false);
        let tree = root(vec![
            file(APP, "/src/Lib.dll", "/out/bin"),
            file(APP, "/src/lib.dll", "/out/bin"),
        ]);
        assert!(!check(&tree, &fs, &log));
        assert!(log.contains_warning("overwritten by /src/lib.dll"));
    }

    #[test]
    fn destinations_differing_only_in_case_collide() {
        let fs = MockFileSystemOps::new();
        let log = RecordingLog::new(false);
        let tree = root(vec![
            file(APP, "/a/zlib.dll", "/out/bin"),
            file(APP, "/a/zlib.dll", "/OUT/Bin"),
            file(APP, "/b/zlib.dll", "/out/BIN"),
        ]);
        assert!(!check(&tree, &fs, &log));
        assert_eq!(log.count(Level::Warn), 1);
    }

    #[test]
    fn directory_and_glob_contents_are_compared() {
        let fs = MockFileSystemOps::new()
            .with_dir(
                "/assets",
                vec![PathBuf::from("/assets/icons/app.png"), PathBuf::from("/assets/readme.txt")],
            )
            .with_file("/docs/readme.txt")
            .with_glob("/docs/*.txt", vec![PathBuf::from("/docs/readme.txt")]);
        let log = RecordingLog::new(false);
        let tree = root(vec![
            Dependency::new(
                PathBuf::from(APP),
                DependencyKind::Directory {
                    path: PathBuf::from("/assets"),
                    destination: PathBuf::from("/out"),
                },
            ),
            Dependency::new(
                PathBuf::from(APP),
                DependencyKind::Files {
                    path: PathBuf::from("/docs/*.txt"),
                    destination: PathBuf::from("/out"),
                },
            ),
        ]);
        assert!(!check(&tree, &fs, &log));
        assert!(log.contains_warning("'/out/readme.txt' is written by /assets/readme.txt"));
        assert_eq!(log.count(Level::Warn), 1);
    }
}
