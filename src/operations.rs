//! Filesystem operation abstractions for dependency injection.
//!
//! Provides the [`FileSystemOps`] trait so that parsing, checking and
//! realizing can be unit-tested without touching the real filesystem.
//! Production code uses [`SystemFileSystemOps`]; tests use
//! `MockFileSystemOps`.

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

/// Abstraction over the filesystem queries and copies the installer needs.
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Returns `true` if `path` exists.
    fn exists(&self, path: &Path) -> bool;

    /// Returns `true` if `path` is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Resolve `path` to its canonical absolute form.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;

    /// Read a whole file as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;

    /// Copy `source` into `destination_dir`, creating the directory as needed
    /// and overwriting an existing file. Returns the written path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the copy fails.
    fn copy_file(&self, source: &Path, destination_dir: &Path) -> Result<PathBuf>;

    /// Recursively copy the directory `source` to `destination`, overwriting
    /// existing files.
    ///
    /// # Errors
    ///
    /// Returns an error if any entry cannot be read or copied.
    fn copy_directory(&self, source: &Path, destination: &Path) -> Result<()>;

    /// Expand a glob pattern into matching paths, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is invalid.
    fn glob(&self, pattern: &Path) -> Result<Vec<PathBuf>>;

    /// Every regular file below `dir`, recursively, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be walked.
    fn files_in_directory(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// Copy every match of `pattern` into `destination`.
    ///
    /// Matched files land directly in `destination`; matched directories are
    /// copied to `destination/<dirname>`. Returns the written paths.
    ///
    /// # Errors
    ///
    /// Returns the first copy or pattern error.
    fn copy_glob(&self, pattern: &Path, destination: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for entry in self.glob(pattern)? {
            if self.is_dir(&entry) {
                let name = entry
                    .file_name()
                    .with_context(|| format!("no directory name in {}", entry.display()))?;
                let target = destination.join(name);
                self.copy_directory(&entry, &target)?;
                written.push(target);
            } else {
                written.push(self.copy_file(&entry, destination)?);
            }
        }
        Ok(written)
    }
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        dunce::canonicalize(path).with_context(|| format!("canonicalize {}", path.display()))
    }

    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn copy_file(&self, source: &Path, destination_dir: &Path) -> Result<PathBuf> {
        let name = source
            .file_name()
            .with_context(|| format!("no file name in {}", source.display()))?;
        std::fs::create_dir_all(destination_dir)
            .with_context(|| format!("creating directory {}", destination_dir.display()))?;
        let target = destination_dir.join(name);
        std::fs::copy(source, &target)
            .with_context(|| format!("copying {} to {}", source.display(), target.display()))?;
        Ok(target)
    }

    fn copy_directory(&self, source: &Path, destination: &Path) -> Result<()> {
        std::fs::create_dir_all(destination)
            .with_context(|| format!("creating directory {}", destination.display()))?;
        for entry in std::fs::read_dir(source)
            .with_context(|| format!("reading directory {}", source.display()))?
        {
            let entry = entry.with_context(|| format!("reading entry in {}", source.display()))?;
            let src_path = entry.path();
            let dst_path = destination.join(entry.file_name());
            if src_path.is_dir() {
                self.copy_directory(&src_path, &dst_path)?;
            } else {
                std::fs::copy(&src_path, &dst_path).with_context(|| {
                    format!("copying {} to {}", src_path.display(), dst_path.display())
                })?;
            }
        }
        Ok(())
    }

    fn glob(&self, pattern: &Path) -> Result<Vec<PathBuf>> {
        let pattern_str = pattern.to_string_lossy();
        let mut matches = glob::glob(&pattern_str)
            .with_context(|| format!("invalid glob pattern {pattern_str}"))?
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("expanding glob pattern {pattern_str}"))?;
        matches.sort();
        Ok(matches)
    }

    fn files_in_directory(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(dir).follow_links(true) {
            let entry = entry.with_context(|| format!("walking directory {}", dir.display()))?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Mock [`FileSystemOps`] for unit tests.
///
/// Pre-configure files, directories and glob results using the builder-style
/// methods. Copies are recorded instead of performed and can be inspected
/// with [`copies`](Self::copies).
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFileSystemOps {
    files: std::collections::HashMap<PathBuf, String>,
    dirs: std::collections::HashMap<PathBuf, Vec<PathBuf>>,
    globs: std::collections::HashMap<PathBuf, Vec<PathBuf>>,
    copies: std::sync::Mutex<Vec<(PathBuf, PathBuf)>>,
}

#[cfg(test)]
impl MockFileSystemOps {
    /// Create an empty mock with nothing configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty regular file.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>) -> Self {
        self.with_file_content(path, "")
    }

    /// Register a regular file with content.
    #[must_use]
    pub fn with_file_content(mut self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.files.insert(path.into(), content.to_string());
        self
    }

    /// Register a directory and the files it contains (recursively).
    #[must_use]
    pub fn with_dir(mut self, dir: impl Into<PathBuf>, files: Vec<PathBuf>) -> Self {
        for file in &files {
            self.files.entry(file.clone()).or_default();
        }
        self.dirs.insert(dir.into(), files);
        self
    }

    /// Set the matches returned by [`FileSystemOps::glob`] for `pattern`.
    #[must_use]
    pub fn with_glob(mut self, pattern: impl Into<PathBuf>, matches: Vec<PathBuf>) -> Self {
        self.globs.insert(pattern.into(), matches);
        self
    }

    /// Recorded `(source, target)` copies, in call order.
    #[allow(clippy::expect_used)]
    pub fn copies(&self) -> Vec<(PathBuf, PathBuf)> {
        self.copies.lock().expect("mock copies poisoned").clone()
    }

    #[allow(clippy::expect_used)]
    fn record(&self, source: &Path, target: &Path) {
        self.copies
            .lock()
            .expect("mock copies poisoned")
            .push((source.to_path_buf(), target.to_path_buf()));
    }
}

#[cfg(test)]
impl FileSystemOps for MockFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.dirs.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains_key(path)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        if self.exists(path) {
            Ok(path.to_path_buf())
        } else {
            anyhow::bail!("mock: {} does not exist", path.display())
        }
    }

    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))
    }

    fn copy_file(&self, source: &Path, destination_dir: &Path) -> Result<PathBuf> {
        if !self.files.contains_key(source) {
            anyhow::bail!("mock: no such file {}", source.display());
        }
        let name = source
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("mock: no file name in {}", source.display()))?;
        let target = destination_dir.join(name);
        self.record(source, &target);
        Ok(target)
    }

    fn copy_directory(&self, source: &Path, destination: &Path) -> Result<()> {
        if !self.dirs.contains_key(source) {
            anyhow::bail!("mock: no such directory {}", source.display());
        }
        self.record(source, destination);
        Ok(())
    }

    fn glob(&self, pattern: &Path) -> Result<Vec<PathBuf>> {
        Ok(self.globs.get(pattern).cloned().unwrap_or_default())
    }

    fn files_in_directory(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        self.dirs
            .get(dir)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("mock: no entries configured for {}", dir.display()))
    }
}
