//! Realizing a dependency tree: copying files and running commands.
use std::fmt;
use std::path::Path;

use super::{Dependency, DependencyKind, RootDependency};
use crate::config::{ExitCodePolicy, Mode, Settings};
use crate::error::{HanselError, RealizeError};
use crate::exec::Executor;
use crate::logging::{Log, StepStatus};
use crate::operations::FileSystemOps;

/// Performs the side effects described by a dependency tree.
///
/// Realization is best-effort: a failing node is logged and recorded, and
/// its siblings still run. Within every `Project`/`Library` (and at the
/// root) package dependencies are realized before the remaining payload.
pub struct Realizer<'a> {
    fs: &'a dyn FileSystemOps,
    executor: &'a dyn Executor,
    log: &'a dyn Log,
    debug: bool,
    verbose: bool,
    exit_codes: ExitCodePolicy,
}

impl fmt::Debug for Realizer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Realizer")
            .field("debug", &self.debug)
            .field("verbose", &self.verbose)
            .field("exit_codes", &self.exit_codes)
            .finish_non_exhaustive()
    }
}

impl<'a> Realizer<'a> {
    /// Create a realizer for `settings`; [`Mode::Debug`] selects dry-run.
    #[must_use]
    pub fn new(
        fs: &'a dyn FileSystemOps,
        executor: &'a dyn Executor,
        log: &'a dyn Log,
        settings: &Settings,
    ) -> Self {
        Self {
            fs,
            executor,
            log,
            debug: settings.mode == Mode::Debug,
            verbose: settings.verbose,
            exit_codes: settings.exit_codes,
        }
    }

    /// Realize every top-level dependency. Returns `true` if all succeeded.
    pub fn realize_root(&self, root: &RootDependency) -> bool {
        self.realize_all(&root.dependencies)
    }

    /// Realize `dependencies`, packages first. Never stops early.
    fn realize_all(&self, dependencies: &[Dependency]) -> bool {
        let mut ok = true;
        for dependency in dependencies.iter().filter(|d| d.is_package()) {
            ok &= self.realize(dependency);
        }
        for dependency in dependencies.iter().filter(|d| !d.is_package()) {
            ok &= self.realize(dependency);
        }
        ok
    }

    /// Realize a single node (and, for packages, its subtree).
    pub fn realize(&self, dependency: &Dependency) -> bool {
        match &dependency.kind {
            DependencyKind::Project { dependencies, .. }
            | DependencyKind::Library { dependencies, .. } => {
                let mut ok = true;
                for child in dependencies.iter().filter(|d| d.is_package()) {
                    ok &= self.realize(child);
                }
                if self.verbose || self.debug {
                    self.log
                        .info(&format!("Realizing dependencies of {}", dependency.describe()));
                }
                for child in dependencies.iter().filter(|d| !d.is_package()) {
                    ok &= self.realize(child);
                }
                ok
            }
            DependencyKind::File { path, destination } => {
                self.copy_step(dependency, || {
                    if self.debug {
                        self.log.dry_run(&format!(
                            "copy {} -> {}",
                            path.display(),
                            destination.display()
                        ));
                        return Ok(());
                    }
                    self.fs.copy_file(path, destination).map(|_| ())
                })
            }
            DependencyKind::Files { path, destination } => {
                self.copy_step(dependency, || self.copy_files(path, destination))
            }
            DependencyKind::Directory { path, destination } => {
                self.copy_step(dependency, || {
                    if self.debug {
                        self.log.dry_run(&format!(
                            "copy directory {} -> {}",
                            path.display(),
                            destination.display()
                        ));
                        return Ok(());
                    }
                    self.fs.copy_directory(path, destination)
                })
            }
            DependencyKind::Command { code } => self.process_step(dependency, code),
            DependencyKind::Script {
                interpreter,
                path,
                arguments,
                ..
            } => {
                let command_line = script_command_line(interpreter.as_deref(), path, arguments);
                self.process_step(dependency, &command_line)
            }
        }
    }

    fn copy_files(&self, pattern: &Path, destination: &Path) -> anyhow::Result<()> {
        if self.debug {
            self.log.dry_run(&format!(
                "copy files matching {} -> {}",
                pattern.display(),
                destination.display()
            ));
            for entry in self.fs.glob(pattern)? {
                if let Some(name) = entry.file_name() {
                    self.log.dry_run(&format!(
                        "    {} -> {}",
                        entry.display(),
                        destination.join(name).display()
                    ));
                }
            }
            return Ok(());
        }

        let written = self.fs.copy_glob(pattern, destination)?;
        if written.is_empty() {
            self.log
                .warn(&format!("No files match the pattern {}", pattern.display()));
        }
        for target in &written {
            self.log.debug(&format!("copied {}", target.display()));
        }
        Ok(())
    }

    /// Run a copy closure and record its outcome.
    fn copy_step(&self, dependency: &Dependency, copy: impl FnOnce() -> anyhow::Result<()>) -> bool {
        let name = dependency.describe();
        match copy() {
            Ok(()) => {
                let status = if self.debug {
                    StepStatus::DryRun
                } else {
                    StepStatus::Ok
                };
                self.log.record_step(&name, status, None);
                true
            }
            Err(e) => {
                let message = format!("{e:#}");
                self.log.error(&format!(
                    "Failed to realize {name} (declared in {}): {message}",
                    dependency.parent_breadcrumb.display()
                ));
                self.log.record_step(&name, StepStatus::Failed, Some(&message));
                false
            }
        }
    }

    /// Run a command line and record its outcome.
    fn process_step(&self, dependency: &Dependency, command_line: &str) -> bool {
        let name = dependency.describe();
        if self.debug {
            self.log.dry_run(&format!("run {command_line}"));
            self.log.record_step(&name, StepStatus::DryRun, None);
            return true;
        }

        match self.execute(command_line) {
            Ok(()) => {
                self.log.record_step(&name, StepStatus::Ok, None);
                true
            }
            Err(e) => {
                let message = e.to_string();
                self.log.error(&format!(
                    "{} (declared in {})",
                    HanselError::from(e),
                    dependency.parent_breadcrumb.display()
                ));
                self.log.record_step(&name, StepStatus::Failed, Some(&message));
                false
            }
        }
    }

    fn execute(&self, command_line: &str) -> Result<(), RealizeError> {
        if !self.executor.has_command_processor() {
            return Err(RealizeError::CommandProcessorUnavailable(
                command_line.to_string(),
            ));
        }

        self.log.debug(&format!("running {command_line}"));
        let result = self
            .executor
            .run_shell(command_line)
            .map_err(|e| RealizeError::Spawn {
                command: command_line.to_string(),
                message: format!("{e:#}"),
            })?;

        if !result.success {
            let error = RealizeError::NonZeroExit {
                command: command_line.to_string(),
                code: result.code,
            };
            match self.exit_codes {
                ExitCodePolicy::Enforce => return Err(error),
                ExitCodePolicy::Ignore => self.log.warn(&error.to_string()),
            }
        }
        Ok(())
    }
}

/// Build `[interpreter ]"path"[ arguments]`.
#[must_use]
pub fn script_command_line(interpreter: Option<&str>, path: &Path, arguments: &str) -> String {
    let mut line = String::new();
    if let Some(interpreter) = interpreter.filter(|i| !i.trim().is_empty()) {
        line.push_str(interpreter);
        line.push(' ');
    }
    line.push('"');
    line.push_str(&path.to_string_lossy());
    line.push('"');
    if !arguments.trim().is_empty() {
        line.push(' ');
        line.push_str(arguments);
    }
    line
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::tests::settings_for;
    use crate::dependency::tests::{command, file, library, project, root};
    use crate::exec::{ExecResult, MockExecutor};
    use crate::logging::RecordingLog;
    use crate::operations::MockFileSystemOps;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    const OK: ExecResult = ExecResult {
        success: true,
        code: Some(0),
    };

    fn settings(mode: Mode) -> Settings {
        let mut s = settings_for(Path::new("/work/app.hbc"));
        s.mode = mode;
        s
    }

    fn recording_executor(calls: Arc<Mutex<Vec<String>>>) -> MockExecutor {
        let mut executor = MockExecutor::new();
        executor.expect_has_command_processor().return_const(true);
        executor.expect_run_shell().returning(move |code| {
            calls.lock().unwrap().push(code.to_string());
            Ok(OK)
        });
        executor
    }

    #[test]
    fn file_is_copied_into_destination() {
        let fs = MockFileSystemOps::new().with_file("/src/a.txt");
        let executor = MockExecutor::new();
        let log = RecordingLog::new(false);
        let realizer = Realizer::new(&fs, &executor, &log, &settings(Mode::Install));

        assert!(realizer.realize(&file("/work/app.hbc", "/src/a.txt", "/out/win64d/bin")));
        assert_eq!(
            fs.copies(),
            vec![(PathBuf::from("/src/a.txt"), PathBuf::from("/out/win64d/bin/a.txt"))]
        );
        assert_eq!(log.steps()[0].status, StepStatus::Ok);
    }

    #[test]
    fn debug_mode_touches_nothing() {
        let fs = MockFileSystemOps::new().with_file("/src/a.txt");
        let mut executor = MockExecutor::new();
        executor.expect_run_shell().never();
        let log = RecordingLog::new(false);
        let realizer = Realizer::new(&fs, &executor, &log, &settings(Mode::Debug));

        let tree = root(vec![
            file("/work/app.hbc", "/src/a.txt", "/out/win64d"),
            command("/work/app.hbc", "make install"),
        ]);
        assert!(realizer.realize_root(&tree));
        assert!(fs.copies().is_empty());
        assert!(log.contains_dry_run("/src/a.txt"));
        assert!(log.contains_dry_run("run make install"));
        assert!(log.steps().iter().all(|s| s.status == StepStatus::DryRun));
    }

    #[test]
    fn files_debug_lists_each_match() {
        let fs = MockFileSystemOps::new().with_glob(
            "/src/*.dll",
            vec![PathBuf::from("/src/a.dll"), PathBuf::from("/src/b.dll")],
        );
        let executor = MockExecutor::new();
        let log = RecordingLog::new(false);
        let realizer = Realizer::new(&fs, &executor, &log, &settings(Mode::Debug));

        let files = Dependency::new(
            PathBuf::from("/work/app.hbc"),
            DependencyKind::Files {
                path: PathBuf::from("/src/*.dll"),
                destination: PathBuf::from("/out/bin"),
            },
        );
        assert!(realizer.realize(&files));
        assert!(log.contains_dry_run("/src/a.dll"));
        assert!(log.contains_dry_run("/out/bin/b.dll"));
    }

    #[test]
    fn files_copies_every_match() {
        let fs = MockFileSystemOps::new()
            .with_file("/src/a.dll")
            .with_dir("/src/plugins.dll", vec![PathBuf::from("/src/plugins.dll/x")])
            .with_glob(
                "/src/*.dll",
                vec![PathBuf::from("/src/a.dll"), PathBuf::from("/src/plugins.dll")],
            );
        let executor = MockExecutor::new();
        let log = RecordingLog::new(false);
        let realizer = Realizer::new(&fs, &executor, &log, &settings(Mode::Install));

        let files = Dependency::new(
            PathBuf::from("/work/app.hbc"),
            DependencyKind::Files {
                path: PathBuf::from("/src/*.dll"),
                destination: PathBuf::from("/out/bin"),
            },
        );
        assert!(realizer.realize(&files));
        assert_eq!(
            fs.copies(),
            vec![
                (PathBuf::from("/src/a.dll"), PathBuf::from("/out/bin/a.dll")),
                (PathBuf::from("/src/plugins.dll"), PathBuf::from("/out/bin/plugins.dll")),
            ]
        );
    }

    #[test]
    fn failures_do_not_stop_siblings() {
        let fs = MockFileSystemOps::new().with_file("/src/ok.txt");
        let executor = MockExecutor::new();
        let log = RecordingLog::new(false);
        let realizer = Realizer::new(&fs, &executor, &log, &settings(Mode::Install));

        let tree = root(vec![
            file("/work/app.hbc", "/src/missing.txt", "/out"),
            file("/work/app.hbc", "/src/ok.txt", "/out"),
        ]);
        assert!(!realizer.realize_root(&tree));
        assert_eq!(fs.copies().len(), 1);
        assert!(log.contains_error("declared in /work/app.hbc"));
        let statuses: Vec<StepStatus> = log.steps().iter().map(|s| s.status).collect();
        assert_eq!(statuses, vec![StepStatus::Failed, StepStatus::Ok]);
    }

    #[test]
    fn packages_are_realized_before_payload() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let executor = recording_executor(Arc::clone(&calls));
        let fs = MockFileSystemOps::new();
        let log = RecordingLog::new(false);
        let realizer = Realizer::new(&fs, &executor, &log, &settings(Mode::Install));

        let tree = root(vec![
            command("/work/app.hbc", "root payload"),
            project(
                "/work/app.hbc",
                "Core",
                vec![
                    command("/projects/Core/Core.hbc", "core payload"),
                    library("/projects/Core/Core.hbc", "Zlib", "1.2", vec![command("/libs/zlib.hbc", "zlib payload")]),
                ],
            ),
        ]);
        assert!(realizer.realize_root(&tree));
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["zlib payload", "core payload", "root payload"]
        );
    }

    #[test]
    fn non_zero_exit_fails_by_default() {
        let mut executor = MockExecutor::new();
        executor.expect_has_command_processor().return_const(true);
        executor.expect_run_shell().returning(|_| {
            Ok(ExecResult {
                success: false,
                code: Some(2),
            })
        });
        let fs = MockFileSystemOps::new();
        let log = RecordingLog::new(false);
        let realizer = Realizer::new(&fs, &executor, &log, &settings(Mode::Install));

        assert!(!realizer.realize(&command("/work/app.hbc", "make")));
        assert!(log.contains_error("'make' exited with status 2"));
        assert_eq!(log.steps()[0].status, StepStatus::Failed);
    }

    #[test]
    fn non_zero_exit_can_be_ignored() {
        let mut executor = MockExecutor::new();
        executor.expect_has_command_processor().return_const(true);
        executor.expect_run_shell().returning(|_| {
            Ok(ExecResult {
                success: false,
                code: Some(1),
            })
        });
        let fs = MockFileSystemOps::new();
        let log = RecordingLog::new(false);
        let mut s = settings(Mode::Install);
        s.exit_codes = ExitCodePolicy::Ignore;
        let realizer = Realizer::new(&fs, &executor, &log, &s);

        assert!(realizer.realize(&command("/work/app.hbc", "make")));
        assert!(log.contains_warning("exited with status 1"));
    }

    #[test]
    fn missing_command_processor_fails() {
        let mut executor = MockExecutor::new();
        executor.expect_has_command_processor().return_const(false);
        executor.expect_run_shell().never();
        let fs = MockFileSystemOps::new();
        let log = RecordingLog::new(false);
        let realizer = Realizer::new(&fs, &executor, &log, &settings(Mode::Install));

        assert!(!realizer.realize(&command("/work/app.hbc", "make")));
        assert!(log.contains_error("No command processor"));
    }

    #[test]
    fn script_runs_through_interpreter() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let executor = recording_executor(Arc::clone(&calls));
        let fs = MockFileSystemOps::new();
        let log = RecordingLog::new(false);
        let realizer = Realizer::new(&fs, &executor, &log, &settings(Mode::Install));

        let script = Dependency::new(
            PathBuf::from("/work/app.hbc"),
            DependencyKind::Script {
                interpreter: Some("python3".to_string()),
                name: "gen.py".to_string(),
                path: PathBuf::from("/work/scripts/gen.py"),
                arguments: "--fast".to_string(),
            },
        );
        assert!(realizer.realize(&script));
        assert_eq!(*calls.lock().unwrap(), vec!["python3 \"/work/scripts/gen.py\" --fast"]);
    }

    #[test]
    fn script_command_line_shapes() {
        let path = Path::new("/s/run.sh");
        assert_eq!(script_command_line(None, path, ""), "\"/s/run.sh\"");
        assert_eq!(script_command_line(Some("bash"), path, ""), "bash \"/s/run.sh\"");
        assert_eq!(script_command_line(Some(" "), path, "a b"), "\"/s/run.sh\" a b");
    }

    #[test]
    fn verbose_prints_banner_for_packages() {
        let fs = MockFileSystemOps::new();
        let executor = MockExecutor::new();
        let log = RecordingLog::new(true);
        let mut s = settings(Mode::Install);
        s.verbose = true;
        let realizer = Realizer::new(&fs, &executor, &log, &s);

        assert!(realizer.realize(&project("/work/app.hbc", "Core", vec![])));
        assert!(
            log.messages()
                .iter()
                .any(|(_, m)| m == "Realizing dependencies of PROJECT Core")
        );
    }
}
