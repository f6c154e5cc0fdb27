//! Command-line interface definitions.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::platform::Platform;

/// Top-level CLI entry point for the Hansel dependency installer.
#[derive(Parser, Debug)]
#[command(
    name = "hansel",
    about = "Install build-time dependencies described by breadcrumb manifests",
    version
)]
pub struct Cli {
    #[allow(missing_docs)]
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[allow(missing_docs)]
    #[command(flatten)]
    pub global: GlobalOpts,
}

impl Cli {
    /// Shared options with the `-e` definitions given before and after the
    /// subcommand, in command-line order.
    #[must_use]
    pub fn global_opts(&self) -> GlobalOpts {
        let mut global = self.global.clone();
        global.env.extend(self.command.definitions().iter().cloned());
        global
    }
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Define a variable for `$(NAME)` placeholders (repeatable)
    #[arg(short = 'e', long = "env", value_name = "NAME=VALUE")]
    pub env: Vec<String>,

    /// Load variables from the `[variables]` table of a TOML file
    #[arg(long, value_name = "FILE", global = true)]
    pub vars_file: Option<PathBuf>,

    /// Report non-zero exit statuses of commands and scripts as warnings
    #[arg(long, global = true)]
    pub ignore_exit_codes: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Realize every dependency of a breadcrumb
    Install(TargetArgs),
    /// Show what `install` would do without touching anything
    Debug(TargetArgs),
    /// Look for library version and file overwrite conflicts
    Check(TargetArgs),
    /// Print the dependency tree
    List(ListArgs),
    /// Print version information
    Version,
}

impl Command {
    /// `-e` definitions given after the subcommand name.
    #[must_use]
    pub fn definitions(&self) -> &[String] {
        match self {
            Self::Install(args) | Self::Debug(args) | Self::Check(args) => &args.definitions.env,
            Self::List(args) => &args.definitions.env,
            Self::Version => &[],
        }
    }
}

/// `-e/--env` as accepted after a subcommand name.
#[derive(Args, Debug, Clone, Default)]
pub struct Definitions {
    /// Define a variable for `$(NAME)` placeholders (repeatable)
    #[arg(short = 'e', long = "env", value_name = "NAME=VALUE")]
    pub env: Vec<String>,
}

/// Positional arguments of `install`, `debug` and `check`.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Root breadcrumb (`.hbc`) file
    pub target: PathBuf,

    /// Output directory; files land in `<OUTPUT>/<PLATFORM>`
    pub output: PathBuf,

    /// Platform token such as `win64d`, `linux64` or `macosx32`
    pub platform: Platform,

    #[allow(missing_docs)]
    #[command(flatten)]
    pub definitions: Definitions,
}

/// Arguments of `list`.
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Root breadcrumb (`.hbc`) file
    pub target: PathBuf,

    /// Platform token such as `win64d`, `linux64` or `macosx32`
    pub platform: Platform,

    /// Output format
    #[arg(long, value_enum, default_value_t = ListFormat::Text)]
    pub format: ListFormat,

    #[allow(missing_docs)]
    #[command(flatten)]
    pub definitions: Definitions,
}

/// How `list` prints the tree.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListFormat {
    /// Indented tree
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::platform::{Architecture, Configuration, Os};
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_install() {
        let cli = Cli::parse_from(["hansel", "install", "app.hbc", "out", "win64d"]);
        let Command::Install(args) = cli.command else {
            panic!("expected install");
        };
        assert_eq!(args.target, PathBuf::from("app.hbc"));
        assert_eq!(args.output, PathBuf::from("out"));
        assert_eq!(
            args.platform,
            Platform::new(Os::Windows, Architecture::X64, Configuration::Debug)
        );
    }

    #[test]
    fn parse_repeated_env() {
        let cli = Cli::parse_from([
            "hansel", "-e", "SDK=/opt/sdk", "debug", "app.hbc", "out", "linux32", "--env", "MODE=fast",
        ]);
        assert_eq!(cli.global_opts().env, vec!["SDK=/opt/sdk", "MODE=fast"]);
        assert!(matches!(cli.command, Command::Debug(_)));
    }

    #[test]
    fn env_before_subcommand_is_kept() {
        let cli = Cli::parse_from(["hansel", "-e", "A=1", "--env", "B=2", "list", "app.hbc", "win32"]);
        assert_eq!(cli.global_opts().env, vec!["A=1", "B=2"]);

        let cli = Cli::parse_from(["hansel", "check", "app.hbc", "out", "win32", "-e", "C=3"]);
        assert_eq!(cli.global_opts().env, vec!["C=3"]);

        let cli = Cli::parse_from(["hansel", "version"]);
        assert!(cli.global_opts().env.is_empty());
    }

    #[test]
    fn parse_list_defaults_to_text() {
        let cli = Cli::parse_from(["hansel", "list", "app.hbc", "macosx64"]);
        let Command::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.format, ListFormat::Text);

        let cli = Cli::parse_from(["hansel", "list", "app.hbc", "macosx64", "--format", "json"]);
        assert!(matches!(cli.command, Command::List(ListArgs { format: ListFormat::Json, .. })));
    }

    #[test]
    fn invalid_platform_is_rejected() {
        assert!(Cli::try_parse_from(["hansel", "check", "app.hbc", "out", "amiga"]).is_err());
    }

    #[test]
    fn parse_flags() {
        let cli = Cli::parse_from([
            "hansel",
            "-v",
            "--ignore-exit-codes",
            "--vars-file",
            "vars.toml",
            "check",
            "app.hbc",
            "out",
            "win32",
        ]);
        assert!(cli.verbose);
        assert!(cli.global.ignore_exit_codes);
        assert_eq!(cli.global.vars_file, Some(PathBuf::from("vars.toml")));
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["hansel", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }
}
