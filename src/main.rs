//! `hansel` command-line entry point.
use std::process::ExitCode;

use clap::Parser;

use hansel_cli::cli::{Cli, Command};
use hansel_cli::commands;
use hansel_cli::config::Mode;
use hansel_cli::logging::{self, Logger};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    logging::init_subscriber(args.verbose);
    let log = Logger::new(args.verbose);

    let global = args.global_opts();
    let result = match &args.command {
        Command::Install(opts) => commands::install::run(&global, opts, Mode::Install, args.verbose, &log),
        Command::Debug(opts) => commands::install::run(&global, opts, Mode::Debug, args.verbose, &log),
        Command::Check(opts) => commands::check::run(&global, opts, args.verbose, &log),
        Command::List(opts) => commands::list::run(&global, opts, args.verbose, &log),
        Command::Version => commands::version::run(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log.critical(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
