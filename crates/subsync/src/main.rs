//! `subsync` keeps the subrepositories of a parent repository in sync.
//!
//! The subrepositories are listed in the parent's `.gitignore` between a
//! `START-SUBREPOS` and an `END-SUBREPOS` marker line. Existing checkouts are
//! pulled, missing ones are cloned from the parent's remote, all at once, each
//! child writing to its own log file.
use std::process::ExitCode;

use subsync_core::{ConfigError, CoreError};
use subsync_observe::{LoggerConfig, logger_init};

mod app;
mod cli;
mod exit;
mod signal;

use cli::Parsed;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match cli::parse(std::env::args_os()) {
        Parsed::Run(cli) => cli,
        Parsed::Help(text) => {
            print!("{text}");
            return exit::code(exit::SUCCESS);
        }
        Parsed::Usage(text) => {
            eprint!("{text}");
            return exit::code(exit::USAGE);
        }
    };

    if cli.version {
        print!("{}", cli::version_text());
        return exit::code(exit::SUCCESS);
    }

    let log_cfg = LoggerConfig {
        format: cli.log_format,
        ..LoggerConfig::for_verbosity(cli.verbose)
    }
    .with_env_override();
    if let Err(e) = logger_init(&log_cfg) {
        eprintln!("error: {e}");
        eprintln!("try 'subsync --help' for more information");
        return exit::code(exit::USAGE);
    }

    match app::run(&cli).await {
        Ok(status) => exit::code(status),
        Err(e) => {
            eprintln!("error: {e:#}");
            if is_configuration(&e) {
                eprintln!("try 'subsync --help' for more information");
                exit::code(exit::USAGE)
            } else {
                exit::code(exit::FAILURE)
            }
        }
    }
}

fn is_configuration(e: &anyhow::Error) -> bool {
    e.downcast_ref::<ConfigError>().is_some()
        || e.downcast_ref::<CoreError>()
            .is_some_and(CoreError::is_configuration)
}
