use std::{ffi::OsString, num::NonZeroUsize, path::PathBuf};

use clap::{ArgAction, Args, Parser, error::ErrorKind};
use subsync_core::config::DEFAULT_CONFIG_FILE;
use subsync_model::SyncMode;
use subsync_observe::LoggerFormat;

const ABOUT: &str = "Clone and update the subrepositories listed in .gitignore";

const LONG_ABOUT: &str = "\
Clone and update the subrepositories listed in .gitignore.

The parent repository's .gitignore names its subrepositories between a line
containing START-SUBREPOS and a line containing END-SUBREPOS, one directory
per line. For every entry subsync pulls the existing checkout, or clones it
from the parent's remote (same base URL, entry name as repository name) when
the directory does not exist yet. All entries run concurrently; each child's
output goes to its own log file, and the tail of that log is printed for
every entry that fails.

Without a mode flag the subrepositories are synchronized.";

const AFTER_LONG_HELP: &str = "\
Exit status:
  0    success
  1    at least one subrepository failed to sync
  5    usage or configuration error
  130  interrupted";

#[derive(Debug, Parser)]
#[command(
    name = "subsync",
    about = ABOUT,
    long_about = LONG_ABOUT,
    after_long_help = AFTER_LONG_HELP,
    disable_version_flag = true,
    disable_help_flag = true
)]
pub struct Cli {
    /// Print this help
    #[arg(short, long, action = ArgAction::HelpLong)]
    #[allow(dead_code)]
    help: Option<bool>,

    #[command(flatten)]
    pub mode: ModeArgs,

    /// Print extra diagnostics (scratch directory, planned actions)
    #[arg(short, long)]
    pub verbose: bool,

    /// Print name, version and license
    #[arg(short = 'V', long)]
    pub version: bool,

    /// File holding the subrepository list
    #[arg(short, long, env = "SUBSYNC_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Run at most N subrepository syncs at once (default: all)
    #[arg(short, long, env = "SUBSYNC_JOBS", value_name = "N")]
    pub jobs: Option<NonZeroUsize>,

    /// Machine-readable output for --list and the run summary
    #[arg(long)]
    pub json: bool,

    /// Keep the per-subrepository log directory after the run
    #[arg(long)]
    pub keep_logs: bool,

    /// Diagnostic log format: text or json
    #[arg(long, env = "SUBSYNC_LOG_FORMAT", default_value = "text", value_name = "FORMAT")]
    pub log_format: LoggerFormat,
}

#[derive(Debug, Args, Default)]
#[group(id = "mode", multiple = false)]
pub struct ModeArgs {
    /// Print STATUS<TAB>NAME for every subrepository (STATUS: '-', dirty, missing, error)
    #[arg(short, long)]
    pub list: bool,

    /// Show the uncommitted changes of every dirty subrepository
    #[arg(short, long)]
    pub dirty: bool,

    /// Exercise the runner with random sleeps instead of git
    #[arg(short, long)]
    pub test: bool,
}

impl Cli {
    pub fn sync_mode(&self) -> SyncMode {
        match (self.mode.list, self.mode.dirty, self.mode.test) {
            (true, _, _) => SyncMode::List,
            (_, true, _) => SyncMode::Dirty,
            (_, _, true) => SyncMode::Test,
            _ => SyncMode::Sync,
        }
    }
}

/// Result of reading the command line.
#[derive(Debug)]
pub enum Parsed {
    Run(Box<Cli>),
    /// Help was requested; the rendered text goes to stdout.
    Help(String),
    /// Anything clap rejected; the rendered message goes to stderr.
    Usage(String),
}

pub fn parse<I, T>(args: I) -> Parsed
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    match Cli::try_parse_from(normalize_args(args)) {
        Ok(cli) => Parsed::Run(Box::new(cli)),
        Err(e) if e.kind() == ErrorKind::DisplayHelp => Parsed::Help(e.render().to_string()),
        Err(e) => Parsed::Usage(e.render().to_string()),
    }
}

/// Lower-case long option names (`--LIST`, `--Config=x`) so they match case-insensitively.
/// Short options, values, and everything after a bare `--` are left alone.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut out = Vec::new();
    let mut passthrough = false;

    for (i, arg) in args.into_iter().map(Into::into).enumerate() {
        if i == 0 || passthrough {
            out.push(arg);
            continue;
        }
        match arg.to_str() {
            Some("--") => {
                passthrough = true;
                out.push(arg);
            }
            Some(s) if s.starts_with("--") => {
                let normalized = match s.split_once('=') {
                    Some((name, value)) => format!("{}={value}", name.to_ascii_lowercase()),
                    None => s.to_ascii_lowercase(),
                };
                out.push(normalized.into());
            }
            _ => out.push(arg),
        }
    }
    out
}

pub fn version_text() -> String {
    format!(
        "{name} {version}\nCopyright (c) 2019-2026 the {name} authors\nLicense: {license}\n",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        license = env!("CARGO_PKG_LICENSE"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> Cli {
        let argv = std::iter::once("subsync").chain(args.iter().copied());
        match parse(argv) {
            Parsed::Run(cli) => *cli,
            other => panic!("expected a run, got {other:?}"),
        }
    }

    fn outcome(args: &[&str]) -> Parsed {
        parse(std::iter::once("subsync").chain(args.iter().copied()))
    }

    #[test]
    fn default_mode_is_sync() {
        let cli = run(&[]);
        assert_eq!(cli.sync_mode(), SyncMode::Sync);
        assert_eq!(cli.config, PathBuf::from(".gitignore"));
        assert!(cli.jobs.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn short_and_long_modes() {
        assert_eq!(run(&["-l"]).sync_mode(), SyncMode::List);
        assert_eq!(run(&["--dirty"]).sync_mode(), SyncMode::Dirty);
        assert_eq!(run(&["-t", "-v"]).sync_mode(), SyncMode::Test);
    }

    #[test]
    fn long_flags_ignore_case() {
        assert_eq!(run(&["--LIST"]).sync_mode(), SyncMode::List);
        assert_eq!(run(&["--Test", "--VERBOSE"]).sync_mode(), SyncMode::Test);
        assert!(run(&["--Version"]).version);
        let cli = run(&["--CONFIG=Sub/.GitIgnore"]);
        assert_eq!(cli.config, PathBuf::from("Sub/.GitIgnore"));
    }

    #[test]
    fn short_flags_are_case_sensitive() {
        assert!(run(&["-V"]).version);
        assert!(run(&["-v"]).verbose);
        assert!(!run(&["-v"]).version);
    }

    #[test]
    fn help_is_not_a_usage_error() {
        for flag in ["-h", "--help", "--HELP"] {
            match outcome(&[flag]) {
                Parsed::Help(text) => {
                    assert!(text.contains("START-SUBREPOS"), "{flag}: {text}");
                    assert!(text.contains("Exit status"), "{flag}: {text}");
                }
                other => panic!("{flag}: expected help, got {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_arguments_are_usage_errors() {
        assert!(matches!(outcome(&["--frobnicate"]), Parsed::Usage(_)));
        assert!(matches!(outcome(&["extra"]), Parsed::Usage(_)));
        assert!(matches!(outcome(&["-x"]), Parsed::Usage(_)));
    }

    #[test]
    fn modes_are_exclusive() {
        assert!(matches!(outcome(&["-l", "-d"]), Parsed::Usage(_)));
        assert!(matches!(outcome(&["--list", "--test"]), Parsed::Usage(_)));
    }

    #[test]
    fn jobs_must_be_positive() {
        assert_eq!(run(&["-j", "4"]).jobs, NonZeroUsize::new(4));
        assert!(matches!(outcome(&["--jobs", "0"]), Parsed::Usage(_)));
    }

    #[test]
    fn normalization_stops_at_double_dash() {
        let args = normalize_args(["subsync", "--LIST", "--", "--KEEP"]);
        assert_eq!(args, vec!["subsync", "--list", "--", "--KEEP"]);
    }

    #[test]
    fn version_text_has_license_line() {
        let text = version_text();
        assert!(text.starts_with(&format!("subsync {}", env!("CARGO_PKG_VERSION"))));
        assert!(text.contains("Copyright"));
        assert!(text.ends_with("License: MIT\n"));
    }
}
