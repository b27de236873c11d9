//! Child process plumbing: spawn a command with its output sent to a log file,
//! race it against cancellation, and reap it either way.
mod error;
pub use error::{ExecError, ExecResult};

mod util;
pub use util::{DEFAULT_KILL_GRACE, kill_graceful};

pub mod proc;
pub use proc::{CapturedOutput, ProcOutcome, ProcSpec, capture, run_logged};

