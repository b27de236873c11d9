//! Orchestration for keeping a parent repository's subrepos in sync.
//!
//! [`config`] reads the subrepo list, [`plan`] decides what to do with each entry,
//! [`runner::BatchRunner`] launches one child per entry and waits for all of them,
//! [`inspect`] answers the read-only `--list` / `--dirty` questions.
pub mod backend;
pub mod config;
pub mod error;
pub mod inspect;
pub mod output;
pub mod plan;
pub mod progress;
pub mod remote;
pub mod runner;
pub mod scratch;
pub mod state;

pub use backend::{DummyBackend, GitBackend, SyncBackend};
pub use error::{ConfigError, CoreError};
pub use runner::{BatchRunner, RunOutcome, RunnerConfig};
pub use scratch::ScratchDir;
pub use state::{LiveCount, RunState};
