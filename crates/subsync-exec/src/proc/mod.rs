use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{
    error::{ExecError, ExecResult},
    util::kill_graceful,
};

mod output;
pub use output::{CapturedOutput, capture};

/// A command line to run as one child process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
}

impl ProcSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Shell-like rendering for logs and log file headers.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn command(&self) -> ExecResult<Command> {
        if self.program.trim().is_empty() {
            return Err(ExecError::MissingProgram);
        }

        let mut std_cmd = std::process::Command::new(&self.program);
        std_cmd.args(&self.args);
        if let Some(cwd) = &self.cwd {
            std_cmd.current_dir(cwd);
        }
        for (k, v) in &self.env {
            std_cmd.env(k, v);
        }
        // Keep terminal signals (Ctrl-C goes to the whole foreground group) away from the
        // child; only the cancellation token stops it.
        #[cfg(unix)]
        std::os::unix::process::CommandExt::process_group(&mut std_cmd, 0);

        let mut cmd = Command::from(std_cmd);
        cmd.stdin(Stdio::null());
        // Backstop for a runner task that is dropped mid-await.
        cmd.kill_on_drop(true);
        Ok(cmd)
    }
}

/// How a logged child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcOutcome {
    /// The child exited on its own. `code` is `None` when a signal ended it.
    Exited { code: Option<i32>, success: bool },
    /// Cancellation won the race; the child was terminated and reaped.
    Canceled,
}

/// Run `spec` with stdout and stderr both appended to `log_path`.
///
/// `on_spawn` receives the child pid as soon as the process exists, so the caller can
/// track it while it runs. The future resolves only after the child is reaped.
pub async fn run_logged<F>(
    spec: &ProcSpec,
    log_path: &Path,
    cancel: &CancellationToken,
    grace: Duration,
    on_spawn: F,
) -> ExecResult<ProcOutcome>
where
    F: FnOnce(Option<u32>),
{
    let mut cmd = spec.command()?;

    let log_err = |e: std::io::Error| ExecError::LogFile {
        path: log_path.to_path_buf(),
        reason: e.to_string(),
    };
    let mut out = File::create(log_path).map_err(log_err)?;
    writeln!(out, "$ {}", spec.display()).map_err(log_err)?;
    let err = out.try_clone().map_err(log_err)?;
    cmd.stdout(Stdio::from(out));
    cmd.stderr(Stdio::from(err));

    trace!(target: "subsync.exec", program = %spec.program, args = ?spec.args, log = %log_path.display(), "spawn");
    let mut child = cmd.spawn().map_err(|e| ExecError::Spawn {
        program: spec.program.clone(),
        reason: e.to_string(),
    })?;
    on_spawn(child.id());

    tokio::select! {
        status = child.wait() => {
            let status = status.map_err(|e| ExecError::Wait(e.to_string()))?;
            if status.code().is_none() && cancel.is_cancelled() {
                debug!(target: "subsync.exec", "child ended by a signal while cancelling");
                return Ok(ProcOutcome::Canceled);
            }
            debug!(target: "subsync.exec", code = ?status.code(), "child exited");
            Ok(ProcOutcome::Exited { code: status.code(), success: status.success() })
        }
        _ = cancel.cancelled() => {
            debug!(target: "subsync.exec", "cancelled; stopping child");
            kill_graceful(&mut child, grace).await?;
            Ok(ProcOutcome::Canceled)
        }
    }
}
