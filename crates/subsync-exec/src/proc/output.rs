use tracing::trace;

use crate::{
    error::{ExecError, ExecResult},
    proc::ProcSpec,
};

/// Output of a short-lived command run to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Run `spec` to completion and collect its output. Used for local queries
/// (`git status`, `git remote`) where the answer is the output itself.
pub async fn capture(spec: &ProcSpec) -> ExecResult<CapturedOutput> {
    let mut cmd = spec.command()?;
    trace!(target: "subsync.exec", cmd = %spec.display(), "capture");

    let output = cmd.output().await.map_err(|e| ExecError::Spawn {
        program: spec.program.clone(),
        reason: e.to_string(),
    })?;

    Ok(CapturedOutput {
        code: output.status.code(),
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
