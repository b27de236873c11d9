use std::time::Duration;

use tokio::process::Child;
use tracing::trace;

/// How long a child gets to exit after SIGTERM before it is killed outright.
pub const DEFAULT_KILL_GRACE: Duration = Duration::from_millis(1500);

/// Ask the child to stop, then force it, and reap it in both cases.
///
/// Returns once the process has actually terminated.
pub async fn kill_graceful(child: &mut Child, grace: Duration) -> std::io::Result<()> {
    if terminate(child, grace).await? {
        return Ok(());
    }

    trace!(target: "subsync.exec", "grace elapsed; killing child");
    match child.kill().await {
        Ok(()) => Ok(()),
        // Already reaped.
        Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(()),
        Err(e) => Err(e),
    }
}

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        /// SIGTERM, then wait up to `grace`. `true` when the child exited in time.
        async fn terminate(child: &mut Child, grace: Duration) -> std::io::Result<bool> {
            let Some(pid) = child.id().and_then(|id| libc::pid_t::try_from(id).ok()) else {
                return Ok(false);
            };

            // SAFETY: plain syscall on a pid we own and have not reaped yet.
            let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
            trace!(target: "subsync.exec", pid, rc, "sent SIGTERM");

            match tokio::time::timeout(grace, child.wait()).await {
                Ok(status) => status.map(|_| true),
                Err(_) => Ok(false),
            }
        }
    } else {
        async fn terminate(_child: &mut Child, _grace: Duration) -> std::io::Result<bool> {
            Ok(false)
        }
    }
}
