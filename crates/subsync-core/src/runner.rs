//! Batch runner: one child process per work item, all launched up front, joined by
//! exit notification.
//!
//! ## Lifecycle
//! 1. Plan every item against the filesystem (skip / update / create). The remote base is
//!    resolved only if the backend clones and some item is missing.
//! 2. Spawn one task per non-skipped item. Each task optionally waits for a concurrency
//!    permit, spawns its child with output redirected to the item's log file, and races
//!    the child's exit against the run's [`CancellationToken`].
//! 3. Join the tasks. A ticker reports the live count every `tick` until it reaches zero.
//! 4. Cleanup (scratch directory removal) is one-shot; see [`ScratchDir::cleanup`].
//!
//! Per-item failures end up in the item's report and never stop the other items.
use std::{num::NonZeroUsize, path::Path, sync::Arc, time::Duration};

use subsync_exec::{DEFAULT_KILL_GRACE, ProcOutcome, run_logged};
use subsync_model::{ItemIndex, ItemReport, ItemStatus, RunSummary, SyncAction, WorkItem};
use tokio::{sync::Semaphore, task::JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    backend::SyncBackend,
    error::CoreError,
    plan::{needs_clone, plan_item},
    progress::Progress,
    remote,
    scratch::ScratchDir,
    state::{LiveCount, RunState},
};

/// Interval between live-count reports.
pub const DEFAULT_TICK: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Maximum number of children alive at once; `None` launches everything immediately.
    pub jobs: Option<NonZeroUsize>,
    pub tick: Duration,
    /// Time a child gets between SIGTERM and SIGKILL on cancellation.
    pub kill_grace: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            jobs: None,
            tick: DEFAULT_TICK,
            kill_grace: DEFAULT_KILL_GRACE,
        }
    }
}

/// Result of [`BatchRunner::run`].
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub summary: RunSummary,
    /// The cancellation token fired before every item finished.
    pub interrupted: bool,
}

pub struct BatchRunner {
    cfg: RunnerConfig,
    backend: Arc<dyn SyncBackend>,
    scratch: Arc<ScratchDir>,
    progress: Arc<dyn Progress>,
    state: RunState,
    cancel: CancellationToken,
}

impl BatchRunner {
    pub fn new(
        cfg: RunnerConfig,
        backend: Arc<dyn SyncBackend>,
        scratch: Arc<ScratchDir>,
        progress: Arc<dyn Progress>,
    ) -> Self {
        Self {
            cfg,
            backend,
            scratch,
            progress,
            state: RunState::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Share an externally owned token (e.g. one fired by a signal handler).
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn scratch(&self) -> &ScratchDir {
        &self.scratch
    }

    /// Remove the scratch directory. Safe to call any number of times.
    pub fn cleanup(&self) -> bool {
        self.scratch.cleanup()
    }

    /// Plan, launch and join all items under `root`.
    #[instrument(level = "debug", skip(self, items), fields(backend = self.backend.name(), items = items.len()))]
    pub async fn run(&self, root: &Path, items: &[WorkItem]) -> Result<RunOutcome, CoreError> {
        let base = if self.backend.needs_remote() && needs_clone(root, items) {
            Some(remote::discover(root).await?)
        } else {
            None
        };

        let mut tasks = JoinSet::new();
        let permits = self.cfg.jobs.map(|n| Arc::new(Semaphore::new(n.get())));
        let mut launched = 0usize;

        for (index, item) in items.iter().enumerate() {
            let action = plan_item(root, item, base.as_ref());
            let mut report = ItemReport::new(index, item.clone(), self.backend.action_label(&action));

            if let SyncAction::Skip { reason } = &action {
                warn!(target: "subsync.core.runner", item = %item, %reason, "skipping item");
                self.progress.skipped(item, reason);
                report.status = ItemStatus::Skipped;
                report.error = Some(reason.clone());
                self.state.register(report);
                continue;
            }

            let log_path = self.scratch.log_path(index, item);
            report.log_path = Some(log_path.clone());
            self.state.register(report);
            self.progress.launched(item, self.backend.action_label(&action));

            let unit = Unit {
                index,
                item: item.clone(),
                action,
                log_path,
                backend: Arc::clone(&self.backend),
                state: self.state.clone(),
                cancel: self.cancel.clone(),
                permits: permits.clone(),
                grace: self.cfg.kill_grace,
            };
            tasks.spawn(unit.run());
            launched += 1;
        }
        info!(target: "subsync.core.runner", launched, total = items.len(), "units launched");

        self.join(&mut tasks, launched).await;

        let interrupted = self.cancel.is_cancelled();
        if interrupted {
            let n = self.state.cancel_pending();
            debug!(target: "subsync.core.runner", canceled = n, "run interrupted");
        }

        Ok(RunOutcome {
            summary: RunSummary::from_reports(self.state.snapshot()),
            interrupted,
        })
    }

    async fn join(&self, tasks: &mut JoinSet<()>, launched: usize) {
        let mut ticker = tokio::time::interval(self.cfg.tick);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut stopping = false;

        loop {
            tokio::select! {
                joined = tasks.join_next() => match joined {
                    Some(Ok(())) => {}
                    Some(Err(e)) => error!(target: "subsync.core.runner", error = %e, "unit task aborted"),
                    None => break,
                },
                _ = self.cancel.cancelled(), if !stopping => {
                    stopping = true;
                    info!(target: "subsync.core.runner", pids = ?self.state.live_pids(), "stopping running children");
                }
                _ = ticker.tick() => {
                    self.progress.live(self.state.live_count(), launched);
                }
            }
        }
        self.progress.live(LiveCount::default(), launched);
    }
}

/// Everything one item's task needs, moved into the task.
struct Unit {
    index: ItemIndex,
    item: WorkItem,
    action: SyncAction,
    log_path: std::path::PathBuf,
    backend: Arc<dyn SyncBackend>,
    state: RunState,
    cancel: CancellationToken,
    permits: Option<Arc<Semaphore>>,
    grace: Duration,
}

impl Unit {
    async fn run(self) {
        let _permit = match &self.permits {
            Some(sem) => tokio::select! {
                permit = Arc::clone(sem).acquire_owned() => match permit {
                    Ok(p) => Some(p),
                    Err(_) => return self.finish(ItemStatus::Canceled, None, None),
                },
                _ = self.cancel.cancelled() => {
                    return self.finish(ItemStatus::Canceled, None, None);
                }
            },
            None => None,
        };
        if self.cancel.is_cancelled() {
            return self.finish(ItemStatus::Canceled, None, None);
        }

        let spec = match self.backend.build(&self.action) {
            Ok(spec) => spec,
            Err(e) => return self.finish(ItemStatus::Failed, None, Some(e.to_string())),
        };

        let state = self.state.clone();
        let index = self.index;
        let result = run_logged(&spec, &self.log_path, &self.cancel, self.grace, |pid| {
            state.mark_running(index, pid)
        })
        .await;

        match result {
            Ok(ProcOutcome::Exited { code, success: true }) => {
                debug!(target: "subsync.core.runner", item = %self.item, "unit succeeded");
                self.finish(ItemStatus::Succeeded, code, None)
            }
            Ok(ProcOutcome::Exited { code, success: false }) => {
                debug!(target: "subsync.core.runner", item = %self.item, ?code, "unit failed");
                self.finish(ItemStatus::Failed, code, None)
            }
            Ok(ProcOutcome::Canceled) => self.finish(ItemStatus::Canceled, None, None),
            Err(e) => {
                warn!(target: "subsync.core.runner", item = %self.item, error = %e, "unit could not run");
                self.finish(ItemStatus::Failed, None, Some(e.to_string()))
            }
        }
    }

    fn finish(&self, status: ItemStatus, code: Option<i32>, error: Option<String>) {
        self.state.finish(self.index, status, code, error);
    }
}
