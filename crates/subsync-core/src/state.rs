use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use subsync_model::{ItemIndex, ItemReport, ItemStatus};

/// In-memory state of one run: a report per item and the pids of live children.
///
/// Owned by the runner and shared with its item tasks; nothing here is global.
#[derive(Clone, Default)]
pub struct RunState {
    inner: Arc<Mutex<RunStateInner>>,
}

/// Unfinished items: `running` have a child, `queued` are still waiting to start one.
///
/// Items only ever move from queued to running to finished, so `unfinished()` never grows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiveCount {
    pub running: usize,
    pub queued: usize,
}

impl LiveCount {
    #[inline]
    pub fn unfinished(&self) -> usize {
        self.running + self.queued
    }
}

#[derive(Default)]
struct RunStateInner {
    /// Reports indexed by item position.
    reports: HashMap<ItemIndex, ItemReport>,
    /// Index: item position -> pid of its running child.
    live_pids: HashMap<ItemIndex, u32>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RunStateInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an item (called once per configured entry, before anything is launched).
    pub fn register(&self, report: ItemReport) {
        self.lock().reports.insert(report.index, report);
    }

    /// Record that the item's child has been spawned.
    pub fn mark_running(&self, index: ItemIndex, pid: Option<u32>) {
        let mut inner = self.lock();
        if let Some(r) = inner.reports.get_mut(&index) {
            if r.status.is_terminal() {
                return;
            }
            r.status = ItemStatus::Running;
        }
        if let Some(pid) = pid {
            inner.live_pids.insert(index, pid);
        }
    }

    /// Move an item to a terminal state and forget its pid.
    ///
    /// Terminal states are final; a second call for the same item is ignored.
    pub fn finish(
        &self,
        index: ItemIndex,
        status: ItemStatus,
        exit_code: Option<i32>,
        error: Option<String>,
    ) {
        debug_assert!(status.is_terminal());
        let mut inner = self.lock();
        inner.live_pids.remove(&index);

        if let Some(r) = inner.reports.get_mut(&index)
            && !r.status.is_terminal()
        {
            r.status = status;
            r.exit_code = exit_code;
            if error.is_some() {
                r.error = error;
            }
        }
    }

    /// Items that have not reached a terminal state yet.
    pub fn live_count(&self) -> LiveCount {
        let inner = self.lock();
        let mut count = LiveCount::default();
        for r in inner.reports.values() {
            match r.status {
                ItemStatus::Running => count.running += 1,
                ItemStatus::Pending => count.queued += 1,
                _ => {}
            }
        }
        count
    }

    /// Pids of children that have been spawned and not yet reaped.
    pub fn live_pids(&self) -> Vec<u32> {
        self.lock().live_pids.values().copied().collect()
    }

    /// Mark every item that never got to run as canceled.
    pub fn cancel_pending(&self) -> usize {
        let mut inner = self.lock();
        let mut n = 0;
        for r in inner.reports.values_mut() {
            if r.status == ItemStatus::Pending {
                r.status = ItemStatus::Canceled;
                n += 1;
            }
        }
        n
    }

    /// All reports in configured order.
    pub fn snapshot(&self) -> Vec<ItemReport> {
        let mut all: Vec<_> = self.lock().reports.values().cloned().collect();
        all.sort_by_key(|r| r.index);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subsync_model::WorkItem;

    fn register(state: &RunState, index: usize, name: &str) {
        state.register(ItemReport::new(index, WorkItem::parse(name).unwrap(), "update"));
    }

    fn report(state: &RunState, index: usize) -> ItemReport {
        state
            .snapshot()
            .into_iter()
            .find(|r| r.index == index)
            .unwrap()
    }

    #[test]
    fn registered_items_are_queued() {
        let state = RunState::new();
        register(&state, 0, "a");
        register(&state, 1, "b");

        assert_eq!(
            state.live_count(),
            LiveCount {
                running: 0,
                queued: 2
            }
        );
        assert!(state.live_pids().is_empty());
    }

    #[test]
    fn running_then_finished() {
        let state = RunState::new();
        register(&state, 0, "a");

        state.mark_running(0, Some(4242));
        assert_eq!(report(&state, 0).status, ItemStatus::Running);
        assert_eq!(state.live_pids(), vec![4242]);
        assert_eq!(
            state.live_count(),
            LiveCount {
                running: 1,
                queued: 0
            }
        );

        state.finish(0, ItemStatus::Succeeded, Some(0), None);
        let r = report(&state, 0);
        assert_eq!(r.status, ItemStatus::Succeeded);
        assert_eq!(r.exit_code, Some(0));
        assert!(state.live_pids().is_empty());
        assert_eq!(state.live_count().unfinished(), 0);
    }

    #[test]
    fn terminal_state_is_final() {
        let state = RunState::new();
        register(&state, 0, "a");

        state.finish(0, ItemStatus::Failed, Some(1), Some("exit code 1".into()));
        state.finish(0, ItemStatus::Canceled, None, None);
        state.mark_running(0, Some(1));

        let r = report(&state, 0);
        assert_eq!(r.status, ItemStatus::Failed);
        assert_eq!(r.error.as_deref(), Some("exit code 1"));
    }

    #[test]
    fn duplicates_are_tracked_separately() {
        let state = RunState::new();
        register(&state, 0, "a");
        register(&state, 1, "a");

        state.finish(0, ItemStatus::Succeeded, Some(0), None);
        assert_eq!(state.live_count().unfinished(), 1);
        assert_eq!(state.snapshot().len(), 2);
    }

    #[test]
    fn cancel_pending_leaves_running_alone() {
        let state = RunState::new();
        register(&state, 0, "a");
        register(&state, 1, "b");
        state.mark_running(0, Some(7));

        assert_eq!(state.cancel_pending(), 1);
        assert_eq!(report(&state, 0).status, ItemStatus::Running);
        assert_eq!(report(&state, 1).status, ItemStatus::Canceled);
    }

    #[test]
    fn snapshot_is_ordered() {
        let state = RunState::new();
        for (i, n) in ["c", "a", "b"].iter().enumerate().rev() {
            register(&state, i, n);
        }
        let order: Vec<_> = state.snapshot().into_iter().map(|r| r.index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }
}
