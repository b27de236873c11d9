use std::io::Write;

use subsync_model::WorkItem;

use crate::state::LiveCount;

/// Sink for what the runner has to tell the user while it works.
pub trait Progress: Send + Sync {
    /// An item was skipped instead of launched.
    fn skipped(&self, item: &WorkItem, reason: &str);

    /// A unit was launched (or queued behind the concurrency bound).
    fn launched(&self, _item: &WorkItem, _action: &str) {}

    /// Periodic count of unfinished units. Called at least once with an empty count
    /// when the run ends.
    fn live(&self, live: LiveCount, total: usize);
}

/// Writes progress to the terminal: warnings on stderr, counts on stdout.
#[derive(Debug, Default)]
pub struct ConsoleProgress {
    verbose: bool,
}

impl ConsoleProgress {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Progress for ConsoleProgress {
    fn skipped(&self, item: &WorkItem, reason: &str) {
        eprintln!("warning: skipping {item}: {reason}");
    }

    fn launched(&self, item: &WorkItem, action: &str) {
        if self.verbose {
            println!("{action}\t{item}");
        }
    }

    fn live(&self, live: LiveCount, total: usize) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", live_line(live, total));
        let _ = out.flush();
    }
}

/// Units without a child yet (queued behind `--jobs`, or not spawned) are reported apart.
fn live_line(live: LiveCount, total: usize) -> String {
    if live.queued == 0 {
        format!("{} of {total} still running", live.running)
    } else {
        format!(
            "{} of {total} not finished ({} running, {} waiting to start)",
            live.unfinished(),
            live.running,
            live.queued
        )
    }
}
