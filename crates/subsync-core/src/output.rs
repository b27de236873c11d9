use std::fmt::Write;

use subsync_model::{ItemStatus, RunSummary};

use crate::scratch::tail;

/// Lines of each failed item's log shown in the summary.
pub const FAILURE_TAIL_LINES: usize = 10;

/// Human summary of a finished run. Failed items include the end of their log, so this
/// must be rendered before the scratch directory is cleaned up.
pub fn render_summary(summary: &RunSummary) -> String {
    let mut out = String::new();

    for report in summary.failures() {
        let reason = report
            .error
            .clone()
            .or_else(|| report.exit_code.map(|c| format!("exit code {c}")))
            .unwrap_or_else(|| "terminated by signal".to_string());
        let _ = writeln!(out, "failed: {} ({}, {reason})", report.item, report.action);

        if let Some(log) = &report.log_path {
            for line in tail(log, FAILURE_TAIL_LINES) {
                let _ = writeln!(out, "    {line}");
            }
        }
    }

    let canceled: Vec<_> = summary
        .items
        .iter()
        .filter(|r| r.status == ItemStatus::Canceled)
        .map(|r| r.item.name())
        .collect();
    if !canceled.is_empty() {
        let _ = writeln!(out, "canceled: {}", canceled.join(", "));
    }

    let _ = writeln!(
        out,
        "done: {} ok, {} failed, {} skipped, {} canceled ({} total)",
        summary.succeeded,
        summary.failed,
        summary.skipped,
        summary.canceled,
        summary.total()
    );
    out
}

pub fn render_summary_json(summary: &RunSummary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}
