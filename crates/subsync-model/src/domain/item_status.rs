use serde::{Deserialize, Serialize};

/// Current execution state of one work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemStatus {
    /// Planned, waiting for a free slot.
    Pending,
    /// Child process is running.
    Running,
    /// Child process exited with status 0.
    Succeeded,
    /// Child process failed to start or exited non-zero.
    Failed,
    /// Run was interrupted before the child finished.
    Canceled,
    /// Nothing was launched for this item.
    Skipped,
}

impl ItemStatus {
    /// Returns `true` if the item is in a terminal state (won't transition further).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ItemStatus::Succeeded | ItemStatus::Failed | ItemStatus::Canceled | ItemStatus::Skipped
        )
    }
}
