use serde::{Deserialize, Serialize};

/// What a single invocation does with the configured items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncMode {
    /// Clone missing items and pull existing ones.
    #[default]
    Sync,
    /// Run the orchestration with randomized sleeps instead of git.
    Test,
    /// Print a clean/dirty status line per item.
    List,
    /// Print the change summary of every dirty item.
    Dirty,
}

impl SyncMode {
    /// Returns `true` if the mode launches background units and needs a scratch directory.
    pub fn launches_units(&self) -> bool {
        matches!(self, SyncMode::Sync | SyncMode::Test)
    }
}
