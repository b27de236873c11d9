use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{ItemIndex, ItemStatus, WorkItem};

/// Final (or current) record for one work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemReport {
    /// Position in the configured list.
    pub index: ItemIndex,
    /// Configured item.
    pub item: WorkItem,
    /// Planned action label (`skip`, `update`, `create`, `sleep`).
    pub action: String,
    /// Execution state.
    pub status: ItemStatus,
    /// Child exit code, when the child exited normally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Where the child output was written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
    /// Skip reason or failure description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemReport {
    pub fn new(index: ItemIndex, item: WorkItem, action: impl Into<String>) -> Self {
        Self {
            index,
            item,
            action: action.into(),
            status: ItemStatus::Pending,
            exit_code: None,
            log_path: None,
            error: None,
        }
    }
}
