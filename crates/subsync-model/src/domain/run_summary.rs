use serde::{Deserialize, Serialize};

use crate::{ItemReport, ItemStatus};

/// Outcome of a whole run, in configured order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub canceled: usize,
    pub skipped: usize,
    pub items: Vec<ItemReport>,
}

impl RunSummary {
    /// Build a summary from per-item reports, sorted by configured position.
    pub fn from_reports(mut items: Vec<ItemReport>) -> Self {
        items.sort_by_key(|r| r.index);

        let count = |status: ItemStatus| items.iter().filter(|r| r.status == status).count();
        Self {
            succeeded: count(ItemStatus::Succeeded),
            failed: count(ItemStatus::Failed),
            canceled: count(ItemStatus::Canceled),
            skipped: count(ItemStatus::Skipped),
            items,
        }
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if at least one item failed.
    #[inline]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemReport> {
        self.items.iter().filter(|r| r.status == ItemStatus::Failed)
    }
}
