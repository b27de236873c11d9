mod work_item;
pub use work_item::{WorkItem, WorkItemError};

mod sync_mode;
pub use sync_mode::SyncMode;

mod sync_action;
pub use sync_action::SyncAction;

mod item_status;
pub use item_status::ItemStatus;

mod item_report;
pub use item_report::ItemReport;

mod run_summary;
pub use run_summary::RunSummary;

/// Position of an item in the configured list.
///
/// Names may repeat, so the index is what tells two runs of the same item apart.
pub type ItemIndex = usize;
