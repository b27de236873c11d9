use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Action planned for one work item after looking at the local filesystem.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "action")]
pub enum SyncAction {
    /// Nothing can be done for this item.
    Skip {
        /// Human readable explanation, shown in the warning.
        reason: String,
    },
    /// The directory exists; bring it up to date.
    Update {
        /// Checkout directory.
        dir: PathBuf,
    },
    /// Nothing exists at the path yet; clone it.
    Create {
        /// Remote location to clone from.
        url: String,
        /// Destination directory.
        dir: PathBuf,
    },
}

impl SyncAction {
    /// Short label used in logs and reports:
    /// - `"skip"`
    /// - `"update"`
    /// - `"create"`
    pub fn label(&self) -> &'static str {
        match self {
            SyncAction::Skip { .. } => "skip",
            SyncAction::Update { .. } => "update",
            SyncAction::Create { .. } => "create",
        }
    }

    #[inline]
    pub fn is_skip(&self) -> bool {
        matches!(self, SyncAction::Skip { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        let skip = SyncAction::Skip {
            reason: "is a file".into(),
        };
        let update = SyncAction::Update { dir: "a".into() };
        let create = SyncAction::Create {
            url: "git@host:org/a".into(),
            dir: "a".into(),
        };

        assert_eq!(skip.label(), "skip");
        assert_eq!(update.label(), "update");
        assert_eq!(create.label(), "create");
        assert!(skip.is_skip());
        assert!(!create.is_skip());
    }

    #[test]
    fn tagged_serialization() {
        let update = SyncAction::Update { dir: "a".into() };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"action":"update","dir":"a"}"#);
    }
}
