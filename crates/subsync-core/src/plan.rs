use std::path::{Path, PathBuf};

use subsync_model::{SyncAction, WorkItem};

use crate::remote::RemoteBase;

/// What currently occupies an item's path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Directory,
    File,
    Absent,
}

impl Placement {
    pub fn of(path: &Path) -> Self {
        // Follows symlinks: a link to a checkout counts as the checkout.
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_dir() => Placement::Directory,
            Ok(_) => Placement::File,
            Err(_) => Placement::Absent,
        }
    }
}

#[inline]
pub fn item_path(root: &Path, item: &WorkItem) -> PathBuf {
    root.join(item.name())
}

/// Returns `true` if any item would need a clone (and therefore a remote base).
pub fn needs_clone(root: &Path, items: &[WorkItem]) -> bool {
    items
        .iter()
        .any(|item| Placement::of(&item_path(root, item)) == Placement::Absent)
}

/// Decide the action for one item from the filesystem.
///
/// Without a `base` the clone source falls back to the bare item name; backends that do
/// not clone never look at it.
pub fn plan_item(root: &Path, item: &WorkItem, base: Option<&RemoteBase>) -> SyncAction {
    let dir = item_path(root, item);
    match Placement::of(&dir) {
        Placement::File => SyncAction::Skip {
            reason: format!("{} exists and is not a directory", dir.display()),
        },
        Placement::Directory => SyncAction::Update { dir },
        Placement::Absent => SyncAction::Create {
            url: base
                .map(|b| b.url_for(item))
                .unwrap_or_else(|| item.name().to_string()),
            dir,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> WorkItem {
        WorkItem::parse(name).unwrap()
    }

    #[test]
    fn plain_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("qux"), "x").unwrap();

        let action = plan_item(dir.path(), &item("qux"), None);
        match action {
            SyncAction::Skip { reason } => assert!(reason.contains("qux")),
            other => panic!("expected skip, got {other:?}"),
        }
    }

    #[test]
    fn existing_directory_is_updated() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("lib")).unwrap();

        let action = plan_item(dir.path(), &item("lib"), None);
        assert_eq!(
            action,
            SyncAction::Update {
                dir: dir.path().join("lib")
            }
        );
    }

    #[test]
    fn absent_path_is_cloned_from_base() {
        let dir = tempfile::tempdir().unwrap();
        let base = RemoteBase::from_url("git@host:acme/parent.git").unwrap();

        let action = plan_item(dir.path(), &item("tools"), Some(&base));
        assert_eq!(
            action,
            SyncAction::Create {
                url: "git@host:acme/tools".into(),
                dir: dir.path().join("tools"),
            }
        );
    }

    #[test]
    fn needs_clone_only_for_absent_items() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        std::fs::write(dir.path().join("b"), "").unwrap();

        assert!(!needs_clone(dir.path(), &[item("a"), item("b")]));
        assert!(needs_clone(dir.path(), &[item("a"), item("c")]));
    }
}
