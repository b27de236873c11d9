//! Read-only answers for `--list` and `--dirty`. Nothing here touches the network
//! or the scratch directory.
use std::path::Path;

use serde_json::json;
use subsync_exec::{ProcSpec, capture};
use subsync_model::WorkItem;
use tracing::warn;

use crate::plan::{Placement, item_path};

/// Local state of one subrepo checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoStatus {
    Clean,
    /// Uncommitted changes, as `git status --porcelain` lines.
    Dirty(Vec<String>),
    /// Nothing checked out at the path.
    Missing,
    /// The path is not something git can report on.
    Unknown(String),
}

impl RepoStatus {
    /// Status column of the `--list` output.
    pub fn label(&self) -> &'static str {
        match self {
            RepoStatus::Clean => "-",
            RepoStatus::Dirty(_) => "dirty",
            RepoStatus::Missing => "missing",
            RepoStatus::Unknown(_) => "error",
        }
    }

    /// Parse porcelain output: no lines means clean.
    pub fn from_porcelain(stdout: &str) -> Self {
        let changes: Vec<String> = stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect();
        if changes.is_empty() {
            RepoStatus::Clean
        } else {
            RepoStatus::Dirty(changes)
        }
    }
}

pub async fn repo_status(dir: &Path) -> RepoStatus {
    match Placement::of(dir) {
        Placement::Absent => return RepoStatus::Missing,
        Placement::File => return RepoStatus::Unknown("not a directory".to_string()),
        Placement::Directory => {}
    }

    let spec = ProcSpec::new("git")
        .args(["status", "--porcelain"])
        .cwd(dir);
    match capture(&spec).await {
        Ok(out) if out.success => RepoStatus::from_porcelain(&out.stdout),
        Ok(out) => {
            warn!(target: "subsync.core.inspect", dir = %dir.display(), stderr = %out.stderr.trim(), "git status failed");
            RepoStatus::Unknown(out.stderr.trim().to_string())
        }
        Err(e) => {
            warn!(target: "subsync.core.inspect", dir = %dir.display(), error = %e, "git status failed");
            RepoStatus::Unknown(e.to_string())
        }
    }
}

/// Status of every item, in configured order.
pub async fn statuses(root: &Path, items: &[WorkItem]) -> Vec<(WorkItem, RepoStatus)> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let status = repo_status(&item_path(root, item)).await;
        out.push((item.clone(), status));
    }
    out
}

/// `STATUS<TAB>NAME` per item.
pub fn render_list(statuses: &[(WorkItem, RepoStatus)]) -> String {
    statuses
        .iter()
        .map(|(item, status)| format!("{}\t{}\n", status.label(), item))
        .collect()
}

pub fn render_list_json(statuses: &[(WorkItem, RepoStatus)]) -> serde_json::Value {
    statuses
        .iter()
        .map(|(item, status)| {
            let changes = match status {
                RepoStatus::Dirty(lines) => lines.clone(),
                _ => Vec::new(),
            };
            json!({ "name": item.name(), "status": status.label(), "changes": changes })
        })
        .collect()
}

/// A header line and the change summary for each dirty item; clean items are omitted.
pub fn render_dirty(statuses: &[(WorkItem, RepoStatus)]) -> String {
    let mut out = String::new();
    for (item, status) in statuses {
        if let RepoStatus::Dirty(lines) = status {
            out.push_str(&format!("== {item} ==\n"));
            for line in lines {
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> WorkItem {
        WorkItem::parse(name).unwrap()
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = std::process::Command::new("git")
            .args(["-c", "user.name=subsync", "-c", "user.email=subsync@example.invalid"])
            .args(["-c", "init.defaultBranch=main", "-c", "commit.gpgsign=false"])
            .args(args)
            .current_dir(dir)
            .status()
            .unwrap();
        assert!(status.success(), "git {args:?}");
    }

    fn committed_checkout(dir: &Path) {
        std::fs::create_dir_all(dir).unwrap();
        git(dir, &["init", "-q"]);
        std::fs::write(dir.join("README"), "hello\n").unwrap();
        git(dir, &["add", "README"]);
        git(dir, &["commit", "-q", "-m", "init"]);
    }

    #[test]
    fn porcelain_parsing() {
        assert_eq!(RepoStatus::from_porcelain(""), RepoStatus::Clean);
        assert_eq!(RepoStatus::from_porcelain("\n"), RepoStatus::Clean);
        assert_eq!(
            RepoStatus::from_porcelain(" M src/lib.rs\n?? notes.txt\n"),
            RepoStatus::Dirty(vec![" M src/lib.rs".into(), "?? notes.txt".into()])
        );
    }

    #[test]
    fn list_rendering() {
        let rows = vec![
            (item("a"), RepoStatus::Clean),
            (item("b"), RepoStatus::Dirty(vec![" M x".into()])),
            (item("c"), RepoStatus::Missing),
        ];
        assert_eq!(render_list(&rows), "-\ta\ndirty\tb\nmissing\tc\n");
    }

    #[test]
    fn dirty_rendering_skips_clean_items() {
        let rows = vec![
            (item("a"), RepoStatus::Clean),
            (item("b"), RepoStatus::Dirty(vec![" M x".into(), "?? y".into()])),
        ];
        assert_eq!(render_dirty(&rows), "== b ==\n M x\n?? y\n");
    }

    #[test]
    fn json_rendering() {
        let rows = vec![(item("b"), RepoStatus::Dirty(vec!["?? y".into()]))];
        let value = render_list_json(&rows);
        assert_eq!(value[0]["name"], "b");
        assert_eq!(value[0]["status"], "dirty");
        assert_eq!(value[0]["changes"][0], "?? y");
    }

    #[tokio::test]
    async fn missing_directory_needs_no_git() {
        let dir = tempfile::tempdir().unwrap();
        let rows = statuses(dir.path(), &[item("nope")]).await;
        assert_eq!(rows[0].1, RepoStatus::Missing);
    }

    #[tokio::test]
    async fn plain_file_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("qux"), "").unwrap();
        let status = repo_status(&dir.path().join("qux")).await;
        assert_eq!(status.label(), "error");
    }

    #[tokio::test]
    async fn real_checkouts_report_clean_and_dirty() {
        let root = tempfile::tempdir().unwrap();
        committed_checkout(&root.path().join("clean"));
        committed_checkout(&root.path().join("messy"));
        std::fs::write(root.path().join("messy/README"), "changed\n").unwrap();
        std::fs::write(root.path().join("messy/notes.txt"), "").unwrap();

        let rows = statuses(root.path(), &[item("clean"), item("messy"), item("gone")]).await;

        assert_eq!(render_list(&rows), "-\tclean\ndirty\tmessy\nmissing\tgone\n");
        assert_eq!(render_dirty(&rows), "== messy ==\n M README\n?? notes.txt\n");
    }
}
