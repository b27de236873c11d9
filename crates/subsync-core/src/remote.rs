//! Clone URLs for missing subrepos, derived from the parent repository's remote.
//!
//! The parent's remote URL minus its last path segment is the base; each subrepo is
//! expected to live next to the parent under its own name:
//!
//! | parent remote | base | item `tools` |
//! |---|---|---|
//! | `git@host:org/parent.git` | `git@host:org/` | `git@host:org/tools` |
//! | `https://host/org/parent` | `https://host/org/` | `https://host/org/tools` |
//! | `git@host:parent.git` | `git@host:` | `git@host:tools` |
use std::path::Path;

use subsync_exec::{ProcSpec, capture};
use subsync_model::WorkItem;
use tracing::debug;

use crate::error::CoreError;

/// Prefix that a subrepo name is appended to, separator included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteBase(String);

impl RemoteBase {
    /// Derive the base from a full remote URL. `None` if the URL has no repository segment.
    pub fn from_url(url: &str) -> Option<Self> {
        let url = url.trim().trim_end_matches('/');
        if url.is_empty() {
            return None;
        }

        // Scheme separator must not be mistaken for a path separator.
        let path_start = url.find("://").map(|i| i + 3).unwrap_or(0);
        let tail = &url[path_start..];

        let cut = match tail.rfind('/') {
            Some(i) => i,
            None if path_start == 0 => tail.find(':')?,
            None => return None,
        };
        let base = &url[..path_start + cut + 1];
        if base.len() == url.len() {
            return None;
        }
        Some(Self(base.to_string()))
    }

    pub fn url_for(&self, item: &WorkItem) -> String {
        format!("{}{}", self.0, item.name())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Ask git for the first configured remote of the repository at `root` and derive its base.
pub async fn discover(root: &Path) -> Result<RemoteBase, CoreError> {
    let remotes = git_query(root, &["remote"]).await?;
    let name = remotes
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| CoreError::Remote(format!("no remote configured in {}", root.display())))?
        .to_string();

    let url = git_query(root, &["remote", "get-url", &name]).await?;
    let base = RemoteBase::from_url(&url)
        .ok_or_else(|| CoreError::Remote(format!("cannot derive a base from remote '{name}' ({})", url.trim())))?;

    debug!(target: "subsync.core.remote", remote = %name, url = %url.trim(), base = base.as_str(), "remote base resolved");
    Ok(base)
}

async fn git_query(root: &Path, args: &[&str]) -> Result<String, CoreError> {
    let spec = ProcSpec::new("git").args(args.iter().copied()).cwd(root);
    let out = capture(&spec).await?;
    if !out.success {
        return Err(CoreError::Remote(format!(
            "`{}` failed: {}",
            spec.display(),
            out.stderr.trim()
        )));
    }
    Ok(out.stdout)
}
