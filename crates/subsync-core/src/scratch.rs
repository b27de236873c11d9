use std::{
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

use subsync_model::{ItemIndex, WorkItem};
use tracing::{debug, warn};

use crate::error::CoreError;

/// Per-run directory holding one log file per launched item.
///
/// Removal happens at most once, whoever gets there first: the normal end of a run,
/// the interrupt path, or `Drop`.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    keep: bool,
    cleaned: AtomicBool,
}

impl ScratchDir {
    /// Create a fresh `subsync-<uuid>` directory under `parent`.
    pub fn create_in(parent: &Path) -> Result<Self, CoreError> {
        let path = parent.join(format!("subsync-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&path).map_err(|e| CoreError::Scratch {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        debug!(target: "subsync.core.scratch", path = %path.display(), "scratch directory created");

        Ok(Self {
            path,
            keep: false,
            cleaned: AtomicBool::new(false),
        })
    }

    /// Create the directory under the system temp dir.
    pub fn create() -> Result<Self, CoreError> {
        Self::create_in(&std::env::temp_dir())
    }

    /// Leave the directory in place on cleanup.
    pub fn keep(mut self, keep: bool) -> Self {
        self.keep = keep;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Log file for an item. The index keeps duplicate names apart.
    pub fn log_path(&self, index: ItemIndex, item: &WorkItem) -> PathBuf {
        self.path.join(format!("{index:03}-{}.log", item.file_stem()))
    }

    /// Remove the directory. Only the first call does anything; it returns `true`.
    pub fn cleanup(&self) -> bool {
        if self.cleaned.swap(true, Ordering::AcqRel) {
            return false;
        }
        if self.keep {
            debug!(target: "subsync.core.scratch", path = %self.path.display(), "keeping scratch directory");
            return true;
        }

        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => debug!(target: "subsync.core.scratch", path = %self.path.display(), "scratch directory removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(target: "subsync.core.scratch", path = %self.path.display(), error = %e, "cannot remove scratch directory"),
        }
        true
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Last `n` lines of a log file; empty when the file cannot be read.
pub fn tail(path: &Path, n: usize) -> Vec<String> {
    let Ok(file) = std::fs::File::open(path) else {
        return Vec::new();
    };

    let mut lines: Vec<String> = BufReader::new(file).lines().map_while(Result::ok).collect();
    let start = lines.len().saturating_sub(n);
    lines.drain(..start);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_runs_once() {
        let parent = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::create_in(parent.path()).unwrap();
        let path = scratch.path().to_path_buf();
        std::fs::write(path.join("x.log"), "hi").unwrap();

        assert!(path.is_dir());
        assert!(scratch.cleanup());
        assert!(!path.exists());
        assert!(!scratch.cleanup());
        assert!(!path.exists());
    }

    #[test]
    fn drop_removes_directory() {
        let parent = tempfile::tempdir().unwrap();
        let path = {
            let scratch = ScratchDir::create_in(parent.path()).unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn keep_leaves_directory() {
        let parent = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::create_in(parent.path()).unwrap().keep(true);
        let path = scratch.path().to_path_buf();

        assert!(scratch.cleanup());
        drop(scratch);
        assert!(path.is_dir());
    }

    #[test]
    fn cleanup_tolerates_missing_directory() {
        let parent = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::create_in(parent.path()).unwrap();
        std::fs::remove_dir_all(scratch.path()).unwrap();
        assert!(scratch.cleanup());
    }

    #[test]
    fn log_paths_are_distinct_for_duplicates() {
        let parent = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::create_in(parent.path()).unwrap();
        let item = WorkItem::parse("vendor/lib").unwrap();

        let a = scratch.log_path(0, &item);
        let b = scratch.log_path(5, &item);
        assert_ne!(a, b);
        assert_eq!(a.file_name().unwrap(), "000-vendor_lib.log");
    }

    #[test]
    fn tail_returns_last_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log");
        std::fs::write(&path, "1\n2\n3\n4\n").unwrap();

        assert_eq!(tail(&path, 2), vec!["3", "4"]);
        assert_eq!(tail(&path, 10).len(), 4);
        assert!(tail(&dir.path().join("missing"), 3).is_empty());
    }
}
