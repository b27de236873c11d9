//! Subrepo list embedded in the parent repository's ignore file.
//!
//! ```text
//! # START-SUBREPOS
//! /tools/
//! docs
//! # END-SUBREPOS
//! ```
use std::path::{Path, PathBuf};

use subsync_model::{WorkItem, WorkItemError};
use tracing::debug;

use crate::error::ConfigError;

pub const START_MARKER: &str = "START-SUBREPOS";
pub const END_MARKER: &str = "END-SUBREPOS";

/// File read when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = ".gitignore";

/// Parsed subrepo list plus the directory the item paths are relative to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubrepoConfig {
    pub root: PathBuf,
    pub items: Vec<WorkItem>,
}

impl SubrepoConfig {
    /// Read and parse `path`. Items resolve against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let items = parse_subrepos(&text)?;

        let root = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        debug!(config = %path.display(), root = %root.display(), items = items.len(), "subrepo list loaded");
        Ok(Self { root, items })
    }
}

/// Items strictly between the start and end marker lines, in file order.
///
/// Blank lines are ignored; duplicates are kept. An entry pointing outside the parent
/// repository is an error.
pub fn parse_subrepos(text: &str) -> Result<Vec<WorkItem>, ConfigError> {
    let mut lines = text.lines().enumerate();

    lines
        .by_ref()
        .find(|(_, l)| l.contains(START_MARKER))
        .ok_or(ConfigError::MissingStartMarker {
            marker: START_MARKER,
        })?;

    let mut items = Vec::new();
    for (n, line) in lines {
        if line.contains(END_MARKER) {
            return Ok(items);
        }
        match WorkItem::parse(line) {
            Ok(item) => items.push(item),
            Err(WorkItemError::Empty) => {}
            Err(e) => {
                return Err(ConfigError::InvalidItem {
                    line: n + 1,
                    reason: e.to_string(),
                });
            }
        }
    }

    Err(ConfigError::MissingEndMarker { marker: END_MARKER })
}
