use std::{
    fmt,
    path::{Component, Path},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkItemError {
    #[error("work item name is empty")]
    Empty,
    #[error("'{0}' is an absolute path; items live inside the parent repository")]
    Absolute(String),
    #[error("'{0}' leaves the parent repository through '..'")]
    ParentComponent(String),
}

/// One configured subrepository, named by its directory relative to the parent repository.
///
/// The name is stored already normalized: surrounding whitespace is dropped together with
/// at most one leading and one trailing `/`. What remains must be a relative path that
/// stays inside the parent repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkItem(String);

impl WorkItem {
    /// Normalize a raw config line into a work item.
    pub fn parse(raw: &str) -> Result<Self, WorkItemError> {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);

        if trimmed.is_empty() {
            return Err(WorkItemError::Empty);
        }
        for component in Path::new(trimmed).components() {
            match component {
                Component::RootDir | Component::Prefix(_) => {
                    return Err(WorkItemError::Absolute(trimmed.to_string()));
                }
                Component::ParentDir => {
                    return Err(WorkItemError::ParentComponent(trimmed.to_string()));
                }
                Component::CurDir | Component::Normal(_) => {}
            }
        }
        Ok(Self(trimmed.to_string()))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// File-name safe form of the item name, used for log file names.
    pub fn file_stem(&self) -> String {
        self.0
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' => '_',
                c if c.is_whitespace() => '_',
                c => c,
            })
            .collect()
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for WorkItem {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_one_slash_each_side() {
        assert_eq!(WorkItem::parse("foo/").unwrap().name(), "foo");
        assert_eq!(WorkItem::parse("/bar").unwrap().name(), "bar");
        assert_eq!(WorkItem::parse("/baz/").unwrap().name(), "baz");
    }

    #[test]
    fn rejects_paths_outside_the_parent() {
        assert_eq!(
            WorkItem::parse("//abs//"),
            Err(WorkItemError::Absolute("/abs/".into()))
        );
        assert_eq!(
            WorkItem::parse("../x"),
            Err(WorkItemError::ParentComponent("../x".into()))
        );
        assert_eq!(
            WorkItem::parse("vendor/../../x/"),
            Err(WorkItemError::ParentComponent("vendor/../../x".into()))
        );
        assert!(WorkItem::parse("a..b").is_ok());
    }

    #[test]
    fn keeps_inner_slashes() {
        let item = WorkItem::parse("vendor/lib/").unwrap();
        assert_eq!(item.name(), "vendor/lib");
        assert_eq!(item.file_stem(), "vendor_lib");
    }

    #[test]
    fn rejects_empty_names() {
        assert_eq!(WorkItem::parse(""), Err(WorkItemError::Empty));
        assert_eq!(WorkItem::parse("   "), Err(WorkItemError::Empty));
        assert_eq!(WorkItem::parse("/"), Err(WorkItemError::Empty));
        assert_eq!(WorkItem::parse("//"), Err(WorkItemError::Empty));
    }

    #[test]
    fn serializes_as_plain_string() {
        let item = WorkItem::parse("foo").unwrap();
        assert_eq!(serde_json::to_string(&item).unwrap(), r#""foo""#);
    }
}
