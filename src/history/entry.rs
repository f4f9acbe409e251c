use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::error::{HistoryError, HistoryResult};

/// Every mutating filesystem action the history knows how to record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    CreateNew,
    CreateLink,
    Rename,
    Copy,
    Move,
    /// Archive extraction. Has no inverse.
    Extract,
    Recycle,
    Restore,
    /// Permanent deletion. Has no inverse.
    Delete,
}

impl OperationKind {
    pub fn is_reversible(self) -> bool {
        !matches!(self, Self::Extract | Self::Delete)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    File,
    Folder,
    Unknown,
}

/// A path-bearing reference to an item touched by an operation. For trashed
/// items the path is the trash location, which changes on every recycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRef {
    pub path: PathBuf,
    pub kind: ItemKind,
}

impl ItemRef {
    pub fn new(path: impl Into<PathBuf>, kind: ItemKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ItemKind::File)
    }

    pub fn folder(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ItemKind::Folder)
    }

    /// Current path of the item. Fails for empty or blank paths, which is how
    /// an item that could not be located at record time ends up in history.
    pub fn resolve(&self) -> HistoryResult<&Path> {
        let blank = self
            .path
            .to_str()
            .map(|s| s.trim().is_empty())
            .unwrap_or(false);
        if self.path.as_os_str().is_empty() || blank {
            return Err(HistoryError::unresolved_item(&self.path));
        }
        Ok(&self.path)
    }

    pub fn file_name(&self) -> HistoryResult<String> {
        let path = self.resolve()?;
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| HistoryError::missing_file_name(path))
    }
}

/// One recorded user gesture. Entries are values except for [`modify`],
/// which swaps the whole payload once the executed result is known.
///
/// [`modify`]: HistoryEntry::modify
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    kind: OperationKind,
    sources: Vec<ItemRef>,
    destinations: Option<Vec<ItemRef>>,
    recorded_at: DateTime<Local>,
}

impl HistoryEntry {
    pub fn new(kind: OperationKind, sources: Vec<ItemRef>, destinations: Vec<ItemRef>) -> Self {
        debug_assert!(
            sources.is_empty() || destinations.is_empty() || sources.len() == destinations.len(),
            "sources and destinations must pair up"
        );
        Self {
            kind,
            sources,
            destinations: Some(destinations),
            recorded_at: Local::now(),
        }
    }

    /// An entry for items created from nothing; there is no destination side.
    pub fn created(kind: OperationKind, sources: Vec<ItemRef>) -> Self {
        Self {
            kind,
            sources,
            destinations: None,
            recorded_at: Local::now(),
        }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn sources(&self) -> &[ItemRef] {
        &self.sources
    }

    pub fn destinations(&self) -> Option<&[ItemRef]> {
        self.destinations.as_deref()
    }

    /// Destinations, or an empty slice when the entry has none.
    pub fn destinations_or_empty(&self) -> &[ItemRef] {
        self.destinations().unwrap_or(&[])
    }

    pub fn recorded_at(&self) -> DateTime<Local> {
        self.recorded_at
    }

    pub fn modify(
        &mut self,
        kind: OperationKind,
        sources: Vec<ItemRef>,
        destinations: Option<Vec<ItemRef>>,
    ) {
        self.kind = kind;
        self.sources = sources;
        self.destinations = destinations;
    }

    /// Takes over the payload of `other`, keeping this entry's record time.
    pub fn modify_from(&mut self, other: HistoryEntry) {
        self.modify(other.kind, other.sources, other.destinations);
    }

    /// Every source, and every destination when present, must resolve.
    pub(crate) fn resolve_all(&self) -> HistoryResult<()> {
        resolve_items(&self.sources)?;
        if let Some(destinations) = &self.destinations {
            resolve_items(destinations)?;
        }
        Ok(())
    }
}

pub(crate) fn resolve_items(items: &[ItemRef]) -> HistoryResult<()> {
    for item in items {
        item.resolve()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::error::HistoryErrorCode;

    #[test]
    fn blank_path_does_not_resolve() {
        let err = ItemRef::file("   ").resolve().unwrap_err();
        assert_eq!(err.code(), HistoryErrorCode::UnresolvedItem);
        assert!(ItemRef::file("").resolve().is_err());
        assert!(ItemRef::file("/a/b.txt").resolve().is_ok());
    }

    #[test]
    fn file_name_requires_a_final_component() {
        assert_eq!(ItemRef::file("/a/b.txt").file_name().unwrap(), "b.txt");
        let err = ItemRef::folder("/").file_name().unwrap_err();
        assert_eq!(err.code(), HistoryErrorCode::UnresolvedItem);
    }

    #[test]
    fn resolve_all_checks_both_sides() {
        let ok = HistoryEntry::new(
            OperationKind::Move,
            vec![ItemRef::file("/a/f.txt")],
            vec![ItemRef::file("/b/f.txt")],
        );
        assert!(ok.resolve_all().is_ok());

        let bad = HistoryEntry::new(
            OperationKind::Move,
            vec![ItemRef::file("/a/f.txt")],
            vec![ItemRef::file("")],
        );
        assert!(bad.resolve_all().is_err());

        let created = HistoryEntry::created(OperationKind::CreateNew, vec![ItemRef::file("/a/n")]);
        assert!(created.destinations().is_none());
        assert!(created.resolve_all().is_ok());
    }

    #[test]
    fn modify_swaps_payload_and_keeps_record_time() {
        let mut entry = HistoryEntry::new(
            OperationKind::Recycle,
            vec![ItemRef::file("/a/f.txt")],
            vec![ItemRef::file("/trash/1")],
        );
        let recorded = entry.recorded_at();
        entry.modify_from(HistoryEntry::new(
            OperationKind::Recycle,
            vec![ItemRef::file("/a/f.txt")],
            vec![ItemRef::file("/trash/2")],
        ));
        assert_eq!(entry.destinations_or_empty()[0].path, PathBuf::from("/trash/2"));
        assert_eq!(entry.recorded_at(), recorded);
    }

    #[test]
    fn only_extract_and_delete_are_irreversible() {
        assert!(!OperationKind::Extract.is_reversible());
        assert!(!OperationKind::Delete.is_reversible());
        assert!(OperationKind::Recycle.is_reversible());
        assert!(OperationKind::CreateLink.is_reversible());
    }

    #[test]
    fn entry_serializes_camel_case() {
        let entry = HistoryEntry::created(OperationKind::CreateNew, vec![ItemRef::folder("/a/new")]);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["kind"], "createNew");
        assert_eq!(value["sources"][0]["kind"], "folder");
        assert!(value["destinations"].is_null());
        assert!(value.get("recordedAt").is_some());
    }
}
