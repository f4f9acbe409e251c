//! In-memory stand-in for the host's helpers and executor. Paths are flat
//! keys; the trash hands out a new slot path on every recycle.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::{
    DeleteConfirmationPolicy, FileSystemStatusCode, FilesystemHelpers, FilesystemOperations,
    HistoryEntry, ItemKind, ItemRef, NameCollisionOption, OperationKind, ReturnResult,
    StatusReporter,
};
use crate::tasks::CancelToken;

#[derive(Default)]
struct FakeState {
    items: BTreeMap<PathBuf, ItemKind>,
    trash: BTreeMap<PathBuf, PathBuf>,
    next_slot: u64,
    recycle_limit: Option<usize>,
    confirmations: Vec<(DeleteConfirmationPolicy, bool)>,
}

impl FakeState {
    fn recycle(&mut self, item: &ItemRef) -> Option<ItemRef> {
        let kind = self.items.remove(&item.path)?;
        self.next_slot += 1;
        let name = item
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "item".into());
        let slot = PathBuf::from(format!("/$trash/{}", self.next_slot)).join(name);
        self.trash.insert(slot.clone(), item.path.clone());
        Some(ItemRef::new(slot, kind))
    }
}

#[derive(Clone, Default)]
pub(super) struct FakeFs {
    state: Arc<Mutex<FakeState>>,
    delay: Option<Duration>,
}

impl FakeFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake fs lock")
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    /// Waits out the delay and reports whether the caller cancelled meanwhile.
    async fn interrupted(&self, cancel: &CancelToken) -> bool {
        self.pause().await;
        cancel.is_cancelled()
    }

    pub fn add_file(&self, path: &str) -> ItemRef {
        self.add(ItemRef::file(path))
    }

    pub fn add_folder(&self, path: &str) -> ItemRef {
        self.add(ItemRef::folder(path))
    }

    fn add(&self, item: ItemRef) -> ItemRef {
        self.state().items.insert(item.path.clone(), item.kind);
        item
    }

    pub fn remove(&self, path: &str) {
        self.state().items.remove(Path::new(path));
    }

    pub fn exists(&self, path: &str) -> bool {
        self.state().items.contains_key(Path::new(path))
    }

    pub fn kind(&self, path: &str) -> Option<ItemKind> {
        self.state().items.get(Path::new(path)).copied()
    }

    pub fn listing(&self) -> Vec<PathBuf> {
        self.state().items.keys().cloned().collect()
    }

    pub fn in_trash(&self, slot: &Path) -> bool {
        self.state().trash.contains_key(slot)
    }

    pub fn purge_trash(&self) {
        self.state().trash.clear();
    }

    pub fn purge_slot(&self, slot: &Path) {
        self.state().trash.remove(slot);
    }

    /// Executor-side recycles stop with `Cancelled` once `limit` items went
    /// to the trash in a single call.
    pub fn cancel_recycling_after(&self, limit: Option<usize>) {
        self.state().recycle_limit = limit;
    }

    pub fn confirmations(&self) -> Vec<(DeleteConfirmationPolicy, bool)> {
        self.state().confirmations.clone()
    }
}

fn unique_name(state: &FakeState, target: &Path) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = target
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let mut idx = 2u32;
    loop {
        let candidate = target.with_file_name(format!("{stem} ({idx}){ext}"));
        if !state.items.contains_key(&candidate) {
            return candidate;
        }
        idx += 1;
    }
}

impl FilesystemHelpers for FakeFs {
    async fn delete_items(
        &self,
        items: &[ItemRef],
        confirmation: DeleteConfirmationPolicy,
        permanently: bool,
        cancel: &CancelToken,
    ) -> ReturnResult {
        if self.interrupted(cancel).await {
            return ReturnResult::Cancelled;
        }
        let mut state = self.state();
        state.confirmations.push((confirmation, permanently));
        for item in items {
            let gone = if permanently {
                state.items.remove(&item.path).is_some() || state.trash.remove(&item.path).is_some()
            } else {
                state.recycle(item).is_some()
            };
            if !gone {
                return ReturnResult::IntegrityCheckFailed;
            }
        }
        ReturnResult::Success
    }

    async fn copy_items(
        &self,
        sources: &[ItemRef],
        destinations: &[PathBuf],
        cancel: &CancelToken,
    ) -> ReturnResult {
        if self.interrupted(cancel).await {
            return ReturnResult::Cancelled;
        }
        let mut state = self.state();
        for (source, dest) in sources.iter().zip(destinations) {
            let Some(kind) = state.items.get(&source.path).copied() else {
                return ReturnResult::IntegrityCheckFailed;
            };
            if state.items.contains_key(dest) {
                return ReturnResult::IntegrityCheckFailed;
            }
            state.items.insert(dest.clone(), kind);
        }
        ReturnResult::Success
    }

    async fn move_items(
        &self,
        sources: &[ItemRef],
        destinations: &[PathBuf],
        cancel: &CancelToken,
    ) -> ReturnResult {
        if self.interrupted(cancel).await {
            return ReturnResult::Cancelled;
        }
        let mut state = self.state();
        for (source, dest) in sources.iter().zip(destinations) {
            if state.items.contains_key(dest) {
                return ReturnResult::IntegrityCheckFailed;
            }
            let Some(kind) = state.items.remove(&source.path) else {
                return ReturnResult::IntegrityCheckFailed;
            };
            state.items.insert(dest.clone(), kind);
        }
        ReturnResult::Success
    }

    async fn restore_from_trash(
        &self,
        item: &ItemRef,
        destination: &Path,
        cancel: &CancelToken,
    ) -> ReturnResult {
        if self.interrupted(cancel).await {
            return ReturnResult::Cancelled;
        }
        let mut state = self.state();
        if state.trash.remove(&item.path).is_none() {
            return ReturnResult::IntegrityCheckFailed;
        }
        state.items.insert(destination.to_path_buf(), item.kind);
        ReturnResult::Success
    }
}

impl FilesystemOperations for FakeFs {
    async fn create(
        &self,
        item: &ItemRef,
        status: &StatusReporter,
        _cancel: &CancelToken,
    ) -> Option<HistoryEntry> {
        self.pause().await;
        let mut state = self.state();
        if state.items.contains_key(&item.path) {
            status.report(FileSystemStatusCode::AlreadyExists);
            return None;
        }
        state.items.insert(item.path.clone(), item.kind);
        status.report(FileSystemStatusCode::Success);
        Some(HistoryEntry::created(OperationKind::CreateNew, vec![item.clone()]))
    }

    async fn rename(
        &self,
        item: &ItemRef,
        new_name: &str,
        collision: NameCollisionOption,
        status: &StatusReporter,
        _cancel: &CancelToken,
    ) -> Option<HistoryEntry> {
        self.pause().await;
        let mut state = self.state();
        let Some(kind) = state.items.get(&item.path).copied() else {
            status.report(FileSystemStatusCode::NotFound);
            return None;
        };
        let mut target = item.path.with_file_name(new_name);
        if state.items.contains_key(&target) {
            match collision {
                NameCollisionOption::GenerateUniqueName => target = unique_name(&state, &target),
                NameCollisionOption::ReplaceExisting => {}
                NameCollisionOption::FailIfExists => {
                    status.report(FileSystemStatusCode::AlreadyExists);
                    return None;
                }
            }
        }
        state.items.remove(&item.path);
        state.items.insert(target.clone(), kind);
        status.report(FileSystemStatusCode::Success);
        Some(HistoryEntry::new(
            OperationKind::Rename,
            vec![item.clone()],
            vec![ItemRef::new(target, kind)],
        ))
    }

    async fn create_links(
        &self,
        targets: &[ItemRef],
        destinations: &[PathBuf],
        status: &StatusReporter,
        _cancel: &CancelToken,
    ) -> Option<HistoryEntry> {
        self.pause().await;
        let mut state = self.state();
        let mut created_sources = Vec::new();
        let mut created = Vec::new();
        for (target, dest) in targets.iter().zip(destinations) {
            if !state.items.contains_key(&target.path) {
                status.report(FileSystemStatusCode::NotFound);
                continue;
            }
            state.items.insert(dest.clone(), ItemKind::File);
            created_sources.push(target.clone());
            created.push(ItemRef::file(dest.clone()));
            status.report(FileSystemStatusCode::Success);
        }
        Some(HistoryEntry::new(
            OperationKind::CreateLink,
            created_sources,
            created,
        ))
    }

    async fn delete_items(
        &self,
        items: &[ItemRef],
        permanently: bool,
        status: &StatusReporter,
        cancel: &CancelToken,
    ) -> Option<HistoryEntry> {
        self.pause().await;
        if cancel.is_cancelled() {
            status.report(FileSystemStatusCode::Cancelled);
            return None;
        }
        let mut state = self.state();
        let mut originals = Vec::new();
        let mut trashed = Vec::new();
        for item in items {
            if state.recycle_limit == Some(trashed.len()) && !permanently {
                status.report(FileSystemStatusCode::Cancelled);
                break;
            }
            if permanently {
                if state.items.remove(&item.path).is_none() {
                    status.report(FileSystemStatusCode::NotFound);
                }
                continue;
            }
            match state.recycle(item) {
                Some(slot) => {
                    originals.push(item.clone());
                    trashed.push(slot);
                    status.report(FileSystemStatusCode::Success);
                }
                None => status.report(FileSystemStatusCode::NotFound),
            }
        }
        if trashed.is_empty() {
            return None;
        }
        Some(HistoryEntry::new(OperationKind::Recycle, originals, trashed))
    }
}
