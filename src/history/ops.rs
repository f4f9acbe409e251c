//! Collaborators the engine delegates to. Neither is implemented here: the
//! host application wires in its shell-backed helpers and executor.

use std::future::Future;
use std::path::{Path, PathBuf};

use super::entry::{HistoryEntry, ItemRef};
use super::status::{DeleteConfirmationPolicy, NameCollisionOption, ReturnResult, StatusReporter};
use crate::tasks::CancelToken;

/// User-facing flows that may show confirmation or conflict dialogs.
pub trait FilesystemHelpers: Send + Sync {
    fn delete_items(
        &self,
        items: &[ItemRef],
        confirmation: DeleteConfirmationPolicy,
        permanently: bool,
        cancel: &CancelToken,
    ) -> impl Future<Output = ReturnResult> + Send;

    fn copy_items(
        &self,
        sources: &[ItemRef],
        destinations: &[PathBuf],
        cancel: &CancelToken,
    ) -> impl Future<Output = ReturnResult> + Send;

    fn move_items(
        &self,
        sources: &[ItemRef],
        destinations: &[PathBuf],
        cancel: &CancelToken,
    ) -> impl Future<Output = ReturnResult> + Send;

    fn restore_from_trash(
        &self,
        item: &ItemRef,
        destination: &Path,
        cancel: &CancelToken,
    ) -> impl Future<Output = ReturnResult> + Send;
}

/// Primitive operations. Progress goes to `status`; the returned entry, when
/// present, describes what was actually produced on disk.
pub trait FilesystemOperations: Send + Sync {
    fn create(
        &self,
        item: &ItemRef,
        status: &StatusReporter,
        cancel: &CancelToken,
    ) -> impl Future<Output = Option<HistoryEntry>> + Send;

    fn rename(
        &self,
        item: &ItemRef,
        new_name: &str,
        collision: NameCollisionOption,
        status: &StatusReporter,
        cancel: &CancelToken,
    ) -> impl Future<Output = Option<HistoryEntry>> + Send;

    fn create_links(
        &self,
        targets: &[ItemRef],
        destinations: &[PathBuf],
        status: &StatusReporter,
        cancel: &CancelToken,
    ) -> impl Future<Output = Option<HistoryEntry>> + Send;

    /// With `permanently == false` items go to the trash and the returned
    /// entry is a `Recycle` entry whose destinations are the new trash items.
    fn delete_items(
        &self,
        items: &[ItemRef],
        permanently: bool,
        status: &StatusReporter,
        cancel: &CancelToken,
    ) -> impl Future<Output = Option<HistoryEntry>> + Send;
}
