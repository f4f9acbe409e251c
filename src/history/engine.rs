use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::entry::{HistoryEntry, ItemRef, OperationKind};
use super::error::{HistoryError, HistoryResult};
use super::ops::{FilesystemHelpers, FilesystemOperations};
use super::status::{
    DeleteConfirmationPolicy, Direction, NameCollisionOption, ReturnResult, StatusReporter,
};
use crate::tasks::CancelToken;

/// Change the coordinator must make to the stack after a reversal ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackEdit {
    /// The storage layer minted new identifiers; the current entry must
    /// point at them from now on.
    ReplaceCurrent(HistoryEntry),
    /// The entry can no longer be replayed.
    Remove { adjust_cursor: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reversal {
    pub result: ReturnResult,
    pub edit: Option<StackEdit>,
}

impl Reversal {
    fn done(result: ReturnResult) -> Self {
        Self { result, edit: None }
    }

    fn with_edit(result: ReturnResult, edit: StackEdit) -> Self {
        Self {
            result,
            edit: Some(edit),
        }
    }
}

/// Turns a history entry into its inverse (undo) or its replay (redo).
pub struct ReversalEngine<H, O> {
    helpers: H,
    operations: O,
}

impl<H, O> ReversalEngine<H, O>
where
    H: FilesystemHelpers,
    O: FilesystemOperations,
{
    pub fn new(helpers: H, operations: O) -> Self {
        Self {
            helpers,
            operations,
        }
    }

    pub fn helpers(&self) -> &H {
        &self.helpers
    }

    pub fn operations(&self) -> &O {
        &self.operations
    }

    pub async fn undo(&self, entry: &HistoryEntry, cancel: &CancelToken) -> Reversal {
        self.execute(entry, Direction::Backward, cancel).await
    }

    pub async fn redo(&self, entry: &HistoryEntry, cancel: &CancelToken) -> Reversal {
        self.execute(entry, Direction::Forward, cancel).await
    }

    async fn execute(
        &self,
        entry: &HistoryEntry,
        direction: Direction,
        cancel: &CancelToken,
    ) -> Reversal {
        let kind = entry.kind();
        match kind {
            OperationKind::Extract => {
                // Extraction has no inverse; treated as done.
                warn!(?kind, direction = direction.verb(), "unsupported history operation");
                return Reversal::done(ReturnResult::Success);
            }
            OperationKind::Delete => {
                debug!(direction = direction.verb(), "permanent delete cannot be reversed");
                return Reversal::done(ReturnResult::Success);
            }
            _ => {}
        }
        if cancel.is_cancelled() {
            return Reversal::done(ReturnResult::Cancelled);
        }
        if let Err(err) = entry.resolve_all() {
            return invalid_entry(entry, direction, &err);
        }

        debug!(
            ?kind,
            direction = direction.verb(),
            items = entry.sources().len(),
            "executing history entry"
        );
        let outcome = match direction {
            Direction::Backward => self.undo_resolved(entry, cancel).await,
            Direction::Forward => self.redo_resolved(entry, cancel).await,
        };
        match outcome {
            Ok(reversal) => purge_if_failed(entry, direction, reversal),
            Err(err) => invalid_entry(entry, direction, &err),
        }
    }

    async fn undo_resolved(
        &self,
        entry: &HistoryEntry,
        cancel: &CancelToken,
    ) -> HistoryResult<Reversal> {
        let sources = entry.sources();
        let destinations = entry.destinations_or_empty();
        let reversal = match entry.kind() {
            OperationKind::CreateNew => Reversal::done(self.delete_permanently(sources, cancel).await),
            OperationKind::CreateLink | OperationKind::Copy => {
                Reversal::done(self.delete_permanently(destinations, cancel).await)
            }
            OperationKind::Rename => {
                let names = file_names(sources)?;
                let (result, landed) = self.rename_all(destinations, &names, cancel).await;
                renamed(entry, result, landed, Direction::Backward)
            }
            OperationKind::Move => Reversal::done(
                self.helpers
                    .move_items(destinations, &paths(sources), cancel)
                    .await,
            ),
            OperationKind::Recycle => {
                Reversal::done(self.restore_all(destinations, sources, cancel).await)
            }
            OperationKind::Restore => {
                let status = StatusReporter::new();
                let produced = self
                    .operations
                    .delete_items(destinations, false, &status, cancel)
                    .await;
                rotated(entry, produced, &status, Direction::Backward)
            }
            OperationKind::Extract | OperationKind::Delete => Reversal::done(ReturnResult::Success),
        };
        Ok(reversal)
    }

    async fn redo_resolved(
        &self,
        entry: &HistoryEntry,
        cancel: &CancelToken,
    ) -> HistoryResult<Reversal> {
        let sources = entry.sources();
        let destinations = entry.destinations_or_empty();
        let reversal = match entry.kind() {
            OperationKind::CreateNew => Reversal::done(self.create_all(sources, cancel).await),
            OperationKind::CreateLink => {
                let status = StatusReporter::new();
                let _ = self
                    .operations
                    .create_links(sources, &paths(destinations), &status, cancel)
                    .await;
                Reversal::done(status.finish())
            }
            OperationKind::Rename => {
                let names = file_names(destinations)?;
                let (result, landed) = self.rename_all(sources, &names, cancel).await;
                renamed(entry, result, landed, Direction::Forward)
            }
            OperationKind::Copy => Reversal::done(
                self.helpers
                    .copy_items(sources, &paths(destinations), cancel)
                    .await,
            ),
            OperationKind::Move => Reversal::done(
                self.helpers
                    .move_items(sources, &paths(destinations), cancel)
                    .await,
            ),
            OperationKind::Recycle => {
                let status = StatusReporter::new();
                let produced = self
                    .operations
                    .delete_items(sources, false, &status, cancel)
                    .await;
                rotated(entry, produced, &status, Direction::Forward)
            }
            OperationKind::Restore => {
                Reversal::done(self.restore_all(sources, destinations, cancel).await)
            }
            OperationKind::Extract | OperationKind::Delete => Reversal::done(ReturnResult::Success),
        };
        Ok(reversal)
    }

    // Undo never trusts the user's delete preference: always confirm.
    async fn delete_permanently(&self, items: &[ItemRef], cancel: &CancelToken) -> ReturnResult {
        self.helpers
            .delete_items(items, DeleteConfirmationPolicy::Always, true, cancel)
            .await
    }

    async fn create_all(&self, items: &[ItemRef], cancel: &CancelToken) -> ReturnResult {
        for item in items {
            if cancel.is_cancelled() {
                return ReturnResult::Cancelled;
            }
            let status = StatusReporter::new();
            let _ = self.operations.create(item, &status, cancel).await;
            let result = status.finish();
            if !result.is_success() {
                return result;
            }
        }
        ReturnResult::Success
    }

    /// Renames `items[i]` to `names[i]` and returns where each item actually
    /// landed, which differs from the requested name after a collision.
    async fn rename_all(
        &self,
        items: &[ItemRef],
        names: &[String],
        cancel: &CancelToken,
    ) -> (ReturnResult, Vec<ItemRef>) {
        let mut landed = Vec::with_capacity(items.len());
        for (item, name) in items.iter().zip(names) {
            if cancel.is_cancelled() {
                return (ReturnResult::Cancelled, landed);
            }
            let status = StatusReporter::new();
            let produced = self
                .operations
                .rename(
                    item,
                    name,
                    NameCollisionOption::GenerateUniqueName,
                    &status,
                    cancel,
                )
                .await;
            let result = status.finish();
            if !result.is_success() {
                return (result, landed);
            }
            let target = produced
                .and_then(|renamed| renamed.destinations_or_empty().first().cloned())
                .unwrap_or_else(|| ItemRef::new(item.path.with_file_name(name), item.kind));
            landed.push(target);
        }
        (ReturnResult::Success, landed)
    }

    /// Restores `trashed[i]` to the path of `targets[i]`, stopping at the
    /// first step that does not succeed.
    async fn restore_all(
        &self,
        trashed: &[ItemRef],
        targets: &[ItemRef],
        cancel: &CancelToken,
    ) -> ReturnResult {
        for (item, target) in trashed.iter().zip(targets) {
            if cancel.is_cancelled() {
                return ReturnResult::Cancelled;
            }
            let result = self
                .helpers
                .restore_from_trash(item, &target.path, cancel)
                .await;
            if !result.is_success() {
                return result;
            }
        }
        ReturnResult::Success
    }
}

/// Handles the outcome of sending items back to the trash. The trash hands
/// out fresh identifiers every time, so the entry is rewritten to point at
/// them; nothing produced means the entry is dead.
fn rotated(
    entry: &HistoryEntry,
    produced: Option<HistoryEntry>,
    status: &StatusReporter,
    direction: Direction,
) -> Reversal {
    let mut result = status.finish();
    match produced {
        Some(recycled) => {
            if result == ReturnResult::Cancelled {
                // Whatever reached the trash stays there; the entry follows it.
                debug!(
                    items = recycled.sources().len(),
                    "trash step cancelled after partial progress"
                );
                result = ReturnResult::Success;
            }
            let trashed = recycled.destinations_or_empty().to_vec();
            let originals = recycled.sources().to_vec();
            let replacement = match entry.kind() {
                OperationKind::Restore => {
                    HistoryEntry::new(OperationKind::Restore, trashed, originals)
                }
                _ => HistoryEntry::new(OperationKind::Recycle, originals, trashed),
            };
            info!(
                kind = ?entry.kind(),
                direction = direction.verb(),
                "trash identifiers changed; rewriting history entry"
            );
            Reversal::with_edit(result, StackEdit::ReplaceCurrent(replacement))
        }
        None if result == ReturnResult::Cancelled => Reversal::done(result),
        None => {
            warn!(
                kind = ?entry.kind(),
                direction = direction.verb(),
                "nothing was sent to the trash; dropping history entry"
            );
            Reversal::with_edit(
                ReturnResult::IntegrityCheckFailed,
                StackEdit::Remove {
                    adjust_cursor: direction == Direction::Forward,
                },
            )
        }
    }
}

/// Follows renamed items to the names they actually received. Only the side
/// that was just renamed can change.
fn renamed(
    entry: &HistoryEntry,
    result: ReturnResult,
    landed: Vec<ItemRef>,
    direction: Direction,
) -> Reversal {
    if !result.is_success() {
        return Reversal::done(result);
    }
    let recorded = match direction {
        Direction::Backward => entry.sources(),
        Direction::Forward => entry.destinations_or_empty(),
    };
    let moved = recorded
        .iter()
        .zip(&landed)
        .any(|(expected, actual)| expected.path != actual.path);
    if !moved {
        return Reversal::done(result);
    }
    let replacement = match direction {
        Direction::Backward => HistoryEntry::new(
            OperationKind::Rename,
            landed,
            entry.destinations_or_empty().to_vec(),
        ),
        Direction::Forward => {
            HistoryEntry::new(OperationKind::Rename, entry.sources().to_vec(), landed)
        }
    };
    info!(
        direction = direction.verb(),
        "rename picked a different name; rewriting history entry"
    );
    Reversal::with_edit(result, StackEdit::ReplaceCurrent(replacement))
}

/// A failed step leaves the entry describing items that are not where it
/// says, so it is dropped instead of failing again on the next attempt.
fn purge_if_failed(entry: &HistoryEntry, direction: Direction, reversal: Reversal) -> Reversal {
    if reversal.result != ReturnResult::IntegrityCheckFailed || reversal.edit.is_some() {
        return reversal;
    }
    warn!(
        kind = ?entry.kind(),
        direction = direction.verb(),
        "history step failed; dropping history entry"
    );
    Reversal::with_edit(
        ReturnResult::IntegrityCheckFailed,
        StackEdit::Remove {
            adjust_cursor: direction == Direction::Forward,
        },
    )
}

/// Redo has already moved the cursor onto the entry, so its removal also
/// retreats; undo retreats on its own afterwards.
fn invalid_entry(entry: &HistoryEntry, direction: Direction, err: &HistoryError) -> Reversal {
    warn!(
        kind = ?entry.kind(),
        direction = direction.verb(),
        error = %err,
        "history entry no longer resolves"
    );
    Reversal::with_edit(
        ReturnResult::IntegrityCheckFailed,
        StackEdit::Remove {
            adjust_cursor: direction == Direction::Forward,
        },
    )
}

fn paths(items: &[ItemRef]) -> Vec<PathBuf> {
    items.iter().map(|item| item.path.clone()).collect()
}

fn file_names(items: &[ItemRef]) -> HistoryResult<Vec<String>> {
    items.iter().map(ItemRef::file_name).collect()
}
