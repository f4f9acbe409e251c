use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Semaphore, TryAcquireError};
use tracing::{debug, info, warn};

use super::engine::{ReversalEngine, StackEdit};
use super::entry::HistoryEntry;
use super::error::{HistoryError, HistoryErrorCode};
use super::ops::{FilesystemHelpers, FilesystemOperations};
use super::stack::HistoryStack;
use super::status::ReturnResult;
use crate::config::HistoryConfig;
use crate::tasks::CancelToken;

/// Point-in-time copy of the history for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySnapshot {
    pub entries: Vec<HistoryEntry>,
    pub cursor: Option<usize>,
    pub can_undo: bool,
    pub can_redo: bool,
}

struct Inner<H, O> {
    stack: Mutex<HistoryStack>,
    guard: Semaphore,
    engine: ReversalEngine<H, O>,
}

/// The single entry point for undo and redo. Cheap to clone; every clone
/// shares the same stack and the same one-slot guard, so an application
/// creates exactly one at startup and hands it around.
pub struct HistoryCoordinator<H, O> {
    inner: Arc<Inner<H, O>>,
}

impl<H, O> Clone for HistoryCoordinator<H, O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H, O> HistoryCoordinator<H, O>
where
    H: FilesystemHelpers,
    O: FilesystemOperations,
{
    pub fn new(engine: ReversalEngine<H, O>) -> Self {
        Self::with_config(engine, &HistoryConfig::default())
    }

    pub fn with_config(engine: ReversalEngine<H, O>, config: &HistoryConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                stack: Mutex::new(HistoryStack::with_capacity_limit(config.max_entries)),
                guard: Semaphore::new(1),
                engine,
            }),
        }
    }

    pub fn engine(&self) -> &ReversalEngine<H, O> {
        &self.inner.engine
    }

    /// Records a freshly completed user action. Must not race an in-flight
    /// undo or redo; the owning application serialises the two.
    pub fn record(&self, entry: HistoryEntry) {
        debug!(kind = ?entry.kind(), items = entry.sources().len(), "recording history entry");
        self.lock_stack().push(entry);
    }

    pub fn can_undo(&self) -> bool {
        self.lock_stack().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.lock_stack().can_redo()
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        let stack = self.lock_stack();
        HistorySnapshot {
            entries: stack.entries().to_vec(),
            cursor: stack.cursor(),
            can_undo: stack.can_undo(),
            can_redo: stack.can_redo(),
        }
    }

    pub fn clear(&self) {
        self.lock_stack().clear();
    }

    /// Reverses the current entry. Never waits for the guard: a busy guard
    /// yields `InProgress` immediately.
    pub async fn try_undo(&self, cancel: &CancelToken) -> ReturnResult {
        if !self.can_undo() {
            return ReturnResult::Cancelled;
        }
        let _permit = match self.inner.guard.try_acquire() {
            Ok(permit) => permit,
            Err(TryAcquireError::NoPermits) => {
                debug!("undo requested while another reversal is running");
                return ReturnResult::InProgress;
            }
            Err(TryAcquireError::Closed) => {
                warn!(
                    error = %HistoryError::new(HistoryErrorCode::GuardClosed, "History guard closed"),
                    "undo skipped"
                );
                return ReturnResult::Cancelled;
            }
        };

        let current = self.lock_stack().current().cloned();
        let Some(entry) = current else {
            return ReturnResult::Cancelled;
        };
        let reversal = self.inner.engine.undo(&entry, cancel).await;

        let mut stack = self.lock_stack();
        apply_edit(&mut stack, &entry, reversal.edit);
        if reversal.result != ReturnResult::Cancelled {
            stack.retreat();
        }
        debug!(result = ?reversal.result, cursor = ?stack.cursor(), "undo finished");
        reversal.result
    }

    /// Replays the next entry. Unlike undo this waits for the guard.
    pub async fn try_redo(&self, cancel: &CancelToken) -> ReturnResult {
        if !self.can_redo() {
            return ReturnResult::Cancelled;
        }
        let _permit = match self.inner.guard.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                warn!(
                    error = %HistoryError::new(HistoryErrorCode::GuardClosed, "History guard closed"),
                    "redo skipped"
                );
                return ReturnResult::Cancelled;
            }
        };

        let current = {
            let mut stack = self.lock_stack();
            // The stack may have moved while this call waited for the guard.
            if stack.can_redo() {
                stack.advance();
                stack.current().cloned()
            } else {
                None
            }
        };
        let Some(entry) = current else {
            return ReturnResult::Cancelled;
        };
        let reversal = self.inner.engine.redo(&entry, cancel).await;

        let mut stack = self.lock_stack();
        apply_edit(&mut stack, &entry, reversal.edit);
        if reversal.result == ReturnResult::Cancelled {
            // Keep the unexecuted entry on the redo side.
            stack.retreat();
        }
        debug!(result = ?reversal.result, cursor = ?stack.cursor(), "redo finished");
        reversal.result
    }

    fn lock_stack(&self) -> MutexGuard<'_, HistoryStack> {
        self.inner.stack.lock().unwrap_or_else(|poisoned| {
            warn!(
                error = %HistoryError::new(HistoryErrorCode::LockFailed, "History stack poisoned"),
                "recovering history stack"
            );
            poisoned.into_inner()
        })
    }
}

fn apply_edit(stack: &mut HistoryStack, entry: &HistoryEntry, edit: Option<StackEdit>) {
    match edit {
        None => {}
        Some(StackEdit::ReplaceCurrent(replacement)) => {
            info!(kind = ?replacement.kind(), "replacing current history entry");
            stack.replace_current(replacement);
        }
        Some(StackEdit::Remove { adjust_cursor }) => {
            info!(kind = ?entry.kind(), adjust_cursor, "removing history entry");
            stack.remove(entry, adjust_cursor);
        }
    }
}
