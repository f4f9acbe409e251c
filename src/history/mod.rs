mod coordinator;
mod engine;
mod entry;
mod error;
mod ops;
mod stack;
mod status;

pub use coordinator::{HistoryCoordinator, HistorySnapshot};
pub use engine::{Reversal, ReversalEngine, StackEdit};
pub use entry::{HistoryEntry, ItemKind, ItemRef, OperationKind};
pub use error::{map_api_result, HistoryError, HistoryErrorCode, HistoryResult};
pub use ops::{FilesystemHelpers, FilesystemOperations};
pub use stack::{HistoryStack, DEFAULT_MAX_HISTORY};
pub use status::{
    DeleteConfirmationPolicy, Direction, FileSystemStatusCode, NameCollisionOption, ReturnResult,
    StatusReporter,
};

#[cfg(test)]
mod fake_fs;
