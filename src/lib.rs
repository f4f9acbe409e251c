//! Undo/redo history for filesystem operations.
//!
//! A [`HistoryCoordinator`] owns the [`HistoryStack`] of recorded
//! [`HistoryEntry`] values and runs their inverse or replay through a
//! [`ReversalEngine`], which delegates the actual filesystem work to the
//! host's [`FilesystemHelpers`] and [`FilesystemOperations`].

pub mod config;
pub mod errors;
pub mod history;
pub mod logging;
pub mod tasks;

pub use config::HistoryConfig;
pub use history::{
    FilesystemHelpers, FilesystemOperations, HistoryCoordinator, HistoryEntry, HistoryStack,
    ItemKind, ItemRef, OperationKind, ReturnResult, ReversalEngine,
};
pub use tasks::{CancelState, CancelToken};
