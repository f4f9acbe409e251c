use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
};
use tracing::warn;

mod error;

pub use error::{map_api_result, TaskError, TaskErrorCode, TaskResult};

/// Cancellation signal handed to a single undo or redo.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Registry of in-flight reversals, keyed by a host-chosen id, so a UI can
/// cancel one it started earlier.
#[derive(Clone, Default)]
pub struct CancelState {
    inner: Arc<Mutex<HashMap<String, CancelToken>>>,
}

#[derive(Clone)]
pub struct CancelGuard {
    id: String,
    token: CancelToken,
    state: CancelState,
}

impl CancelState {
    fn lock(&self) -> TaskResult<MutexGuard<'_, HashMap<String, CancelToken>>> {
        self.inner.lock().map_err(|_| {
            TaskError::new(
                TaskErrorCode::RegistryLockFailed,
                "Failed to lock cancel registry",
            )
        })
    }

    pub fn register(&self, id: impl Into<String>) -> TaskResult<CancelGuard> {
        let id = id.into();
        let token = CancelToken::new();
        let mut map = self.lock()?;
        if map.contains_key(&id) {
            return Err(TaskError::new(
                TaskErrorCode::DuplicateTask,
                format!("Task already registered: {id}"),
            ));
        }
        map.insert(id.clone(), token.clone());
        Ok(CancelGuard {
            id,
            token,
            state: self.clone(),
        })
    }

    pub fn cancel(&self, id: &str) -> TaskResult<()> {
        let map = self.lock()?;
        match map.get(id) {
            Some(token) => {
                token.cancel();
                Ok(())
            }
            None => Err(TaskError::new(
                TaskErrorCode::TaskNotFound,
                "Task not found or already finished",
            )),
        }
    }

    pub fn cancel_all(&self) -> TaskResult<usize> {
        let map = self.lock()?;
        for token in map.values() {
            token.cancel();
        }
        Ok(map.len())
    }

    fn remove(&self, id: &str) {
        match self.inner.lock() {
            Ok(mut map) => {
                map.remove(id);
            }
            Err(_) => {
                warn!(task_id = id, "failed to remove task from cancel registry");
            }
        }
    }
}

impl CancelGuard {
    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.state.remove(&self.id);
    }
}
