//! Ties the lifetime of a spawned task to the value that owns it

use tokio::task::JoinHandle;

/// Aborts the wrapped task when dropped
#[derive(Debug)]
pub struct OwnedHandle<T> {
    handle: JoinHandle<T>,
}

impl<T> OwnedHandle<T> {
    /// Whether the task has already completed or been aborted
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl<T> From<JoinHandle<T>> for OwnedHandle<T> {
    fn from(handle: JoinHandle<T>) -> Self {
        Self { handle }
    }
}

impl<T> Drop for OwnedHandle<T> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
