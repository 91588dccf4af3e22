//! A cloneable handle for cancelling the session from external code.

use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio_util::sync::CancellationToken;

/// A cloneable handle for cancelling the running turn from external code.
///
/// All fields are `Arc`-wrapped, so cloning is cheap.
#[derive(Clone)]
pub struct SessionHandle {
    pub(crate) cancel: Arc<Mutex<CancellationToken>>,
    pub(crate) is_running: Arc<AtomicBool>,
}

impl SessionHandle {
    pub(crate) fn new() -> Self {
        Self {
            cancel: Arc::new(Mutex::new(CancellationToken::new())),
            is_running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cancel the running turn. Cancelling twice is a no-op.
    pub fn cancel(&self) {
        self.cancel.lock().cancel();
    }

    /// Whether the current turn's token has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancel.lock().is_cancelled()
    }

    /// Install a fresh token for a new turn and mark the session running
    pub(crate) fn begin_run(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.cancel.lock() = token.clone();
        self.is_running.store(true, Ordering::Release);
        token
    }

    pub(crate) fn end_run(&self) {
        self.is_running.store(false, Ordering::Release);
    }

    /// Whether a turn is currently running.
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_idempotent() {
        let handle = SessionHandle::new();
        let token = handle.begin_run();
        handle.cancel();
        handle.cancel();
        assert!(token.is_cancelled());
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_begin_run_installs_fresh_token() {
        let handle = SessionHandle::new();
        let first = handle.begin_run();
        handle.cancel();
        let second = handle.begin_run();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(!handle.is_cancelled());
    }

    #[test]
    fn test_running_between_begin_and_end() {
        let handle = SessionHandle::new();
        let observer = handle.clone();
        assert!(!observer.is_running());

        handle.begin_run();
        assert!(observer.is_running());
        handle.end_run();
        assert!(!observer.is_running());
    }
}
