//! Cancellation of storage work that has outlived its caller.
//!
//! A [`CancelToken`] is entered on the thread that runs the storage call.
//! Write paths check it after taking the writer lock and again right before
//! commit, so a cancelled unit of work is rolled back instead of landing late.

use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{DbError, Result};

thread_local! {
    static CURRENT: RefCell<Option<CancelToken>> = const { RefCell::new(None) };
}

#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Make this token the current one for the calling thread until the
    /// returned guard is dropped.
    pub fn enter(&self) -> CancelScope {
        let previous = CURRENT.with(|c| c.replace(Some(self.clone())));
        CancelScope { previous }
    }
}

pub struct CancelScope {
    previous: Option<CancelToken>,
}

impl Drop for CancelScope {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|c| *c.borrow_mut() = previous);
    }
}

/// Fails with [`DbError::Cancelled`] when the current thread's token fired.
pub(crate) fn check() -> Result<()> {
    let cancelled = CURRENT.with(|c| c.borrow().as_ref().is_some_and(CancelToken::is_cancelled));
    if cancelled {
        return Err(DbError::Cancelled);
    }
    Ok(())
}
