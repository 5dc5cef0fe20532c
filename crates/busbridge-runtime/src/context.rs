//! Request context: cooperative cancellation plus an optional deadline
//!
//! A [`Context`] travels with every job and every client call. Cancellation is
//! cooperative: nothing is aborted for you, handlers decide when to check
//! [`Context::is_cancelled`] or race work against [`Context::run`].

use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Why a context is done
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("context cancelled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Shared cancellation state; cancelling a parent cancels all live children.
struct CancelState {
    triggered: AtomicBool,
    notify: Notify,
    children: Mutex<Vec<Weak<CancelState>>>,
}

impl CancelState {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            triggered: AtomicBool::new(false),
            notify: Notify::new(),
            children: Mutex::new(Vec::new()),
        })
    }

    fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    fn cancel(&self) {
        if self.triggered.swap(true, Ordering::SeqCst) {
            return;
        }
        self.notify.notify_waiters();

        let children = std::mem::take(&mut *self.children.lock());
        for child in children.iter().filter_map(Weak::upgrade) {
            child.cancel();
        }
    }

    fn child(self: &Arc<Self>) -> Arc<Self> {
        let child = CancelState::new();
        let mut children = self.children.lock();
        if self.is_triggered() {
            child.triggered.store(true, Ordering::SeqCst);
        } else {
            children.retain(|weak| weak.strong_count() > 0);
            children.push(Arc::downgrade(&child));
        }
        child
    }
}

/// Handle for cancelling a context created with [`Context::with_cancel`]
#[derive(Clone)]
pub struct CancelHandle {
    state: Arc<CancelState>,
}

impl CancelHandle {
    /// Cancel the context and every context derived from it
    ///
    /// Idempotent.
    pub fn cancel(&self) {
        self.state.cancel();
    }

    /// Check if cancellation has been triggered
    pub fn is_cancelled(&self) -> bool {
        self.state.is_triggered()
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Cancellation and deadline scope for a call
#[derive(Clone)]
pub struct Context {
    cancel: Arc<CancelState>,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline
    pub fn background() -> Self {
        Self {
            cancel: CancelState::new(),
            deadline: None,
        }
    }

    /// Derive a context that can be cancelled independently of its parent
    ///
    /// Cancelling the parent still cancels the child.
    pub fn with_cancel(&self) -> (Context, CancelHandle) {
        let state = self.cancel.child();
        let ctx = Context {
            cancel: Arc::clone(&state),
            deadline: self.deadline,
        };
        (ctx, CancelHandle { state })
    }

    /// Derive a context that expires at `deadline` (or earlier, if the parent does)
    pub fn with_deadline(&self, deadline: Instant) -> Context {
        let deadline = match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        };
        Context {
            cancel: Arc::clone(&self.cancel),
            deadline: Some(deadline),
        }
    }

    /// Derive a context that expires after `timeout`
    pub fn with_timeout(&self, timeout: Duration) -> Context {
        self.with_deadline(Instant::now() + timeout)
    }

    /// The deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Check if the context was cancelled (does not consider the deadline)
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_triggered()
    }

    /// Why the context is done, or `None` while it is still live
    pub fn err(&self) -> Option<ContextError> {
        if self.is_cancelled() {
            return Some(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Wait until the context is cancelled
    ///
    /// Returns immediately if already cancelled.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.cancel.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Wait until the context is cancelled or its deadline passes
    pub async fn done(&self) -> ContextError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                _ = self.cancelled() => ContextError::Cancelled,
                _ = tokio::time::sleep_until(deadline) => ContextError::DeadlineExceeded,
            },
            None => {
                self.cancelled().await;
                ContextError::Cancelled
            }
        }
    }

    /// Run a future bound to this context
    ///
    /// The future is dropped if the context finishes first.
    pub async fn run<F>(&self, future: F) -> Result<F::Output, ContextError>
    where
        F: Future,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            output = future => Ok(output),
            err = self.done() => Err(err),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cancelled", &self.is_cancelled())
            .field("deadline", &self.deadline)
            .finish()
    }
}
