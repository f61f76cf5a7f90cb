//! Per-request context: correlation id, optional deadline and a cancellation flag.
//!
//! The core holds no timeouts of its own. Callers decide the deadline; store operations check
//! the context right before they touch shared state so nothing is written once cancellation
//! has been observed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::errors::DbError;

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: Uuid,
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestContext {
    #[must_use]
    pub fn new() -> Self {
        Self { request_id: Uuid::new_v4(), deadline: None, cancelled: Arc::new(AtomicBool::new(false)) }
    }

    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { deadline: Some(Instant::now() + timeout), ..Self::new() }
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Returns a handle that cancels this context (and all its clones) when triggered.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(self.cancelled.clone())
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// # Errors
    /// `DbError::Cancelled` or `DbError::DeadlineExceeded` once the request should stop.
    pub fn check(&self) -> Result<(), DbError> {
        if self.is_cancelled() {
            return Err(DbError::Cancelled);
        }
        if let Some(dl) = self.deadline
            && Instant::now() >= dl
        {
            return Err(DbError::DeadlineExceeded);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}
