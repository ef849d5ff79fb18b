use crate::error::InternalError;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

///
/// CancelToken
///
/// Shared cancellation flag. Operations check it once, before their first
/// statement, and fail fast; a statement already in flight is not interrupted.
///

#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Pre-flight check.
    pub(crate) fn check(&self) -> Result<(), InternalError> {
        if self.is_cancelled() {
            Err(InternalError::cancelled())
        } else {
            Ok(())
        }
    }
}
