use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::error::{IngestError, Result};

/// A cancellation token shared between an ingest and whoever may abort it.
///
/// Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct Cancellable {
    cancelled: Arc<AtomicBool>,
}

impl Cancellable {
    /// Creates a token that has not been tripped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trips the token.  There is no way to reset it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns [`IngestError::Cancelled`] once the token has been tripped.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(IngestError::Cancelled)
        } else {
            Ok(())
        }
    }
}

pub(crate) fn check(cancel: Option<&Cancellable>) -> Result<()> {
    match cancel {
        Some(cancel) => cancel.check(),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::Cancellable;
    use crate::error::IngestError;

    #[test]
    fn clones_share_state() {
        let token = Cancellable::new();
        let other = token.clone();
        assert!(token.check().is_ok());
        other.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(IngestError::Cancelled)));
    }

    #[test]
    fn absent_token_never_cancels() {
        assert!(super::check(None).is_ok());
    }
}
