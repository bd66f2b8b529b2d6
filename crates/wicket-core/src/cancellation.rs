//! Cooperative cancellation tokens.
//!
//! A [`CancellationToken`] is a shared flag that flips once from "live" to
//! "cancelled". Work can poll it with [`is_cancelled`](CancellationToken::is_cancelled)
//! or await [`cancelled`](CancellationToken::cancelled) at a suspension point.
//!
//! ```
//! use wicket_core::CancellationToken;
//!
//! let token = CancellationToken::new();
//! let worker_token = token.clone();
//!
//! assert!(token.cancel());
//! assert!(!token.cancel());
//! assert!(worker_token.is_cancelled());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

use crate::logging::targets;

/// A cloneable, one-shot cancellation flag.
///
/// All clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<CancellationState>,
}

#[derive(Debug, Default)]
struct CancellationState {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationToken {
    /// Create a live token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Request cancellation and wake every task awaiting [`cancelled`](Self::cancelled).
    ///
    /// Returns `true` if this call flipped the token, `false` if it was
    /// already cancelled.
    pub fn cancel(&self) -> bool {
        if self.inner.cancelled.swap(true, Ordering::AcqRel) {
            return false;
        }
        tracing::trace!(target: targets::CANCELLATION, "cancellation requested");
        self.inner.notify.notify_waiters();
        true
    }

    /// Wait until the token is cancelled.
    ///
    /// Resolves immediately if it already is.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking the flag so a concurrent cancel is not missed.
            notified.as_mut().enable();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        assert!(token.cancel());
        assert!(clone.is_cancelled());
        assert!(!clone.cancel());
    }

    #[tokio::test]
    async fn test_cancelled_resolves_when_already_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), token.cancelled())
            .await
            .expect("cancelled() should resolve immediately");
    }

    #[tokio::test]
    async fn test_cancelled_wakes_waiting_task() {
        let token = CancellationToken::new();
        let waiter = {
            let token = token.clone();
            tokio::spawn(async move { token.cancelled().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .expect("waiter task panicked");
    }

    #[tokio::test]
    async fn test_live_token_stays_pending() {
        let token = CancellationToken::new();
        let result = tokio::time::timeout(Duration::from_millis(20), token.cancelled()).await;
        assert!(result.is_err());
    }
}
