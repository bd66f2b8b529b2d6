//! Abort controllers for in-flight requests.

use wicket_core::CancellationToken;

/// The observable side of an [`AbortController`].
///
/// Cloned into the fetch options so the exchange can race against it.
#[derive(Clone, Debug, Default)]
pub struct AbortSignal {
    token: CancellationToken,
}

impl AbortSignal {
    /// Whether the owning controller has aborted.
    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait until the owning controller aborts.
    pub async fn aborted(&self) {
        self.token.cancelled().await;
    }
}

/// Owns the right to abort one request.
#[derive(Debug, Default)]
pub struct AbortController {
    signal: AbortSignal,
}

impl AbortController {
    /// Create a controller whose signal has not fired.
    pub fn new() -> Self {
        Self::default()
    }

    /// The signal observed by the exchange.
    pub fn signal(&self) -> &AbortSignal {
        &self.signal
    }

    /// Fire the signal. Returns `false` if it had already fired.
    pub fn abort(&self) -> bool {
        self.signal.token.cancel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abort_fires_once() {
        let controller = AbortController::new();
        let signal = controller.signal().clone();
        assert!(!signal.is_aborted());

        assert!(controller.abort());
        assert!(!controller.abort());
        assert!(signal.is_aborted());
    }

    #[tokio::test]
    async fn test_aborted_resolves_after_abort() {
        let controller = AbortController::new();
        controller.abort();
        controller.signal().aborted().await;
    }
}
