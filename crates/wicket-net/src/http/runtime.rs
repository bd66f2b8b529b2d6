//! A shared tokio runtime for callers that do not run one.
//!
//! [`FetchRequest::perform`](super::FetchRequest::perform) is an ordinary
//! future and runs on whichever runtime polls it. Synchronous code can hand
//! requests to this runtime instead.

use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;

static SHARED: OnceLock<Runtime> = OnceLock::new();

/// Start the shared runtime, or return it if it is already running.
///
/// # Panics
///
/// Panics if the runtime's worker threads cannot be spawned.
pub fn init() -> &'static Runtime {
    SHARED.get_or_init(|| {
        tracing::debug!(target: "wicket_net::http::runtime", "starting shared fetch runtime");
        Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("wicket-fetch")
            .enable_all()
            .build()
            .expect("Failed to create tokio runtime")
    })
}

/// The shared runtime, started on first use.
pub fn get() -> &'static Runtime {
    init()
}

/// Drive `future` to completion on the shared runtime.
///
/// Blocks the calling thread; panics when called from inside a runtime.
pub fn block_on<F: Future>(future: F) -> F::Output {
    get().block_on(future)
}

/// Run `future` in the background on the shared runtime.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    get().spawn(future)
}
