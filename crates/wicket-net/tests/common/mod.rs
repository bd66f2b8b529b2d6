//! Shared helpers for fetch request tests.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use wicket_net::http::{FetchRequestHeaders, FetchResponse};
use wicket_net::{FetchRequest, FetchRequestDelegate, NetworkError};

/// One delegate callback, as observed by [`RecordingDelegate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    Started,
    Prevented(u16),
    Succeeded(u16),
    Failed(u16),
    Errored(NetworkError),
    Finished,
}

/// A delegate that records every notification in order.
#[derive(Default)]
pub struct RecordingDelegate {
    notifications: Mutex<Vec<Notification>>,
    additional_headers: Option<FetchRequestHeaders>,
}

impl RecordingDelegate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_headers(headers: FetchRequestHeaders) -> Arc<Self> {
        Arc::new(Self {
            additional_headers: Some(headers),
            ..Default::default()
        })
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    fn record(&self, notification: Notification) {
        self.notifications.lock().push(notification);
    }
}

impl FetchRequestDelegate for RecordingDelegate {
    fn additional_headers_for_request(
        &self,
        _request: &FetchRequest,
    ) -> Option<FetchRequestHeaders> {
        self.additional_headers.clone()
    }

    fn request_started(&self, _request: &FetchRequest) {
        self.record(Notification::Started);
    }

    fn request_prevented_handling_response(&self, _: &FetchRequest, response: &FetchResponse) {
        self.record(Notification::Prevented(response.status_code()));
    }

    fn request_succeeded_with_response(&self, _: &FetchRequest, response: &FetchResponse) {
        self.record(Notification::Succeeded(response.status_code()));
    }

    fn request_failed_with_response(&self, _: &FetchRequest, response: &FetchResponse) {
        self.record(Notification::Failed(response.status_code()));
    }

    fn request_errored(&self, _request: &FetchRequest, error: &NetworkError) {
        self.record(Notification::Errored(error.clone()));
    }

    fn request_finished(&self, _request: &FetchRequest) {
        self.record(Notification::Finished);
    }
}

/// The notifications of one settled exchange: started, `outcome`, finished.
pub fn lifecycle(outcome: Notification) -> Vec<Notification> {
    vec![Notification::Started, outcome, Notification::Finished]
}

/// A delegate without the optional header capability.
#[derive(Default)]
pub struct MinimalDelegate {
    pub finished: Mutex<usize>,
}

impl FetchRequestDelegate for MinimalDelegate {
    fn request_started(&self, _request: &FetchRequest) {}
    fn request_prevented_handling_response(&self, _: &FetchRequest, _: &FetchResponse) {}
    fn request_succeeded_with_response(&self, _: &FetchRequest, _: &FetchResponse) {}
    fn request_failed_with_response(&self, _: &FetchRequest, _: &FetchResponse) {}
    fn request_errored(&self, _: &FetchRequest, _: &NetworkError) {}
    fn request_finished(&self, _request: &FetchRequest) {
        *self.finished.lock() += 1;
    }
}

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
