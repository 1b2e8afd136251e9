//! Per-send stream session state: stop flag and cancellation handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::future::{AbortHandle, AbortRegistration};

/// Transient state for one request/response cycle.
///
/// Created when a send begins; the paired [`AbortRegistration`] is bound to
/// the in-flight network call so [`StreamSession::stop`] promptly unblocks
/// any pending read. The stop flag is additionally polled between chunks and
/// between paced slices.
#[derive(Debug, Clone)]
pub struct StreamSession {
    stop: Arc<AtomicBool>,
    abort: AbortHandle,
}

impl StreamSession {
    /// Creates a fresh session and the registration to bind to the call.
    pub fn new() -> (Self, AbortRegistration) {
        let (abort, registration) = AbortHandle::new_pair();
        (
            Self {
                stop: Arc::new(AtomicBool::new(false)),
                abort,
            },
            registration,
        )
    }

    /// Requests cancellation: sets the stop flag and aborts the network call.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        self.abort.abort();
    }

    /// Returns true once a stop has been requested.
    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}
