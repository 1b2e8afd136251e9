//! Stream consumer — drives the send/receive/render cycle against the relay
//! endpoint: incremental byte decoding, paced display, scroll tracking, and
//! mid-flight cancellation.

mod consumer;
mod controller;
mod decode;
mod session;
mod viewport;

pub use consumer::{SLICE_CHARS, SLICE_DELAY, StreamEvent, consume};
pub use controller::{ChatController, ERROR_NOTICE};
pub use decode::StreamDecoder;
pub use session::StreamSession;
pub use viewport::{BOTTOM_SLACK, Viewport};
