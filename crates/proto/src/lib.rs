//! Shared protocol types for studychat.
//!
//! Defines the conversation data model, the wire request format accepted by
//! the relay endpoint, and the error taxonomy used across crates.

mod conversation;
mod error;
mod message;

pub use conversation::Conversation;
pub use error::{ConfigError, Error, ProtoError, RelayError, Result, StreamError};
pub use message::{ChatRequest, Message, Role, WireMessage};
