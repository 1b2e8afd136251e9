//! Relay endpoint — forwards a conversation to an OpenAI-compatible
//! completion provider and re-streams the response as raw bytes.

mod backend;
mod server;

pub use backend::{CompletionBackend, FragmentStream, OpenAiBackend};
pub use server::{router, serve};
