//! Full-screen chat TUI.

mod app;
mod chat;
mod event;

pub use event::run_tui;
