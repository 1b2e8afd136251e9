//! Async event loop for the TUI — interleaves crossterm, stream updates, and
//! timer events.

use client::ChatController;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use super::app::TuiApp;

/// Seeded assistant greeting shown before the first exchange.
const GREETING: &str =
    "Hi! I'm your study assistant. Ask me to explain concepts, summarize notes, \
     or help with problems.";

/// RAII guard restoring the terminal on exit (including panics).
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(std::io::stdout(), LeaveAlternateScreen);
    }
}

/// Run the full-screen TUI until the user quits.
pub async fn run_tui(endpoint: String) -> anyhow::Result<()> {
    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _guard = TerminalGuard; // Drop restores terminal

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    debug!(%endpoint, "TUI started");

    let (mut controller, mut updates_rx) = ChatController::new(endpoint);
    controller.conversation_mut().push_assistant(GREETING);

    let mut app = TuiApp::new();

    // Crossterm event stream (async)
    let mut crossterm_stream = EventStream::new();

    // Spinner tick interval (100ms)
    let mut spinner_interval = tokio::time::interval(std::time::Duration::from_millis(100));
    spinner_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        app.streaming = controller.is_streaming();

        // Render
        terminal.draw(|frame| app.render(frame, controller.conversation()))?;

        // Event select
        tokio::select! {
            // Branch 1: crossterm terminal events
            maybe_event = crossterm_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        use crossterm::event::{KeyCode, KeyModifiers};
                        match (key.modifiers, key.code) {
                            (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                                app.should_quit = true;
                            }
                            (_, KeyCode::Esc) => {
                                if controller.is_streaming() {
                                    controller.stop();
                                } else {
                                    app.should_quit = true;
                                }
                            }
                            (_, KeyCode::Enter) => {
                                if !controller.is_streaming() {
                                    let text = app.take_input();
                                    if controller.send(&text) {
                                        debug!(chars = text.len(), "Message sent");
                                        app.viewport.scroll_to_bottom();
                                    }
                                }
                            }
                            _ => app.handle_key(key),
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                }
            }

            // Branch 2: stream updates from the controller task
            Some(event) = updates_rx.recv() => {
                controller.apply(event);
                // Follow the newest content only while the user is at the
                // bottom; never yank a view scrolled up to read history.
                if app.viewport.is_at_bottom() {
                    app.viewport.scroll_to_bottom();
                }
            }

            // Branch 3: spinner animation tick
            _ = spinner_interval.tick() => {
                app.spinner_tick = app.spinner_tick.wrapping_add(1);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
