//! TUI application state, rendering, and input handling.

use client::Viewport;
use proto::Conversation;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Spinner animation frames (Braille pattern).
const SPINNER: &[char] = &['⣾', '⣽', '⣻', '⢿', '⡿', '⣟', '⣯', '⣷'];

/// Full state for the TUI session.
pub struct TuiApp {
    /// Current text typed in the input box (not yet submitted).
    pub input: String,
    /// Cursor position within `input` (byte offset).
    pub cursor_pos: usize,
    /// Scroll state for the history panel.
    pub viewport: Viewport,
    /// Whether a response stream is currently active.
    pub streaming: bool,
    /// Spinner animation tick counter.
    pub spinner_tick: u8,
    /// Whether the user requested exit.
    pub should_quit: bool,
}

impl TuiApp {
    /// Create a new TUI application state.
    pub fn new() -> Self {
        Self {
            input: String::new(),
            cursor_pos: 0,
            viewport: Viewport::new(),
            streaming: false,
            spinner_tick: 0,
            should_quit: false,
        }
    }

    /// Take the current input and reset it.
    pub fn take_input(&mut self) -> String {
        self.cursor_pos = 0;
        std::mem::take(&mut self.input)
    }

    /// Handle a keyboard event for editing and scrolling.
    ///
    /// Editing stays available while a reply streams; only sending is gated,
    /// by the controller's one-stream invariant.
    pub fn handle_key(&mut self, key: crossterm::event::KeyEvent) {
        use crossterm::event::KeyCode;

        match key.code {
            KeyCode::Char(c) => {
                self.input.insert(self.cursor_pos, c);
                self.cursor_pos += c.len_utf8();
            }
            KeyCode::Backspace => {
                if self.cursor_pos > 0 {
                    // Find the previous character boundary
                    let prev = self.input[..self.cursor_pos]
                        .char_indices()
                        .last()
                        .map(|(i, _)| i)
                        .unwrap_or(0);
                    self.input.drain(prev..self.cursor_pos);
                    self.cursor_pos = prev;
                }
            }
            KeyCode::Left => {
                if self.cursor_pos > 0 {
                    self.cursor_pos = self.input[..self.cursor_pos]
                        .char_indices()
                        .last()
                        .map(|(i, _)| i)
                        .unwrap_or(0);
                }
            }
            KeyCode::Right => {
                if self.cursor_pos < self.input.len() {
                    self.cursor_pos = self.input[self.cursor_pos..]
                        .char_indices()
                        .nth(1)
                        .map(|(i, _)| self.cursor_pos + i)
                        .unwrap_or(self.input.len());
                }
            }
            KeyCode::Up => self.viewport.scroll_by(-1),
            KeyCode::Down => self.viewport.scroll_by(1),
            KeyCode::PageUp => self.viewport.scroll_by(-10),
            KeyCode::PageDown => self.viewport.scroll_by(10),
            _ => {}
        }
    }

    // ── Rendering ────────────────────────────────────────────

    /// Render the entire TUI into the given frame.
    pub fn render(&mut self, frame: &mut Frame<'_>, conversation: &Conversation) {
        let area = frame.area();

        // Layout: title(1) | history(fill) | status(1) | input(3)
        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(area);

        self.render_title(frame, chunks[0]);
        super::chat::render(conversation, &mut self.viewport, frame, chunks[1]);
        self.render_status(frame, chunks[2]);
        self.render_input(frame, chunks[3]);
    }

    fn render_title(&self, frame: &mut Frame<'_>, area: Rect) {
        let title = Line::from(vec![
            Span::styled(
                " studychat ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" study assistant ", Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(title), area);
    }

    fn render_status(&self, frame: &mut Frame<'_>, area: Rect) {
        let status_text = if self.streaming {
            let spinner = SPINNER[(self.spinner_tick as usize) % SPINNER.len()];
            Line::from(vec![
                Span::styled(
                    format!(" {spinner} Responding... "),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled("Esc:stop", Style::default().fg(Color::DarkGray)),
            ])
        } else {
            Line::from(Span::styled(
                " Enter:send  ↑↓:scroll  Esc:quit",
                Style::default().fg(Color::DarkGray),
            ))
        };
        frame.render_widget(Paragraph::new(status_text), area);
    }

    fn render_input(&self, frame: &mut Frame<'_>, area: Rect) {
        let display_text = if self.input.is_empty() {
            "Ask a study question, explain a topic, or paste notes..."
        } else {
            &self.input
        };

        let input_style = if self.input.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        let input = Paragraph::new(Span::styled(display_text, input_style)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Input "),
        );

        frame.render_widget(input, area);

        let cursor_col = self.input[..self.cursor_pos].chars().count() as u16;
        frame.set_cursor_position((area.x + 1 + cursor_col, area.y + 1));
    }
}
