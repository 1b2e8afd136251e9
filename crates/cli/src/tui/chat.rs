//! Chat history widget — renders the conversation with autoscroll tracking.

use client::Viewport;
use proto::{Conversation, Role};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthChar as _;

/// Renders the chat history area and keeps the viewport's extents current.
///
/// Lines are pre-wrapped to the inner width before rendering, so the scroll
/// extents count exactly the visual rows on screen.
pub fn render(
    conversation: &Conversation,
    viewport: &mut Viewport,
    frame: &mut Frame<'_>,
    area: Rect,
) {
    let inner_width = area.width.saturating_sub(2); // block borders
    let lines = wrap_lines(&history_lines(conversation), inner_width);

    let content_height = lines.len() as u16;
    let visible_height = area.height.saturating_sub(2);
    viewport.update_extents(content_height, visible_height);

    let history = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .scroll((viewport.offset(), 0));

    frame.render_widget(history, area);
}

/// Builds the styled line list for the whole conversation.
fn history_lines(conversation: &Conversation) -> Vec<Line<'_>> {
    let mut lines: Vec<Line<'_>> = Vec::new();

    for msg in conversation.messages() {
        match msg.role {
            Role::User => {
                lines.push(Line::from(""));
                lines.push(Line::from(vec![
                    Span::styled(
                        "You: ",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(msg.content.as_str()),
                ]));
            }
            Role::Assistant => {
                lines.push(Line::from(""));
                // Split multi-line responses
                let mut first = true;
                for line in msg.content.lines() {
                    if first {
                        lines.push(Line::from(vec![
                            Span::styled(
                                "Tutor: ",
                                Style::default()
                                    .fg(Color::Green)
                                    .add_modifier(Modifier::BOLD),
                            ),
                            Span::raw(line.to_string()),
                        ]));
                        first = false;
                    } else {
                        lines.push(Line::from(Span::raw(format!("       {line}"))));
                    }
                }
                if first {
                    // Empty in-progress placeholder still gets its label.
                    lines.push(Line::from(Span::styled(
                        "Tutor: ",
                        Style::default()
                            .fg(Color::Green)
                            .add_modifier(Modifier::BOLD),
                    )));
                }
            }
        }
    }

    lines
}

/// Wraps styled lines at `inner_width` display columns, one visual row per
/// output line.
///
/// Character-level wrapping over the span contents; double-width characters
/// (CJK, emoji, …) occupy two columns. Span styles survive wrap points and
/// blank lines are kept.
fn wrap_lines(lines: &[Line<'_>], inner_width: u16) -> Vec<Line<'static>> {
    let width = inner_width as usize;
    let mut wrapped: Vec<Line<'static>> = Vec::new();

    for line in lines {
        let mut row: Vec<Span<'static>> = Vec::new();
        let mut col = 0usize;

        for span in &line.spans {
            let mut piece = String::new();
            for ch in span.content.chars() {
                let ch_w = ch.width().unwrap_or(1).max(1);

                // Wrap before adding this character if it wouldn't fit.
                if width > 0 && col + ch_w > width {
                    if !piece.is_empty() {
                        row.push(Span::styled(std::mem::take(&mut piece), span.style));
                    }
                    wrapped.push(Line::from(std::mem::take(&mut row)));
                    col = 0;
                }

                piece.push(ch);
                col += ch_w;
            }
            if !piece.is_empty() {
                row.push(Span::styled(piece, span.style));
            }
        }

        // Push the row even if it's empty (blank lines must be preserved).
        wrapped.push(Line::from(row));
    }

    wrapped
}
