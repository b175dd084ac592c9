use askbot_core::{ChatMessage, Origin};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::panel::ChatPanel;

const TOGGLE_WIDTH: u16 = 10;
const TOGGLE_HEIGHT: u16 = 3;
const PANEL_MAX_WIDTH: u16 = 52;
const PANEL_MAX_HEIGHT: u16 = 26;

/// Wrap text to fit within a given width, returning multiple lines
/// Breaks at word boundaries; words wider than `width` are hard-split
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current_line));
            }
            let chars: Vec<char> = word.chars().collect();
            let mut chunks = chars.chunks(width).peekable();
            while let Some(chunk) = chunks.next() {
                let piece: String = chunk.iter().collect();
                if chunks.peek().is_some() {
                    lines.push(piece);
                } else {
                    current_len = chunk.len();
                    current_line = piece;
                }
            }
        } else if current_len == 0 {
            current_line = word.to_string();
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current_line.push(' ');
            current_line.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(current_line);
            current_line = word.to_string();
            current_len = word_len;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, body_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);

    render_header(app, frame, header_area);
    render_page(frame, body_area);

    let is_open = app.panel().is_open();
    let toggle_area = toggle_rect(body_area);
    render_toggle(is_open, frame, toggle_area);
    app.toggle_area = Some(toggle_area);

    if is_open {
        render_panel(app, frame, body_area, toggle_area);
    } else {
        app.panel_area = None;
        app.close_area = None;
        app.send_area = None;
        app.transcript_area = None;
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" askbot ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.endpoint.as_str(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_page(frame: &mut Frame, area: Rect) {
    let hint = Text::from(vec![
        Line::default(),
        Line::from(Span::styled(
            "  Enter / click Chat  open the assistant",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "  Esc / click outside close it",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "  q / Ctrl+C          quit",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    frame.render_widget(Paragraph::new(hint), area);
}

fn toggle_rect(area: Rect) -> Rect {
    let width = TOGGLE_WIDTH.min(area.width);
    let height = TOGGLE_HEIGHT.min(area.height);
    Rect::new(
        area.x + area.width - width,
        area.y + area.height - height,
        width,
        height,
    )
}

fn render_toggle(is_open: bool, frame: &mut Frame, area: Rect) {
    let (label, style) = if is_open {
        (
            "Close",
            Style::default().fg(Color::Black).bg(Color::Cyan).bold(),
        )
    } else {
        ("Chat", Style::default().fg(Color::Cyan).bold())
    };

    let toggle = Paragraph::new(label)
        .alignment(Alignment::Center)
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    frame.render_widget(toggle, area);
}

/// The panel sits above the toggle button, flush right.
fn panel_rect(body: Rect, toggle: Rect) -> Rect {
    let width = PANEL_MAX_WIDTH.min(body.width);
    let height = PANEL_MAX_HEIGHT.min(toggle.y.saturating_sub(body.y));
    Rect::new(
        body.x + body.width - width,
        toggle.y - height,
        width,
        height,
    )
}

fn render_panel(app: &mut App, frame: &mut Frame, body: Rect, toggle: Rect) {
    let area = panel_rect(body, toggle);
    app.panel_area = Some(area);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Assistant ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Close control in the top border
    if area.width >= 6 {
        let close_area = Rect::new(area.x + area.width - 4, area.y, 3, 1);
        frame.render_widget(
            Paragraph::new(Span::styled("[x]", Style::default().fg(Color::Red).bold())),
            close_area,
        );
        app.close_area = Some(close_area);
    } else {
        app.close_area = None;
    }

    let [transcript_area, input_row] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(inner);
    let [input_area, send_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(8)]).areas(input_row);
    app.transcript_area = Some(transcript_area);
    app.send_area = Some(send_area);

    let animation_frame = app.animation_frame;
    let mut panel = app.panel();
    render_transcript(&mut panel, animation_frame, frame, transcript_area);
    render_input(&panel, frame, input_area);
    render_send_button(&panel, frame, send_area);
}

fn message_lines(message: &ChatMessage, width: usize) -> Vec<Line<'static>> {
    // Leave a gutter on the far side so bubbles read as left/right
    let text_width = width.saturating_sub(6).max(1);
    let mut lines = Vec::new();

    match message.origin() {
        Origin::User => {
            for wrapped in wrap_text_to_width(message.text(), text_width) {
                lines.push(
                    Line::from(Span::styled(wrapped, Style::default().fg(Color::Cyan)))
                        .alignment(Alignment::Right),
                );
            }
            lines.push(
                Line::from(vec![
                    Span::styled(message.time_label(), Style::default().fg(Color::DarkGray)),
                    Span::styled(" you", Style::default().fg(Color::Cyan).bold()),
                ])
                .alignment(Alignment::Right),
            );
        }
        Origin::Bot => {
            for wrapped in wrap_text_to_width(message.text(), text_width) {
                lines.push(Line::from(wrapped));
            }
            lines.push(Line::from(vec![
                Span::styled("bot ", Style::default().fg(Color::Yellow).bold()),
                Span::styled(message.time_label(), Style::default().fg(Color::DarkGray)),
            ]));
        }
    }

    lines.push(Line::default());
    lines
}

/// How far the view can scroll back over `total_lines` rendered lines.
/// Saturates instead of wrapping on very long sessions.
fn max_scroll_back(total_lines: usize, height: u16) -> u16 {
    u16::try_from(total_lines)
        .unwrap_or(u16::MAX)
        .saturating_sub(height)
}

fn render_transcript(panel: &mut ChatPanel, animation_frame: u8, frame: &mut Frame, area: Rect) {
    if panel.transcript().is_empty() && !panel.is_composing() {
        let placeholder = Paragraph::new(Span::styled(
            "Ask me anything...",
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(placeholder, area);
        return;
    }

    let width = area.width as usize;
    let mut lines: Vec<Line> = panel
        .transcript()
        .iter()
        .flat_map(|message| message_lines(message, width))
        .collect();

    if panel.is_composing() {
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((animation_frame as usize) + 1);
        lines.push(Line::from(vec![
            Span::styled("bot ", Style::default().fg(Color::Yellow).bold()),
            Span::styled(
                format!("typing{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ),
        ]));
    }

    let max_back = max_scroll_back(lines.len(), area.height);
    panel.clamp_scroll_back(max_back);
    let offset = max_back - panel.scroll_back();

    let transcript = Paragraph::new(Text::from(lines)).scroll((offset, 0));
    frame.render_widget(transcript, area);
}

fn render_input(panel: &ChatPanel, frame: &mut Frame, area: Rect) {
    let focused = panel.is_input_focused();
    let border_color = if focused { Color::Yellow } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    // Horizontal scrolling keeps the cursor visible
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = panel.cursor();
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let input = if panel.input().is_empty() {
        Paragraph::new(Span::styled(
            "Type your message...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let visible_text: String = panel
            .input()
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };
    frame.render_widget(input.block(block), area);

    if focused && inner_width > 0 {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_send_button(panel: &ChatPanel, frame: &mut Frame, area: Rect) {
    let style = if panel.is_send_enabled() {
        Style::default().fg(Color::Cyan).bold()
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let button = Paragraph::new("Send")
        .alignment(Alignment::Center)
        .style(style)
        .block(Block::default().borders(Borders::ALL).border_style(style));
    frame.render_widget(button, area);
}
