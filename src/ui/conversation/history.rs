//! Conversation history display component

use crate::events::{Message, Role};
use crate::state::AppState;
use crate::ui::render::{body_lines, format_time, view_message};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Widget},
};
use std::cell::Cell;

/// Scroll position of the history pane, counted in lines from the bottom
#[derive(Debug, Default)]
pub struct ConversationHistory {
    scroll_from_bottom: usize,
    /// Largest useful offset seen at the last render
    max_scroll: Cell<usize>,
    /// Inner height seen at the last render, used as the page size
    page_height: Cell<usize>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_from_bottom
    }

    /// Scroll up one page
    pub fn scroll_up(&mut self) {
        let page = self.page_height.get().max(1);
        self.scroll_from_bottom = (self.scroll_from_bottom + page).min(self.max_scroll.get());
    }

    /// Scroll down one page
    pub fn scroll_down(&mut self) {
        let page = self.page_height.get().max(1);
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(page);
    }

    /// Scroll to bottom
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_from_bottom = 0;
    }
}

/// Borrowed view of the history for rendering
pub struct HistoryView<'a> {
    pub history: &'a ConversationHistory,
    pub state: &'a AppState,
    pub show_timestamps: bool,
}

impl Widget for HistoryView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("💬 대화");

        let inner_area = block.inner(area);
        block.render(area, buf);

        let messages = self.state.conversation().messages();
        if messages.is_empty() {
            let welcome_lines = vec![
                Line::from(vec![Span::styled("AI 채팅에 오신 것을 환영합니다! 🤖", Style::default().fg(Color::Green))]),
                Line::from(vec![Span::raw("")]),
                Line::from(vec![Span::styled("아래에 질문을 입력해 보세요.", Style::default().fg(Color::Gray))]),
                Line::from(vec![Span::raw("")]),
                Line::from(vec![Span::styled("Enter: 전송 · Shift+Enter: 줄바꿈 · /help: 도움말", Style::default().fg(Color::DarkGray))]),
            ];
            Paragraph::new(welcome_lines).render(inner_area, buf);
            return;
        }

        let mut all_lines: Vec<Line> = Vec::new();
        for message in messages {
            all_lines.append(&mut message_lines(message, inner_area.width, self.show_timestamps));
            // spacing between messages
            all_lines.push(Line::from(""));
        }
        all_lines.pop();

        let height = inner_area.height as usize;
        let max_scroll = all_lines.len().saturating_sub(height);
        self.history.max_scroll.set(max_scroll);
        self.history.page_height.set(height);

        let offset = self.history.scroll_from_bottom.min(max_scroll);
        let end = all_lines.len() - offset;
        let start = end.saturating_sub(height);
        let visible: Vec<Line> = all_lines.drain(start..end).collect();

        Paragraph::new(Text::from(visible)).render(inner_area, buf);
    }
}

/// Header plus wrapped body of one message. User messages are right-aligned.
fn message_lines(message: &Message, width: u16, show_timestamps: bool) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let role_icon = match message.role {
        Role::User => "👤",
        Role::Assistant => "🤖",
    };
    let header = if show_timestamps {
        format!("{} {}", role_icon, format_time(message))
    } else {
        role_icon.to_string()
    };
    lines.push(Line::from(vec![Span::styled(header, Style::default().fg(Color::DarkGray))]));

    let view = view_message(message);
    let body_width = width.saturating_sub(2) as usize;
    for line in body_lines(&view, message.role, body_width) {
        let mut spans = vec![Span::raw("  ")];
        spans.extend(line.spans);
        lines.push(Line::from(spans));
    }

    if message.role == Role::User {
        lines = lines.into_iter().map(|l| l.alignment(Alignment::Right)).collect();
    }
    lines
}
