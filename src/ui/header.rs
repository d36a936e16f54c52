use crate::state::{AppState, HealthSignal};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

pub const TITLE: &str = "🤖 AI 채팅";

/// Label and color of the health indicator
pub fn health_label(state: &AppState) -> (String, Color) {
    let (text, color) = match state.health_signal() {
        HealthSignal::Unknown => ("서버 확인 중", Color::DarkGray),
        HealthSignal::Healthy => ("서버 정상", Color::Green),
        HealthSignal::Error => ("서버 오류", Color::Red),
    };

    let minutes = state.health().map(|h| h.uptime_minutes()).unwrap_or(0);
    let uptime_shown = state.health().is_some_and(|h| h.uptime > 0.0);
    let label = if uptime_shown {
        format!("{} ({}분)", text, minutes)
    } else {
        text.to_string()
    };
    (label, color)
}

/// Title bar with the server health indicator
pub struct Header<'a> {
    pub state: &'a AppState,
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::BOTTOM);
        let inner = block.inner(area);
        block.render(area, buf);

        let (label, color) = health_label(self.state);
        let line = Line::from(vec![
            Span::styled(TITLE, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("   "),
            Span::styled("● ", Style::default().fg(color)),
            Span::styled(label, Style::default().fg(color)),
        ]);
        buf.set_line(inner.x, inner.y, &line, inner.width);
    }
}
