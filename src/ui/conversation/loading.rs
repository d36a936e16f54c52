use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

pub const LOADING_TEXT: &str = "응답 생성 중";

/// "Response is being generated" line shown while a request is in flight
#[derive(Debug, Default)]
pub struct LoadingIndicator {
    frame: usize,
}

impl LoadingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the animation by one tick
    pub fn tick(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }

    pub fn dots(&self) -> &'static str {
        match self.frame % 4 {
            0 => ".",
            1 => "..",
            2 => "...",
            _ => "   ",
        }
    }

    pub fn view(&self, active: bool) -> LoadingView {
        LoadingView {
            active,
            dots: self.dots(),
        }
    }
}

pub struct LoadingView {
    active: bool,
    dots: &'static str,
}

impl Widget for LoadingView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if !self.active {
            return;
        }

        let indicator = Line::from(vec![
            Span::styled("⏳ ", Style::default().fg(Color::Green)),
            Span::styled(LOADING_TEXT, Style::default().fg(Color::Green)),
            Span::styled(self.dots, Style::default().fg(Color::Yellow)),
        ]);
        buf.set_line(area.x, area.y, &indicator, area.width);
    }
}
