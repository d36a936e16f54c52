//! Display-time transform of a message into either a quiz layout or plain
//! text. Nothing produced here is stored.

use chrono::Local;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::events::{Message, Role};
use crate::quiz::{self, Choice, GenerateResponse};

pub const PASSAGE_LABEL: &str = "지문:";
pub const OPTIONS_LABEL: &str = "선택지:";
pub const ANSWER_LABEL: &str = "정답:";
pub const EXPLANATION_LABEL: &str = "해설:";

/// Marker placed before the highlighted choice
pub const ANSWER_MARKER: &str = "▶";

/// What a message looks like once interpreted
#[derive(Debug, Clone, PartialEq)]
pub enum MessageView {
    Plain(String),
    Quiz(QuizView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizView {
    pub question: String,
    pub passage: String,
    pub choices: Vec<Choice>,
    /// `None` when the answer index does not name a choice
    pub answer_label: Option<String>,
    pub explanation: String,
}

impl QuizView {
    pub fn highlighted(&self) -> Option<&Choice> {
        self.choices.iter().find(|c| c.is_answer)
    }
}

impl From<GenerateResponse> for QuizView {
    fn from(quiz: GenerateResponse) -> Self {
        QuizView {
            choices: quiz.choices(),
            answer_label: quiz.answer_label(),
            question: quiz.question,
            passage: quiz.passage,
            explanation: quiz.explanation,
        }
    }
}

/// Interprets a message for display. User messages are always plain.
pub fn view_message(message: &Message) -> MessageView {
    match message.role {
        Role::User => MessageView::Plain(message.content.clone()),
        Role::Assistant => view_content(&message.content),
    }
}

/// Interprets assistant content, falling back to plain text.
pub fn view_content(content: &str) -> MessageView {
    match quiz::try_parse_structured(content) {
        Some(parsed) => MessageView::Quiz(parsed.into()),
        None => MessageView::Plain(content.to_string()),
    }
}

/// Local `HH:MM` time of a message
pub fn format_time(message: &Message) -> String {
    message.timestamp.with_timezone(&Local).format("%H:%M").to_string()
}

/// Terminal-independent rendering used by the one-shot `ask` command
pub fn to_plain_text(view: &MessageView) -> String {
    match view {
        MessageView::Plain(text) => text.clone(),
        MessageView::Quiz(quiz) => {
            let mut out = String::new();
            out.push_str(&quiz.question);
            out.push('\n');
            out.push_str(&format!("{} {}\n", PASSAGE_LABEL, quiz.passage));
            out.push_str(OPTIONS_LABEL);
            out.push('\n');
            for choice in &quiz.choices {
                let marker = if choice.is_answer { ANSWER_MARKER } else { " " };
                out.push_str(&format!("{} {}. {}\n", marker, choice.label, choice.text));
            }
            out.push_str(&format!("{} {}\n", ANSWER_LABEL, answer_text(quiz)));
            out.push_str(&format!("{} {}", EXPLANATION_LABEL, quiz.explanation));
            out
        }
    }
}

fn answer_text(quiz: &QuizView) -> &str {
    quiz.answer_label.as_deref().unwrap_or("?")
}

/// Lines for a message body wrapped to `width` columns
pub fn body_lines(view: &MessageView, role: Role, width: usize) -> Vec<Line<'static>> {
    match view {
        MessageView::Plain(text) => plain_lines(text, role, width),
        MessageView::Quiz(quiz) => quiz_lines(quiz, width),
    }
}

fn content_style(role: Role) -> Style {
    match role {
        Role::User => Style::default().fg(Color::Cyan),
        Role::Assistant => Style::default().fg(Color::White),
    }
}

fn plain_lines(text: &str, role: Role, width: usize) -> Vec<Line<'static>> {
    let text = if text.is_empty() { " " } else { text };
    let style = content_style(role);
    wrap_text(text, width)
        .into_iter()
        .map(|line| Line::from(Span::styled(line, style)))
        .collect()
}

fn quiz_lines(quiz: &QuizView, width: usize) -> Vec<Line<'static>> {
    let label_style = Style::default().add_modifier(Modifier::BOLD);
    let secondary = Style::default().fg(Color::DarkGray);
    let mut lines = Vec::new();

    for line in wrap_text(&quiz.question, width) {
        lines.push(Line::from(Span::styled(
            line,
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )));
    }

    labelled_lines(&mut lines, PASSAGE_LABEL, &quiz.passage, label_style, Style::default(), width);

    lines.push(Line::from(Span::styled(OPTIONS_LABEL, label_style)));
    for choice in &quiz.choices {
        let (marker, style) = if choice.is_answer {
            (
                ANSWER_MARKER,
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )
        } else {
            (" ", Style::default())
        };
        let prefix = format!("{} {}. ", marker, choice.label);
        let indent = " ".repeat(display_width(&prefix));
        let wrapped = wrap_text(&choice.text, width.saturating_sub(indent.len()).max(1));
        for (i, part) in wrapped.into_iter().enumerate() {
            let lead = if i == 0 { prefix.clone() } else { indent.clone() };
            lines.push(Line::from(vec![
                Span::styled(lead, style),
                Span::styled(part, style),
            ]));
        }
    }

    lines.push(Line::from(vec![
        Span::styled(ANSWER_LABEL, label_style),
        Span::raw(" "),
        Span::styled(
            answer_text(quiz).to_string(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    ]));

    labelled_lines(&mut lines, EXPLANATION_LABEL, &quiz.explanation, label_style, secondary, width);

    lines
}

fn labelled_lines(
    lines: &mut Vec<Line<'static>>,
    label: &'static str,
    text: &str,
    label_style: Style,
    text_style: Style,
    width: usize,
) {
    let first_width = width.saturating_sub(display_width(label) + 1).max(1);
    let mut wrapped = wrap_text(text, first_width).into_iter();
    let first = wrapped.next().unwrap_or_default();
    lines.push(Line::from(vec![
        Span::styled(label, label_style),
        Span::raw(" "),
        Span::styled(first, text_style),
    ]));
    for rest in wrapped {
        lines.push(Line::from(Span::styled(rest, text_style)));
    }
}

pub(crate) fn display_width(text: &str) -> usize {
    Span::raw(text).width()
}

/// Word-wraps `text` to `width` display columns, keeping explicit line
/// breaks and the spacing inside each line. Whitespace at a wrap point is
/// dropped; words wider than a line are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0;

        for token in whitespace_runs(paragraph) {
            let token_width = display_width(token);
            if current_width + token_width <= width {
                current.push_str(token);
                current_width += token_width;
                continue;
            }

            let is_space = token.starts_with(char::is_whitespace);
            if is_space && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
                continue;
            }

            if !current.is_empty() {
                let kept = current.trim_end().len();
                if kept > 0 {
                    current.truncate(kept);
                    lines.push(std::mem::take(&mut current));
                }
                current.clear();
                current_width = 0;
            }

            if token_width <= width {
                current.push_str(token);
                current_width = token_width;
            } else {
                for ch in token.chars() {
                    let mut buf = [0u8; 4];
                    let ch_width = display_width(ch.encode_utf8(&mut buf));
                    if current_width + ch_width > width && !current.is_empty() {
                        lines.push(std::mem::take(&mut current));
                        current_width = 0;
                    }
                    current.push(ch);
                    current_width += ch_width;
                }
            }
        }

        lines.push(current);
    }

    lines
}

/// Splits a line into alternating runs of whitespace and non-whitespace.
fn whitespace_runs(line: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut in_space = None;

    for (index, ch) in line.char_indices() {
        let space = ch.is_whitespace();
        if in_space.is_some_and(|prev| prev != space) {
            runs.push(&line[start..index]);
            start = index;
        }
        in_space = Some(space);
    }
    if start < line.len() {
        runs.push(&line[start..]);
    }
    runs
}
