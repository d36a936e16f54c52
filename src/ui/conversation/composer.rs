use crate::state::AppState;
use crate::ui::conversation::commands::{
    CommandEntry, SlashCommand, command_entries, parse_slash_command,
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

pub const PLACEHOLDER: &str = "메시지를 입력하세요...";
const LOADING_PLACEHOLDER: &str = "응답을 기다리는 중입니다...";

/// Most input lines shown before the composer stops growing
pub const MAX_VISIBLE_ROWS: usize = 3;

/// Result returned when the user interacts with the conversation composer
#[derive(Debug, PartialEq)]
pub enum ComposerResult {
    /// Enter pressed on ordinary text; the caller starts the send
    Submit,
    Command(SlashCommand),
    None,
}

/// Input box editing [`AppState`]'s input. The text itself lives in the
/// state; the composer only tracks the cursor and the command palette.
pub struct ConversationComposer {
    /// Cursor position in chars, not bytes
    cursor: usize,
    command_entries: Vec<CommandEntry>,
    filtered_commands: Vec<CommandEntry>,
    show_command_palette: bool,
    selected_command: Option<usize>,
}

impl Default for ConversationComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationComposer {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            command_entries: command_entries(),
            filtered_commands: Vec::new(),
            show_command_palette: false,
            selected_command: None,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_palette_open(&self) -> bool {
        self.show_command_palette
    }

    /// Handle key input. Editing keys are ignored while a request is in flight.
    pub fn handle_key(&mut self, key: KeyEvent, state: &mut AppState) -> ComposerResult {
        if key.kind != KeyEventKind::Press || state.is_loading() {
            return ComposerResult::None;
        }

        let mut content = state.input().to_string();
        self.cursor = self.cursor.min(content.chars().count());

        match key.code {
            KeyCode::Enter => {
                if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) {
                    self.insert_char(&mut content, '\n');
                } else if self.show_command_palette
                    && !self.is_selected_command(&content)
                    && self.apply_selected_command(&mut content)
                {
                    // completed the command, keep editing
                } else if let Some(command) = parse_slash_command(&content) {
                    self.close_command_palette();
                    self.cursor = 0;
                    state.set_input(String::new());
                    return ComposerResult::Command(command);
                } else {
                    self.close_command_palette();
                    self.cursor = 0;
                    return ComposerResult::Submit;
                }
            }
            KeyCode::Up if self.show_command_palette => self.move_command_selection(-1),
            KeyCode::Down if self.show_command_palette => self.move_command_selection(1),
            KeyCode::Esc if self.show_command_palette => self.close_command_palette(),
            KeyCode::Tab if self.show_command_palette => {
                self.apply_selected_command(&mut content);
            }
            KeyCode::Char(c) => {
                self.insert_char(&mut content, c);
                self.sync_command_palette(&content);
            }
            KeyCode::Backspace => {
                if self.backspace(&mut content) {
                    self.sync_command_palette(&content);
                }
            }
            KeyCode::Delete => {
                if self.delete(&mut content) {
                    self.sync_command_palette(&content);
                }
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(content.chars().count()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = content.chars().count(),
            _ => {}
        }

        state.set_input(content);
        ComposerResult::None
    }

    /// Byte offset of a char position
    fn byte_index(content: &str, position: usize) -> usize {
        content
            .char_indices()
            .nth(position)
            .map(|(i, _)| i)
            .unwrap_or(content.len())
    }

    /// Insert a character at the cursor position
    fn insert_char(&mut self, content: &mut String, c: char) {
        let at = Self::byte_index(content, self.cursor);
        content.insert(at, c);
        self.cursor += 1;
    }

    /// Delete character before cursor
    fn backspace(&mut self, content: &mut String) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = Self::byte_index(content, self.cursor);
        content.remove(at);
        true
    }

    /// Delete character at cursor
    fn delete(&mut self, content: &mut String) -> bool {
        if self.cursor >= content.chars().count() {
            return false;
        }
        let at = Self::byte_index(content, self.cursor);
        content.remove(at);
        true
    }

    fn sync_command_palette(&mut self, content: &str) {
        let is_command_word = content.starts_with('/') && !content.contains(char::is_whitespace);
        if !is_command_word {
            self.close_command_palette();
            return;
        }
        if !self.show_command_palette {
            self.show_command_palette = true;
            self.selected_command = Some(0);
        }
        self.refresh_command_palette(content);
    }

    fn close_command_palette(&mut self) {
        self.show_command_palette = false;
        self.filtered_commands.clear();
        self.selected_command = None;
    }

    fn refresh_command_palette(&mut self, content: &str) {
        let query = content.trim_start_matches('/').to_lowercase();
        self.filtered_commands = self
            .command_entries
            .iter()
            .filter(|entry| query.is_empty() || entry.keyword.starts_with(&query))
            .copied()
            .collect();

        if self.filtered_commands.is_empty() {
            self.selected_command = None;
        } else {
            let index = self.selected_command.unwrap_or(0);
            self.selected_command = Some(index.min(self.filtered_commands.len() - 1));
        }
    }

    fn move_command_selection(&mut self, delta: isize) {
        if self.filtered_commands.is_empty() {
            self.selected_command = None;
            return;
        }

        let len = self.filtered_commands.len() as isize;
        let current = self.selected_command.unwrap_or(0) as isize;
        self.selected_command = Some((current + delta).rem_euclid(len) as usize);
    }

    /// True when `content` already spells out the highlighted palette entry.
    fn is_selected_command(&self, content: &str) -> bool {
        self.selected_command
            .and_then(|index| self.filtered_commands.get(index))
            .is_some_and(|entry| content.strip_prefix('/') == Some(entry.keyword))
    }

    fn apply_selected_command(&mut self, content: &mut String) -> bool {
        let Some(entry) = self
            .selected_command
            .and_then(|index| self.filtered_commands.get(index))
            .copied()
        else {
            return false;
        };

        *content = format!("/{}", entry.keyword);
        self.cursor = content.chars().count();
        self.close_command_palette();
        true
    }

    /// Rows needed for the current input, including borders
    pub fn height(&self, state: &AppState) -> u16 {
        let rows = state.input().split('\n').count().clamp(1, MAX_VISIBLE_ROWS);
        rows as u16 + 2
    }
}

/// Borrowed view of the composer for rendering
pub struct ComposerView<'a> {
    pub composer: &'a ConversationComposer,
    pub state: &'a AppState,
}

impl Widget for ComposerView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let loading = self.state.is_loading();
        let block = Block::default()
            .borders(Borders::ALL)
            .title("✏️ 입력")
            .style(if loading {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Green)
            });

        let inner_area = block.inner(area);
        block.render(area, buf);

        let content = self.state.input();
        if content.is_empty() || loading {
            let placeholder = if loading { LOADING_PLACEHOLDER } else { PLACEHOLDER };
            let placeholder_line = Line::from(vec![Span::styled(
                placeholder,
                Style::default().fg(Color::DarkGray),
            )]);
            buf.set_line(inner_area.x, inner_area.y, &placeholder_line, inner_area.width);
        } else {
            let mut shown = content.to_string();
            let at = ConversationComposer::byte_index(&shown, self.composer.cursor);
            shown.insert(at, '▌');

            let rows: Vec<&str> = shown.split('\n').collect();
            let skip = rows.len().saturating_sub(inner_area.height as usize);
            for (i, line_text) in rows.iter().skip(skip).enumerate() {
                let line = Line::from(vec![Span::styled(*line_text, Style::default().fg(Color::White))]);
                buf.set_line(inner_area.x, inner_area.y + i as u16, &line, inner_area.width);
            }
        }

        if self.composer.show_command_palette && !self.composer.filtered_commands.is_empty() {
            let filtered = &self.composer.filtered_commands;
            let palette_height = (filtered.len().min(5) + 2) as u16;
            let palette_area = Rect {
                x: area.x,
                y: area.y.saturating_sub(palette_height),
                width: area.width,
                height: palette_height.min(area.y),
            };
            if palette_area.height < 3 {
                return;
            }

            Clear.render(palette_area, buf);
            let block = Block::default()
                .borders(Borders::ALL)
                .title("Commands")
                .style(Style::default().fg(Color::Blue));
            let inner = block.inner(palette_area);
            block.render(palette_area, buf);

            for (index, entry) in filtered.iter().enumerate() {
                if index >= inner.height as usize {
                    break;
                }

                let style = if self.composer.selected_command == Some(index) {
                    Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };

                let line = Line::from(vec![
                    Span::styled(format!("/{}", entry.keyword), style),
                    Span::styled(" — ", Style::default().fg(Color::DarkGray)),
                    Span::styled(entry.description, Style::default().fg(Color::Gray)),
                ]);

                buf.set_line(inner.x, inner.y + index as u16, &line, inner.width);
            }
        }
    }
}
