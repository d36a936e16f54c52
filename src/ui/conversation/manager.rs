use crate::api::QuizBackend;
use crate::config::Config;
use crate::events::AppEvent;
use crate::pipeline;
use crate::state::AppState;
use crate::ui::conversation::composer::{ComposerResult, ComposerView};
use crate::ui::conversation::history::HistoryView;
use crate::ui::conversation::{
    ConversationComposer, ConversationHistory, LoadingIndicator, SlashCommand, get_help_text,
};
use crate::ui::header::Header;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};
use tokio::sync::mpsc;

/// Actions that can be requested by the conversation manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationAction {
    None,
    /// Ask the health monitor for an immediate poll
    PollHealth,
    Exit,
}

/// Owns the application state and the UI components around it
pub struct ConversationManager<B: QuizBackend> {
    state: AppState,
    history: ConversationHistory,
    composer: ConversationComposer,
    loading: LoadingIndicator,
    backend: B,
    events: mpsc::UnboundedSender<AppEvent>,
    show_timestamps: bool,
}

impl<B: QuizBackend> ConversationManager<B> {
    pub fn new(config: &Config, backend: B, events: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            state: AppState::new(),
            history: ConversationHistory::new(),
            composer: ConversationComposer::new(),
            loading: LoadingIndicator::new(),
            backend,
            events,
            show_timestamps: config.ui.show_timestamps,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Apply an event from a background task
    pub fn apply_event(&mut self, event: AppEvent) {
        track_new_messages(&mut self.state, &mut self.history, |state| state.apply(event));
    }

    /// Advance animations
    pub fn on_tick(&mut self) {
        if self.state.is_loading() {
            self.loading.tick();
        }
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ConversationAction {
        if key.kind != KeyEventKind::Press {
            return ConversationAction::None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('d'))
        {
            return ConversationAction::Exit;
        }

        match key.code {
            KeyCode::PageUp => {
                self.history.scroll_up();
                return ConversationAction::None;
            }
            KeyCode::PageDown => {
                self.history.scroll_down();
                return ConversationAction::None;
            }
            _ => {}
        }

        match self.composer.handle_key(key, &mut self.state) {
            ComposerResult::Submit => {
                self.submit();
                ConversationAction::None
            }
            ComposerResult::Command(command) => self.handle_slash_command(command),
            ComposerResult::None => ConversationAction::None,
        }
    }

    fn submit(&mut self) {
        let (backend, events) = (&self.backend, &self.events);
        track_new_messages(&mut self.state, &mut self.history, |state| {
            if pipeline::dispatch(state, backend, events).is_none() {
                tracing::debug!("send ignored: blank input or request in flight");
            }
        });
    }

    /// Handle slash commands
    fn handle_slash_command(&mut self, command: SlashCommand) -> ConversationAction {
        tracing::debug!(command = command.command(), "slash command");
        match command {
            SlashCommand::Help => {
                track_new_messages(&mut self.state, &mut self.history, |state| {
                    state.push_notice(get_help_text())
                });
                ConversationAction::None
            }
            SlashCommand::Health => ConversationAction::PollHealth,
            SlashCommand::Quit => ConversationAction::Exit,
        }
    }

    /// Render the conversation UI components
    pub fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),                                // Header
                Constraint::Min(3),                                   // History
                Constraint::Length(1),                                // Loading indicator
                Constraint::Length(self.composer.height(&self.state)), // Composer
            ])
            .split(frame.size());

        frame.render_widget(Header { state: &self.state }, chunks[0]);
        frame.render_widget(
            HistoryView {
                history: &self.history,
                state: &self.state,
                show_timestamps: self.show_timestamps,
            },
            chunks[1],
        );
        frame.render_widget(self.loading.view(self.state.is_loading()), chunks[2]);
        frame.render_widget(
            ComposerView {
                composer: &self.composer,
                state: &self.state,
            },
            chunks[3],
        );
    }
}

/// Runs a state transition and jumps to the newest message if it appended one
fn track_new_messages(
    state: &mut AppState,
    history: &mut ConversationHistory,
    f: impl FnOnce(&mut AppState),
) {
    let before = state.conversation().len();
    f(state);
    if state.conversation().len() != before {
        history.scroll_to_bottom();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ServerHealth;
    use crate::error::ApiError;
    use crate::events::Role;
    use ratatui::{Terminal, backend::TestBackend};
    use serde_json::{Value, json};
    use std::future::Future;

    #[derive(Clone)]
    struct EchoBackend;

    impl QuizBackend for EchoBackend {
        fn health(&self) -> impl Future<Output = Result<ServerHealth, ApiError>> + Send {
            async {
                Ok(ServerHealth {
                    status: "healthy".to_string(),
                    uptime: 60.0,
                })
            }
        }

        fn generate(&self, text: &str) -> impl Future<Output = Result<Value, ApiError>> + Send {
            let reply = json!({ "echo": text });
            async move { Ok(reply) }
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn manager() -> (ConversationManager<EchoBackend>, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ConversationManager::new(&Config::default(), EchoBackend, tx), rx)
    }

    fn type_text(manager: &mut ConversationManager<EchoBackend>, text: &str) {
        for c in text.chars() {
            manager.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[tokio::test]
    async fn enter_sends_and_reply_arrives_as_event() {
        let (mut manager, mut rx) = manager();
        type_text(&mut manager, "hi");

        assert_eq!(manager.handle_key(key(KeyCode::Enter)), ConversationAction::None);
        assert!(manager.state().is_loading());
        assert_eq!(manager.state().input(), "");

        let event = rx.recv().await.unwrap();
        manager.apply_event(event);

        let messages = manager.state().conversation().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "hi");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, r#"{"echo":"hi"}"#);
        assert!(!manager.state().is_loading());
    }

    #[tokio::test]
    async fn help_command_is_local() {
        let (mut manager, mut rx) = manager();
        type_text(&mut manager, "/help");
        manager.handle_key(key(KeyCode::Esc));

        assert_eq!(manager.handle_key(key(KeyCode::Enter)), ConversationAction::None);
        assert!(!manager.state().is_loading());
        let last = manager.state().conversation().last().unwrap();
        assert!(last.content.contains("/quit"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn exit_and_health_actions() {
        let (mut manager, _rx) = manager();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(manager.handle_key(ctrl_c), ConversationAction::Exit);

        type_text(&mut manager, "/health");
        manager.handle_key(key(KeyCode::Esc));
        assert_eq!(manager.handle_key(key(KeyCode::Enter)), ConversationAction::PollHealth);
    }

    #[tokio::test]
    async fn draws_header_history_and_loading_line() {
        let (mut manager, _rx) = manager();
        manager.apply_event(AppEvent::HealthUpdated(ServerHealth {
            status: "healthy".to_string(),
            uptime: 120.0,
        }));
        type_text(&mut manager, "question");
        manager.handle_key(key(KeyCode::Enter));

        let mut terminal = Terminal::new(TestBackend::new(60, 16)).unwrap();
        terminal.draw(|frame| manager.draw(frame)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let screen: String = (0..16)
            .flat_map(|y| (0..60).map(move |x| (x, y)))
            .map(|(x, y)| buffer.get(x, y).symbol().to_string())
            .collect();

        assert!(screen.contains("question"));
        assert!(screen.contains("(2"));
    }
}
