//! Application state shared by the UI loop, the send pipeline and the health
//! monitor. Background tasks never hold it; their results arrive as
//! [`AppEvent`]s and are applied here in arrival order.

use crate::api::ServerHealth;
use crate::conversation::ConversationStore;
use crate::error::ApiError;
use crate::events::{AppEvent, Message};

/// Display state of the backing service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthSignal {
    Unknown,
    Healthy,
    Error,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    conversation: ConversationStore,
    input: String,
    health: Option<ServerHealth>,
    loading: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversation(&self) -> &ConversationStore {
        &self.conversation
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn health(&self) -> Option<&ServerHealth> {
        self.health.as_ref()
    }

    pub fn health_signal(&self) -> HealthSignal {
        match &self.health {
            None => HealthSignal::Unknown,
            Some(h) if h.is_healthy() => HealthSignal::Healthy,
            Some(_) => HealthSignal::Error,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn append_message(&mut self, message: Message) {
        self.conversation.append(message);
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn set_health(&mut self, health: ServerHealth) {
        if self.health.as_ref().map(ServerHealth::is_healthy) != Some(health.is_healthy()) {
            tracing::info!(status = %health.status, "server health changed");
        }
        self.health = Some(health);
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Starts a send from the current input.
    ///
    /// Returns the text to put in the request, or `None` when the input is
    /// blank or a request is already outstanding. In that case nothing changes.
    pub fn begin_send(&mut self) -> Option<String> {
        if self.loading {
            return None;
        }
        let trimmed = self.input.trim();
        if trimmed.is_empty() {
            return None;
        }

        self.conversation.append(Message::user(trimmed));
        let payload = std::mem::take(&mut self.input);
        self.loading = true;
        Some(payload)
    }

    /// Settles the outstanding send with the assistant's reply or an error.
    pub fn finish_send(&mut self, outcome: Result<String, ApiError>) {
        let content = match outcome {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(error = %e, "generate request failed");
                e.user_message()
            }
        };
        self.conversation.append(Message::assistant(content));
        self.loading = false;
    }

    /// Appends a locally produced notice (help text and the like) as an
    /// assistant message without touching the loading flag.
    pub fn push_notice(&mut self, text: impl Into<String>) {
        self.conversation.append(Message::assistant(text));
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::HealthUpdated(health) => self.set_health(health),
            AppEvent::GenerateSettled(outcome) => self.finish_send(outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Role;

    #[test]
    fn begin_send_appends_trimmed_user_message() {
        let mut state = AppState::new();
        state.set_input("  2+2는?  \n");

        let payload = state.begin_send();

        assert_eq!(payload.as_deref(), Some("  2+2는?  \n"));
        assert_eq!(state.conversation().len(), 1);
        let message = &state.conversation().messages()[0];
        assert_eq!(message.role, Role::User);
        assert_eq!(message.content, "2+2는?");
        assert_eq!(state.input(), "");
        assert!(state.is_loading());
    }

    #[test]
    fn blank_input_is_a_noop() {
        for input in ["", "   ", "\n\t "] {
            let mut state = AppState::new();
            state.set_input(input);
            assert_eq!(state.begin_send(), None);
            assert!(state.conversation().is_empty());
            assert!(!state.is_loading());
            assert_eq!(state.input(), input);
        }
    }

    #[test]
    fn second_send_while_loading_is_a_noop() {
        let mut state = AppState::new();
        state.set_input("first");
        assert!(state.begin_send().is_some());

        state.set_input("second");
        assert_eq!(state.begin_send(), None);
        assert_eq!(state.conversation().len(), 1);
        assert_eq!(state.input(), "second");
    }

    #[test]
    fn finish_send_appends_reply_and_clears_loading() {
        let mut state = AppState::new();
        state.set_input("hi");
        state.begin_send();

        state.finish_send(Ok("hello".to_string()));

        assert!(!state.is_loading());
        let last = state.conversation().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, "hello");
    }

    #[test]
    fn failed_send_appends_error_and_clears_loading() {
        let mut state = AppState::new();
        state.set_input("hi");
        state.begin_send();

        state.apply(AppEvent::GenerateSettled(Err(ApiError::EmptyBody)));

        assert!(!state.is_loading());
        assert_eq!(state.conversation().len(), 2);
        let last = state.conversation().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, "오류가 발생했습니다: 생성된 텍스트가 없습니다.");
    }

    #[test]
    fn health_signal_follows_polls() {
        let mut state = AppState::new();
        assert_eq!(state.health_signal(), HealthSignal::Unknown);

        state.apply(AppEvent::HealthUpdated(ServerHealth {
            status: "healthy".to_string(),
            uptime: 600.0,
        }));
        assert_eq!(state.health_signal(), HealthSignal::Healthy);

        state.apply(AppEvent::HealthUpdated(ServerHealth::error()));
        assert_eq!(state.health_signal(), HealthSignal::Error);
        assert_eq!(state.health().map(|h| h.uptime), Some(0.0));
    }

    #[test]
    fn health_updates_do_not_touch_loading() {
        let mut state = AppState::new();
        state.set_input("q");
        state.begin_send();
        state.apply(AppEvent::HealthUpdated(ServerHealth::error()));
        assert!(state.is_loading());
    }
}
