use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::{QuizBackend, body_to_content};
use crate::error::ApiError;
use crate::events::AppEvent;
use crate::state::AppState;

/// Runs one generate request and converts the body into message content.
///
/// The request runs in its own task so a panic inside it settles as
/// [`ApiError::Aborted`] instead of leaving the send outstanding.
pub async fn request_reply<B: QuizBackend>(backend: B, text: String) -> Result<String, ApiError> {
    let request = tokio::spawn(async move { backend.generate(&text).await });
    match request.await {
        Ok(result) => body_to_content(result?),
        Err(e) => {
            tracing::error!(error = %e, "generate task did not complete");
            Err(ApiError::Aborted)
        }
    }
}

/// Starts a send from the state's input. The reply is delivered as
/// [`AppEvent::GenerateSettled`] on `events`.
///
/// Returns `None` without side effects when [`AppState::begin_send`] refuses.
pub fn dispatch<B: QuizBackend>(
    state: &mut AppState,
    backend: &B,
    events: &mpsc::UnboundedSender<AppEvent>,
) -> Option<JoinHandle<()>> {
    let text = state.begin_send()?;
    let backend = backend.clone();
    let events = events.clone();

    Some(tokio::spawn(async move {
        let outcome = request_reply(backend, text).await;
        if events.send(AppEvent::GenerateSettled(outcome)).is_err() {
            tracing::debug!("event loop gone; dropping generate result");
        }
    }))
}

/// Sends the state's input and waits for the reply in place. Returns `false`
/// if nothing was sent.
pub async fn send_and_wait<B: QuizBackend>(state: &mut AppState, backend: &B) -> bool {
    let Some(text) = state.begin_send() else {
        return false;
    };
    let outcome = request_reply(backend.clone(), text).await;
    state.finish_send(outcome);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ServerHealth;
    use crate::events::Role;
    use serde_json::{Value, json};
    use std::future::Future;
    use std::sync::{Arc, Mutex};

    /// Records requests and answers each with a fixed body
    #[derive(Clone)]
    struct FakeBackend {
        reply: Arc<dyn Fn() -> Result<Value, ApiError> + Send + Sync>,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl FakeBackend {
        fn replying(reply: impl Fn() -> Result<Value, ApiError> + Send + Sync + 'static) -> Self {
            Self {
                reply: Arc::new(reply),
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl QuizBackend for FakeBackend {
        fn health(&self) -> impl Future<Output = Result<ServerHealth, ApiError>> + Send {
            async { Ok(ServerHealth::error()) }
        }

        fn generate(&self, text: &str) -> impl Future<Output = Result<Value, ApiError>> + Send {
            self.requests.lock().unwrap().push(text.to_string());
            let result = (self.reply)();
            async move { result }
        }
    }

    #[tokio::test]
    async fn successful_send_appends_user_then_assistant() {
        let backend = FakeBackend::replying(|| {
            Ok(json!({
                "question": "2+2=?", "passage": "", "options": "3//4//5",
                "answer": 2, "explanation": "기본 연산"
            }))
        });
        let mut state = AppState::new();
        state.set_input("2+2는?");

        assert!(send_and_wait(&mut state, &backend).await);

        let messages = state.conversation().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "2+2는?");
        assert_eq!(messages[1].role, Role::Assistant);
        assert!(crate::quiz::try_parse_structured(&messages[1].content).is_some());
        assert!(!state.is_loading());
        assert_eq!(*backend.requests.lock().unwrap(), vec!["2+2는?".to_string()]);
    }

    #[tokio::test]
    async fn failed_send_appends_error_message() {
        let backend = FakeBackend::replying(|| {
            Err(ApiError::Status {
                status: 500,
                body: "boom".to_string(),
            })
        });
        let mut state = AppState::new();
        state.set_input("hello");

        send_and_wait(&mut state, &backend).await;

        let last = state.conversation().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert!(last.content.starts_with("오류가 발생했습니다: "));
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn null_body_is_reported_as_empty() {
        let backend = FakeBackend::replying(|| Ok(Value::Null));
        let mut state = AppState::new();
        state.set_input("hello");

        send_and_wait(&mut state, &backend).await;

        assert_eq!(
            state.conversation().last().unwrap().content,
            "오류가 발생했습니다: 생성된 텍스트가 없습니다."
        );
    }

    #[tokio::test]
    async fn blank_input_sends_nothing() {
        let backend = FakeBackend::replying(|| Ok(json!("unused")));
        let mut state = AppState::new();
        state.set_input("   ");

        assert!(!send_and_wait(&mut state, &backend).await);
        assert!(state.conversation().is_empty());
        assert!(backend.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn dispatch_keeps_loading_until_event_is_applied() {
        let backend = FakeBackend::replying(|| Ok(json!("plain reply")));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut state = AppState::new();
        state.set_input("hi");

        let handle = dispatch(&mut state, &backend, &tx).expect("send dispatched");
        assert!(state.is_loading());
        assert_eq!(state.conversation().len(), 1);

        state.set_input("again");
        assert!(dispatch(&mut state, &backend, &tx).is_none());

        handle.await.unwrap();
        let event = rx.recv().await.unwrap();
        assert!(state.is_loading());
        state.apply(event);

        assert!(!state.is_loading());
        assert_eq!(state.conversation().last().unwrap().content, "plain reply");
        assert_eq!(backend.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn panicking_request_settles_as_aborted() {
        let backend = FakeBackend::replying(|| panic!("backend exploded"));
        let outcome = request_reply(backend, "x".to_string()).await;
        assert!(matches!(outcome, Err(ApiError::Aborted)));
    }
}
