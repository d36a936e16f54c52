//! Terminal chat client for a quiz generation service.
//!
//! Text typed by the user is posted to `/generate`; replies that look like a
//! quiz (question, passage, options, answer, explanation) are laid out as one,
//! anything else is shown as plain text. `/health` is polled in the background.

pub mod api;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod error;
pub mod events;
pub mod health;
pub mod logging;
pub mod pipeline;
pub mod quiz;
pub mod state;
pub mod ui;

pub use api::{QuizBackend, QuizClient, ServerHealth};
pub use config::Config;
pub use error::ApiError;
pub use events::{AppEvent, Message, Role};
pub use quiz::{GenerateResponse, try_parse_structured};
pub use state::{AppState, HealthSignal};
