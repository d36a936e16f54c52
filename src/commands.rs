use anyhow::{Context, Result, bail};
use std::io::{self, Write};
use std::path::Path;

use crate::api::QuizBackend;
use crate::config::Config;
use crate::health;
use crate::pipeline;
use crate::state::AppState;
use crate::ui::header::health_label;
use crate::ui::render::{to_plain_text, view_message};

/// Poll the health endpoint once and print the result.
/// Fails when the server is not healthy.
pub async fn check_health<B: QuizBackend>(backend: &B, out: &mut impl Write) -> Result<()> {
    let mut state = AppState::new();
    state.set_health(health::poll_once(backend).await);
    let (label, _) = health_label(&state);

    writeln!(out, "{}", label)?;
    if state.health().is_some_and(|h| h.is_healthy()) {
        Ok(())
    } else {
        bail!("server is not healthy")
    }
}

/// Send one message without the TUI and print the rendered reply.
pub async fn ask<B: QuizBackend>(backend: &B, text: &str, out: &mut impl Write) -> Result<()> {
    let mut state = AppState::new();
    state.set_input(text);

    if !pipeline::send_and_wait(&mut state, backend).await {
        bail!("nothing to send: message is empty");
    }

    let reply = state
        .conversation()
        .last()
        .context("no reply was recorded")?;
    writeln!(out, "{}", to_plain_text(&view_message(reply)))?;
    Ok(())
}

/// Write the default config file unless one already exists.
pub fn init_config(path: &Path) -> Result<()> {
    let mut stdout = io::stdout();
    if path.exists() {
        writeln!(stdout, "📄 Config already exists: {}", path.display())?;
        return Ok(());
    }

    Config::default().save(path)?;
    writeln!(stdout, "✨ Wrote default config to {}", path.display())?;
    Ok(())
}
