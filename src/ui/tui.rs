use std::io::{self, Stdout};

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;

use crate::api::QuizBackend;
use crate::config::Config;
use crate::health::HealthMonitor;
use crate::ui::conversation::{ConversationAction, ConversationManager};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Run the chat interface until the user exits
pub async fn run<B: QuizBackend>(config: Config, backend: B) -> Result<()> {
    let mut terminal = setup_terminal()?;
    install_panic_hook();

    let result = event_loop(&mut terminal, config, backend).await;

    restore_terminal(&mut terminal)?;
    result
}

async fn event_loop<B: QuizBackend>(terminal: &mut Tui, config: Config, backend: B) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let monitor = HealthMonitor::spawn(backend.clone(), config.health_interval(), tx.clone());
    let mut manager = ConversationManager::new(&config, backend, tx);

    let mut terminal_events = EventStream::new();
    let mut ticker = tokio::time::interval(config.tick_rate());

    tracing::info!(base_url = %config.base_url, "chat session started");

    loop {
        terminal
            .draw(|frame| manager.draw(frame))
            .context("Failed to draw terminal")?;

        tokio::select! {
            maybe_event = terminal_events.next() => {
                let Some(event) = maybe_event else { break };
                if let Event::Key(key) = event.context("Failed to read terminal event")? {
                    match manager.handle_key(key) {
                        ConversationAction::Exit => break,
                        ConversationAction::PollHealth => monitor.poll_now(),
                        ConversationAction::None => {}
                    }
                }
            }
            Some(app_event) = rx.recv() => manager.apply_event(app_event),
            _ = ticker.tick() => manager.on_tick(),
        }
    }

    monitor.shutdown();
    tracing::info!(
        messages = manager.state().conversation().len(),
        "chat session ended"
    );
    Ok(())
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Leave the alternate screen before the default hook prints a panic of the
/// UI thread. Panics in runtime workers are caught by tokio and settle the
/// request instead.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if std::thread::current().name() == Some("main") {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
        default_hook(info);
    }));
}
