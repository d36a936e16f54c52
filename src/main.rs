use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use quizchat::config::{self, Config};
use quizchat::{QuizClient, commands, logging, ui};

#[derive(Parser)]
#[command(name = "quizchat")]
#[command(version)]
#[command(about = "Chat with a quiz generation server from the terminal", long_about = None)]
struct Cli {
    /// Config file (default: ~/.quizchat/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Server base URL, overriding the config file
    #[arg(long, global = true, env = "QUIZCHAT_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server health once
    Health,
    /// Send one message and print the reply
    Ask {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Write a default config file
    Init,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "quizchat exited with error");
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match config::quizchat_home() {
        Ok(home) => {
            if let Err(e) = logging::init(&home) {
                eprintln!("⚠️  Logging disabled: {:#}", e);
            }
        }
        Err(e) => eprintln!("⚠️  Logging disabled: {:#}", e),
    }

    if let Some(Commands::Init) = cli.command {
        let path = match cli.config {
            Some(path) => path,
            None => config::default_config_path()?,
        };
        return commands::init_config(&path);
    }

    let mut config = Config::load(cli.config.as_deref())?;
    config.override_base_url(cli.base_url.as_deref());
    config.validate()?;

    let client = QuizClient::new(&config)?;
    let mut stdout = std::io::stdout();

    match cli.command {
        None => ui::run(config, client).await,
        Some(Commands::Health) => commands::check_health(&client, &mut stdout).await,
        Some(Commands::Ask { text }) => commands::ask(&client, &text.join(" "), &mut stdout).await,
        Some(Commands::Init) => Ok(()),
    }
}
