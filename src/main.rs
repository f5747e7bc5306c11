//! Termchat CLI
//!
//! Connects to the chat service, authenticates, then runs the chat session
//! in the terminal.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use termchat::auth::{AuthOutcome, Authenticator};
use termchat::session::SessionEnd;
use termchat::tui::{terminal, App, AuthScreen, ChatSession, ChatState, Renderer};
use termchat::{ChatConfig, FileCredentialStore};
use tokio::sync::Mutex;
use tracing::{error, info};

/// Termchat - real-time chat in the terminal
#[derive(Parser, Debug)]
#[command(name = "termchat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// WebSocket URL of the chat server
    #[arg(short, long)]
    server: Option<String>,

    /// Path to a config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the stored login credentials
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ChatConfig::load(cli.config.as_deref())?;
    if let Some(server) = cli.server {
        config = config.with_server_url(server);
    }
    if let Some(path) = cli.credentials {
        config = config.with_credentials_file(path);
    }

    termchat::logging::init(&config.log_file, cli.verbose)?;
    info!("Connecting to {}", config.server_url);

    let (mut sink, mut source) = termchat::transport::connect(&config.server_url).await?;

    terminal::install_panic_hook();
    let mut guard = terminal::TerminalGuard::new();
    let mut term = terminal::init()?;

    let store = FileCredentialStore::new(&config.credentials_file);
    let outcome = {
        let mut auth = Authenticator::new(store, AuthScreen::new(&mut term));
        auth.authenticate(&mut sink, &mut source).await
    };

    let identity = match outcome {
        AuthOutcome::Authenticated { identity, .. } => identity,
        AuthOutcome::Failed { reason } => {
            guard.restore()?;
            eprintln!("Authentication failed: {}", reason);
            return Ok(());
        }
    };

    term.clear()?;
    let renderer = Renderer::new(term, config.refresh_interval);
    let (width, height) = renderer.viewport()?;
    let state = Arc::new(Mutex::new(ChatState::new(config.history_size, width, height)));
    let session = ChatSession::new(identity, state, sink);
    let app = App::new(renderer, session, config.poll_interval);

    let result = app.run(source).await;
    guard.restore()?;

    match result {
        Ok(SessionEnd::Quit) => info!("Session ended by user"),
        Ok(SessionEnd::Closed(reason)) => {
            info!("Session closed: {}", reason);
            eprintln!("Disconnected: {}", reason);
        }
        Err(e) => {
            error!("Terminal error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
