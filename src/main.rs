// placard - terminal browser for posts and users from a JSON REST API.
// Wires configuration, logging, the query cache and the TUI together.

mod api;
mod app;
mod cache;
mod config;
mod error;
mod logging;
mod prefs;
mod queries;
mod state;
mod ui;

use std::io::{self, Stdout};

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::api::ApiClient;
use crate::app::App;
use crate::cache::QueryCache;
use crate::config::Config;
use crate::error::Result;
use crate::prefs::Preferences;

/// Puts the terminal back the way it was, even when the app bails out early.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("placard: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Config::from_env()?;
    logging::init(&config)?;
    tracing::info!(api = %config.api_base, data = %config.data_dir.display(), "starting");

    let prefs = Preferences::load(&config.data_dir)?;
    let client = ApiClient::from_config(&config)?;
    let cache = QueryCache::new(client, config.retry.clone());

    let runtime = tokio::runtime::Runtime::new()?;
    let mut app = App::new(&config, cache, prefs, runtime.handle().clone());

    let _guard = TerminalGuard::enter()?;
    let mut terminal: Terminal<CrosstermBackend<Stdout>> =
        Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;
    app.run(&mut terminal)?;

    Ok(())
}
