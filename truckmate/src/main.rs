//! TruckMate - truck damage assessment client
//!
//! Terminal UI for the repair shop: damage assessment uploads, the repair
//! recommendation chat, account management and the admin dashboard.

mod app;
mod input;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use truckmate_core::api::create_backend;
use truckmate_core::logging::{self, LogTarget};
use truckmate_core::session::{SessionContext, TokenStore};
use truckmate_core::Config;

use crate::app::App;

fn main() -> Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    // Log to file; stdout belongs to the TUI
    let _log_guard = logging::init(&config.logging, LogTarget::Tui)
        .context("failed to initialize logging")?;

    tracing::info!(base_url = %config.api.base_url, "truckmate TUI starting up");

    let backend = create_backend(&config.api).context("failed to create API client")?;
    let session = SessionContext::new(TokenStore::new(config.token_path()));
    let mut app = App::new(backend, session, Config::assessments_dir());

    // Setup terminal
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;

    tracing::info!("truckmate TUI shutting down");

    result
}

/// Run the main application loop.
///
/// A queued backend call runs on the tick after it was queued, so the
/// frame showing its loading label is on screen while the call blocks.
fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if app.has_pending() {
            app.run_pending();
        } else if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
