//! `TermTodo`, a terminal-native to-do list client.
//!
//! Launches the TUI against either a hosted task service or a built-in
//! single-user store. Configuration via CLI flags, environment variables,
//! or config file (`~/.config/termtodo/config.toml`).
//!
//! ```bash
//! # Local single-user mode
//! cargo run --bin termtodo
//!
//! # Hosted multi-user mode (sign-in required)
//! cargo run --bin termtodo -- --server-url http://127.0.0.1:9100 \
//!     --api-key dev-key
//!
//! # Or via environment variables
//! TERMTODO_SERVER_URL=http://127.0.0.1:9100 cargo run --bin termtodo
//! ```

use std::io;
use std::path::Path;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use termtodo::app::App;
use termtodo::config::{CliArgs, ClientConfig};
use termtodo::remote::{BackendKind, HttpRemote, MemoryRemote};
use termtodo::sync::{self, SyncCommand, SyncEvent};
use termtodo::ui;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > config file > defaults).
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    // Initialize logging before terminal setup (logs go to file, not stdout).
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!("termtodo starting");

    // Pick the backend before touching the terminal so errors still print.
    let (cmd_tx, evt_rx, backend) = match config.to_server_config() {
        Some(server) => {
            let remote = HttpRemote::new(&server.url, server.api_key, server.request_timeout)
                .map_err(|e| io::Error::other(format!("invalid server configuration: {e}")))?;
            tracing::info!(url = %server.url, "hosted mode");
            let (tx, rx) = sync::spawn_sync(remote, config.channel_capacity);
            (tx, rx, BackendKind::Hosted)
        }
        None => {
            tracing::info!("local mode");
            let (tx, rx) = sync::spawn_sync(MemoryRemote::new(), config.channel_capacity);
            (tx, rx, BackendKind::Local)
        }
    };

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    // Run the app.
    let result = run_app(&mut terminal, &config, backend, &cmd_tx, evt_rx).await;

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("termtodo exiting");
    result
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, since ratatui owns the
/// terminal). Returns a [`WorkerGuard`] that must be held until shutdown to
/// ensure all buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("termtodo.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop.
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &ClientConfig,
    backend: BackendKind,
    cmd_tx: &mpsc::Sender<SyncCommand>,
    mut evt_rx: mpsc::Receiver<SyncEvent>,
) -> io::Result<()> {
    let mut app = App::new(
        backend,
        config.max_task_text_len,
        config.timestamp_format.clone(),
    );

    // The hosted variant loads after sign-in; the local one can ask now.
    if backend == BackendKind::Local {
        dispatch(&mut app, cmd_tx, SyncCommand::Load);
    }

    loop {
        // Step 1: Draw the UI frame.
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Step 2: Drain all pending SyncEvents (non-blocking).
        drain_sync_events(&mut app, cmd_tx, &mut evt_rx);

        // Step 3: Advance the spinner.
        app.tick();

        // Step 4: Poll for terminal input events.
        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            // handle_key_event returns Some(SyncCommand) when the key maps
            // to a remote operation (add, toggle, delete, sign-in, ...).
            if let Some(cmd) = app.handle_key_event(key) {
                dispatch(&mut app, cmd_tx, cmd);
            }
        }

        if app.should_quit {
            // Tell the background task to stop; it sends no reply.
            let _ = cmd_tx.try_send(SyncCommand::Shutdown);
            return Ok(());
        }
    }
}

/// Drain all pending `SyncEvent`s and apply them, dispatching any follow-up
/// command an event produces (sign-in chains into the initial load).
fn drain_sync_events(
    app: &mut App,
    cmd_tx: &mpsc::Sender<SyncCommand>,
    evt_rx: &mut mpsc::Receiver<SyncEvent>,
) {
    while let Ok(event) = evt_rx.try_recv() {
        if let Some(follow_up) = app.apply_event(event) {
            dispatch(app, cmd_tx, follow_up);
        }
    }
}

/// Hand a command to the background task and count it as in flight.
fn dispatch(app: &mut App, cmd_tx: &mpsc::Sender<SyncCommand>, cmd: SyncCommand) {
    match cmd_tx.try_send(cmd) {
        Ok(()) => app.command_sent(),
        Err(mpsc::error::TrySendError::Full(cmd)) => {
            tracing::warn!(?cmd, "command channel full, dropping");
            app.banner = Some("too many operations in flight; try again".to_string());
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            app.banner = Some("background task stopped; restart the app".to_string());
        }
    }
}
