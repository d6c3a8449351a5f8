//! PairDesk — terminal dashboard for the forex trading backend.
//!
//! Sections:
//! 1. Metric cards — total P&L, trades, win rate, volume
//! 2. Performance — cumulative P&L line over daily bars
//! 3. Symbols — per-pair breakdown; drill into currency analysis and strategy
//! 4. Recent trades — filterable table; drill into trade analysis

use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, DisableFocusChange, EnableFocusChange, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{error, info};

use pairdesk_core::{DeskConfig, HttpBackend, TradingBackend};
use pairdesk_tui::{app::App, input, logging, ui, worker};

#[derive(Parser)]
#[command(
    name = "pairdesk",
    about = "PairDesk — terminal dashboard for the forex trading backend"
)]
struct Cli {
    /// Path to the TOML config file. Defaults to <config dir>/pairdesk/config.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the config file.
    #[arg(long)]
    backend_url: Option<String>,

    /// Log level or filter directive, overriding the config file.
    #[arg(long)]
    log_level: Option<String>,
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pairdesk")
        .join("config.toml")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let mut config = DeskConfig::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    if let Some(url) = cli.backend_url {
        config.backend.base_url = url;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    let (_log_guard, log_dir) = logging::init(&config.logging)?;
    info!(
        config = %config_path.display(),
        backend = %config.backend.base_url,
        workers = config.backend.workers,
        "pairdesk starting"
    );

    let backend: Arc<dyn TradingBackend> =
        Arc::new(HttpBackend::new(&config.backend).context("configuring backend client")?);

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), DisableFocusChange, LeaveAlternateScreen);
        default_hook(info);
    }));

    // Worker channels
    let (job_tx, job_rx) = mpsc::channel();
    let (outcome_tx, outcome_rx) = mpsc::channel();
    let workers = worker::spawn_workers(config.backend.workers, backend, job_rx, outcome_tx)
        .context("spawning worker threads")?;

    let now = Instant::now();
    let mut app = App::new(&config, job_tx, outcome_rx, now);
    app.start(now);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the main event loop
    let result = run_app(&mut terminal, &mut app);
    if let Err(e) = &result {
        error!(error = %e, "event loop failed");
    }

    // Shutdown workers
    app.shutdown();
    for handle in workers {
        let _ = handle.join();
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    info!("pairdesk stopped");
    println!("Logs: {}", logging::log_file_hint(&log_dir));
    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        let now = Instant::now();

        // 1. Advance timers and animations
        app.tick(now);

        // 2. Render
        terminal.draw(|f| ui::draw(f, app, now))?;

        // 3. Drain worker outcomes (non-blocking)
        app.drain_outcomes(Instant::now());

        // 4. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => input::handle_key(app, key, Instant::now()),
                Event::FocusGained => app.set_terminal_focus(true, Instant::now()),
                Event::FocusLost => app.set_terminal_focus(false, Instant::now()),
                _ => {}
            }
        }

        // 5. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}
