//! Pet TUI Entry Point
//!
//! Usage:
//!   pet-tui [--config FILE] [--seed N]
//!
//! Reads `~/.config/desktop-pet/pet.toml` (or `--config` / `PET_CONFIG`) and
//! `PET_*` environment overrides. Logging goes to stderr only when `RUST_LOG`
//! is set.

use std::io;
use std::panic;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pet_core::ConfigOverrides;
use pet_tui::App;

/// Desktop pet in your terminal
#[derive(Parser, Debug)]
#[command(name = "pet-tui")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "PET_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for the decision rolls
    #[arg(short = 's', long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(io::stderr))
            .with(tracing_subscriber::EnvFilter::from_default_env())
            .init();
    }

    use std::io::IsTerminal;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: pet-tui requires a terminal (TTY)");
        eprintln!("Try `pet-sim` for a headless run.");
        std::process::exit(1);
    }

    let path = args.config.or_else(pet_core::default_config_path);
    let mut config =
        pet_core::load_config_from_path(path).context("Failed to load pet configuration")?;
    if let Some(seed) = args.seed {
        ConfigOverrides::new().with_seed(seed).apply(&mut config);
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: pet_core::PetConfig,
) -> anyhow::Result<()> {
    let mut app = App::new(config)?;
    let result = app.run(terminal).await;
    app.shutdown().await?;
    result
}
