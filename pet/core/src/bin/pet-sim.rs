//! Pet Simulator
//!
//! Runs a pet session headless against a host that only logs. Handy for
//! eyeballing the motion machine and for smoke-testing configuration.
//!
//! # Usage
//!
//! ```bash
//! # 200 ticks on a 1080x2340 display
//! pet-sim
//!
//! # Reproducible run with per-tick logging
//! RUST_LOG=pet_core=trace pet-sim --seed 7 --ticks 500
//!
//! # Grab the pet, lift it 400px and let go
//! pet-sim --drag
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::Instant;
use tracing::info;

use pet_core::{
    load_config_from_path, ConfigOverrides, DisplayMetrics, Facing, OverlayHost, PetSession,
    PointerEvent, Position, Renderer, SessionHandle, SurfaceError,
};

/// Pet Simulator - headless desktop pet session
#[derive(Parser, Debug)]
#[command(name = "pet-sim")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of motion ticks to run for
    #[arg(short = 't', long, default_value_t = 200)]
    ticks: u32,

    /// Seed for the decision rolls
    #[arg(short = 's', long, env = "PET_SEED")]
    seed: Option<u64>,

    /// Display width in pixels
    #[arg(long, default_value_t = 1080)]
    width: i32,

    /// Display height in pixels
    #[arg(long, default_value_t = 2340)]
    height: i32,

    /// Tick interval override in milliseconds
    #[arg(long, value_name = "MS")]
    tick_ms: Option<u64>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "PET_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Play a scripted drag-and-release before the run
    #[arg(short = 'd', long)]
    drag: bool,
}

/// Overlay host that logs every call
struct LoggingHost {
    metrics: DisplayMetrics,
    moves: u64,
    last: Option<Position>,
}

impl OverlayHost for LoggingHost {
    fn display_metrics(&self) -> DisplayMetrics {
        self.metrics
    }

    fn attach(&mut self) -> Result<(), SurfaceError> {
        info!(
            width = self.metrics.width_px,
            height = self.metrics.height_px,
            "attach"
        );
        Ok(())
    }

    fn move_to(&mut self, position: Position) -> Result<(), SurfaceError> {
        self.moves += 1;
        self.last = Some(position);
        tracing::debug!(%position, "move");
        Ok(())
    }

    fn detach(&mut self) -> Result<(), SurfaceError> {
        info!(
            moves = self.moves,
            last = ?self.last,
            "detach"
        );
        Ok(())
    }
}

struct LoggingRenderer;

impl Renderer for LoggingRenderer {
    fn show_facing(&mut self, facing: Facing) {
        info!(?facing, "sprite");
    }
}

/// Press near the bottom, lift 400px in 10 steps, release
async fn play_drag(handle: &SessionHandle, height: i32) -> Result<()> {
    let start_x = 540.0;
    let start_y = (height - 100) as f32;
    let mut pace = tokio::time::interval(Duration::from_millis(16));

    pace.tick().await;
    handle
        .send(PointerEvent::Down {
            raw_x: start_x,
            raw_y: start_y,
            at: Instant::now(),
        })
        .await?;

    for step in 1..=10u8 {
        pace.tick().await;
        handle
            .send(PointerEvent::Move {
                raw_x: start_x + f32::from(step) * 3.0,
                raw_y: start_y - f32::from(step) * 40.0,
                at: Instant::now(),
            })
            .await?;
    }

    pace.tick().await;
    handle
        .send(PointerEvent::Up {
            raw_x: start_x + 30.0,
            raw_y: start_y - 400.0,
            at: Instant::now(),
        })
        .await?;

    info!("scripted drag released");
    Ok(())
}

/// Wall time for `ticks` ticks
fn run_duration(tick_interval: Duration, ticks: u32) -> Result<Duration> {
    tick_interval.checked_mul(ticks).with_context(|| {
        format!("{ticks} ticks of {tick_interval:?} overflow the run length")
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pet_sim=info".parse()?)
                .add_directive("pet_core=info".parse()?),
        )
        .with_target(true)
        .init();

    let path = args.config.clone().or_else(pet_core::default_config_path);
    let mut config = load_config_from_path(path).context("Failed to load configuration")?;

    let mut overrides = ConfigOverrides::new();
    if let Some(seed) = args.seed {
        overrides = overrides.with_seed(seed);
    }
    if let Some(ms) = args.tick_ms {
        overrides = overrides.with_tick_interval_ms(ms);
    }
    overrides.apply(&mut config);
    config.validate()?;

    info!(
        source = %config.source(),
        tick_ms = config.tick_interval.as_millis() as u64,
        seed = ?config.seed,
        "configuration loaded"
    );

    let run_for = run_duration(config.tick_interval, args.ticks)?;
    let host = LoggingHost {
        metrics: DisplayMetrics::new(args.width, args.height),
        moves: 0,
        last: None,
    };
    let mut handle = PetSession::spawn(config, host, LoggingRenderer);
    let deadline = Instant::now()
        .checked_add(run_for)
        .context("Run length does not fit the clock")?;

    if args.drag {
        play_drag(&handle, args.height).await?;
    }

    let print_signals = async {
        while let Some(signal) = handle.next_signal().await {
            info!(?signal, "pet signal");
        }
    };

    tokio::select! {
        _ = tokio::time::timeout_at(deadline, print_signals) => {}
        _ = tokio::signal::ctrl_c() => info!("interrupted"),
    }

    let snapshot = handle.snapshot();
    info!(
        position = %snapshot.position,
        activity = ?snapshot.activity,
        facing = ?snapshot.facing,
        "final state"
    );

    handle.shutdown().await?;
    Ok(())
}
