use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tick_snake::{terminal, DispatchMode, GameConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tick-snake")]
#[command(version, about = "Steer the snake with the arrow keys and eat the prey")]
struct Cli {
    /// Play area width in pixels
    #[arg(long, default_value = "500")]
    width: i32,

    /// Play area height in pixels
    #[arg(long, default_value = "300")]
    height: i32,

    /// Milliseconds between two moves
    #[arg(long, default_value = "150")]
    tick_ms: u64,

    /// Distance the snake travels per move
    #[arg(long, default_value = "10")]
    stride: i32,

    /// Per-axis distance under which the prey is eaten
    #[arg(long, default_value = "10")]
    threshold: i32,

    /// Seed for prey placement
    #[arg(long)]
    seed: Option<u64>,

    /// Queue notifications and deliver them once per tick
    #[arg(long)]
    deferred: bool,

    /// Log filter used when RUST_LOG is unset, logs go to stderr
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn config(&self) -> GameConfig {
        let mut config = GameConfig::new(self.width, self.height)
            .with_stride(self.stride)
            .with_tick_period(Duration::from_millis(self.tick_ms));
        config.eat_threshold = self.threshold;
        config.seed = self.seed;
        if self.deferred {
            config = config.with_dispatch_mode(DispatchMode::Deferred);
        }
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config();
    config.validate().context("invalid game configuration")?;
    terminal::play(config)?;
    Ok(())
}
