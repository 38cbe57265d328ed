use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scrollto_core::{AppConfig, EasingName};

mod commands;

#[derive(Parser)]
#[command(name = "scrollto")]
#[command(author, version, about = "Simulate scroll-to animations and inspect easing curves")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scroll animation on a simulated page
    Simulate(commands::simulate::SimulateArgs),
    /// List supported easing curves
    Easings,
    /// Print an easing curve
    Sample {
        /// Easing curve name
        #[arg(short, long, default_value_t = EasingName::default())]
        easing: EasingName,
        /// Number of samples after t=0
        #[arg(short, long, default_value_t = 20)]
        steps: u32,
    },
    /// Print the configuration file
    Config {
        /// Write the current configuration to disk
        #[arg(short, long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Simulate(args) => commands::simulate::run(&config, args).await,
        Commands::Easings => commands::easings::run(),
        Commands::Sample { easing, steps } => commands::sample::run(easing, steps),
        Commands::Config { write } => commands::config::run(&config, write),
    }
}
