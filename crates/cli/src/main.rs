//! TripWeaver CLI — the main entry point.
//!
//! Commands:
//! - `plan`     — Generate a 3-day itinerary for a personality code
//! - `profiles` — List the personality catalogue
//! - `status`   — Show the effective resilience configuration

use clap::{Parser, Subcommand};

mod commands;
mod demo;

#[derive(Parser)]
#[command(
    name = "tripweaver",
    about = "TripWeaver — personality-typed travel itinerary generator",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an itinerary
    Plan(commands::plan::PlanArgs),

    /// List the sixteen personality profiles
    Profiles,

    /// Show the effective configuration
    Status {
        /// Path to a tripweaver.toml
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Plan(args) => commands::plan::run(args).await?,
        Commands::Profiles => commands::profiles::run()?,
        Commands::Status { config } => commands::status::run(config)?,
    }

    Ok(())
}
