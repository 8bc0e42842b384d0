//! MatchPose CLI — Command-line interface for the recognition engine.
//!
//! Usage:
//!   matchpose run [OPTIONS]    Run a synthetic recognition round
//!   matchpose check            Check configuration and engine readiness

use clap::{Parser, Subcommand};

mod commands;
mod synthetic;

#[derive(Parser)]
#[command(
    name = "matchpose",
    about = "Real-time single-subject action recognition engine",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a complete recognition round against synthetic predictors
    Run {
        /// Round duration in seconds
        #[arg(long, default_value = "10.0")]
        duration: f64,

        /// Frame rate of the synthetic source
        #[arg(long, default_value = "30")]
        fps: u32,

        /// Window capacity W in frames
        #[arg(long, default_value = "90")]
        window_capacity: usize,

        /// Eviction stride S in frames
        #[arg(long, default_value = "10")]
        eviction_stride: usize,

        /// Tier-one target probability threshold
        #[arg(long, default_value = "0.8")]
        target_threshold: f32,

        /// Tier-two negative probability threshold
        #[arg(long, default_value = "0.8")]
        negative_threshold: f32,

        /// Tier-three fallback probability threshold
        #[arg(long, default_value = "0.6")]
        fallback_threshold: f32,

        /// Seconds between synthetic subject dropouts (0 = never drop)
        #[arg(long, default_value = "4.0")]
        dropout_period: f64,
    },

    /// Check configuration and engine readiness
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    matchpose_common::logging::init_logging(&matchpose_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Run {
            duration,
            fps,
            window_capacity,
            eviction_stride,
            target_threshold,
            negative_threshold,
            fallback_threshold,
            dropout_period,
        } => {
            commands::run::run(
                duration,
                fps,
                window_capacity,
                eviction_stride,
                target_threshold,
                negative_threshold,
                fallback_threshold,
                dropout_period,
            )
            .await
        }
        Commands::Check => commands::check::run(),
    }
}
