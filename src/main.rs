// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "pgcapture")]
#[command(about = "Frame quality gate and capture-control negotiation for photogrammetry")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    /// Configuration file (default: <config dir>/pgcapture/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the quality gate over a sequence of images
    Analyze {
        /// Images, analyzed in order as consecutive frames
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Print one JSON verdict per frame
        #[arg(long)]
        json: bool,
    },

    /// Show the longest shutter that fits a frame rate
    Shutter {
        #[arg(long, default_value = "30")]
        fps: u32,

        /// Hardware minimum exposure in nanoseconds
        #[arg(long)]
        min_ns: Option<i64>,

        /// Hardware maximum exposure in nanoseconds
        #[arg(long)]
        max_ns: Option<i64>,
    },

    /// Negotiate manual controls against the virtual camera
    Negotiate {
        /// Hardware capabilities as JSON (default: a typical phone camera)
        #[arg(long)]
        caps: Option<PathBuf>,

        /// Normalized ISO in [0, 1]
        #[arg(long)]
        iso: Option<f32>,

        /// Normalized shutter in [0, 1]
        #[arg(long)]
        shutter: Option<f32>,

        /// Normalized focus in [0, 1]
        #[arg(long)]
        focus: Option<f32>,

        #[arg(long)]
        fps: Option<u32>,

        /// Simulate hardware that refuses manual exposure
        #[arg(long)]
        reject_manual_exposure: bool,

        /// Simulate hardware that refuses manual focus
        #[arg(long)]
        reject_manual_focus: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=pgcapture=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = pgcapture::Config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze { images, json } => cli::analyze_images(&config, &images, json),
        Commands::Shutter { fps, min_ns, max_ns } => cli::print_shutter(&config, fps, min_ns, max_ns),
        Commands::Negotiate {
            caps,
            iso,
            shutter,
            focus,
            fps,
            reject_manual_exposure,
            reject_manual_focus,
        } => cli::negotiate(
            &config,
            cli::NegotiateArgs {
                caps,
                iso,
                shutter,
                focus,
                fps,
                reject_manual_exposure,
                reject_manual_focus,
            },
        ),
    }
}
