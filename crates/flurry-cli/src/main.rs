//! Flurry CLI - headless driver for the particle choreography engine

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, simulate, targets};
use flurry_core::Mode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flurry")]
#[command(about = "Festive particle choreography, driven from the command line", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the choreography headless at a fixed frame rate
    Simulate {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Simulated duration in seconds
        #[arg(long, default_value = "60")]
        seconds: f32,

        /// Ticks per simulated second
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Override the particle count
        #[arg(long)]
        particles: Option<usize>,

        /// Override the random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Jump to this mode before the first tick
        #[arg(long, value_parser = parse_mode)]
        mode: Option<Mode>,

        /// Tap times in seconds (comma-separated)
        #[arg(long, value_delimiter = ',')]
        tap: Vec<f32>,

        /// Photo to upload during the run
        #[arg(long)]
        upload: Option<PathBuf>,

        /// When to upload the photo, in seconds
        #[arg(long, default_value = "0")]
        upload_at: f32,

        /// Write sampled frames and the event log as JSON
        #[arg(long)]
        dump: Option<PathBuf>,

        /// Sample every Nth frame into the dump
        #[arg(long, default_value = "60")]
        every: u64,

        /// Keep every Nth particle in dumped frames
        #[arg(long, default_value = "100")]
        stride: usize,
    },

    /// Generate a target field and print or save it as JSON
    Targets {
        /// greeting, logo, banner, tree, scatter, decoration, wish or image
        #[arg(value_parser = parse_kind)]
        kind: String,

        /// Number of targets
        #[arg(short = 'n', long, default_value = "2000")]
        count: usize,

        /// Random seed
        #[arg(long, default_value = "7")]
        seed: u64,

        /// Wish text, or "LINE1/LINE2" for the banner
        #[arg(long)]
        text: Option<String>,

        /// Source image for logo and image targets
        #[arg(long)]
        image: Option<PathBuf>,

        /// Output JSON path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the default config, or check a config file
    Config {
        /// Config file to validate
        #[arg(long)]
        check: Option<PathBuf>,
    },
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    s.parse::<Mode>().map_err(|e| e.to_string())
}

fn parse_kind(s: &str) -> Result<String, String> {
    if targets::KINDS.contains(&s) {
        Ok(s.to_string())
    } else {
        Err(format!(
            "unknown target kind '{}'; valid values: {}",
            s,
            targets::KINDS.join(", ")
        ))
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            config,
            seconds,
            fps,
            particles,
            seed,
            mode,
            tap,
            upload,
            upload_at,
            dump,
            every,
            stride,
        } => simulate::run(simulate::SimulateArgs {
            config,
            seconds,
            fps,
            particles,
            seed,
            mode,
            taps: tap,
            upload,
            upload_at,
            dump,
            every,
            stride,
        }),
        Commands::Targets {
            kind,
            count,
            seed,
            text,
            image,
            output,
        } => targets::run(targets::TargetsArgs {
            kind,
            count,
            seed,
            text,
            image,
            output,
        }),
        Commands::Config { check } => match check {
            Some(path) => config::check(&path),
            None => config::show_defaults(),
        },
    }
}
