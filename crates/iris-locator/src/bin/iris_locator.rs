use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::LevelFilter;

use iris_locator::detect::run_config;
use iris_locator::io::{parse_roi, IrisDetectConfig, IrisReport};
use iris_locator::{Rect, SegmentParams};

#[cfg(feature = "tracing")]
use iris_locator::core::init_tracing;
#[cfg(not(feature = "tracing"))]
use iris_locator::core::init_with_level;

#[derive(Debug, Parser)]
#[command(name = "iris-locator", version, about = "Locate iris candidates inside eye regions")]
struct Cli {
    /// Log level (off, error, warn, info, debug, trace). `RUST_LOG` overrides
    /// it when built with the `tracing` feature.
    #[arg(long, global = true, default_value = "warn")]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Detect irises in the given regions of one image.
    Detect {
        #[arg(long)]
        image: PathBuf,
        /// Eye region as x,y,width,height; repeat for several regions.
        #[arg(long = "roi", value_parser = parse_roi, required = true)]
        rois: Vec<Rect>,
        /// JSON file with pipeline parameters; missing fields use defaults.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write the report here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Dump intermediate stages as PNG files into this directory.
        #[arg(long)]
        debug_dir: Option<PathBuf>,
        /// Include per-stage events in the report.
        #[arg(long)]
        events: bool,
    },
    /// Run a full JSON detection config and write its report.
    Run {
        config: PathBuf,
        #[arg(long)]
        events: bool,
    },
    /// Print the default pipeline parameters as JSON.
    DefaultConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    #[cfg(not(feature = "tracing"))]
    init_with_level(cli.log_level)?;
    #[cfg(feature = "tracing")]
    init_tracing(cli.log_level, false);

    match cli.command {
        Command::Detect {
            image,
            rois,
            config,
            output,
            debug_dir,
            events,
        } => {
            let params = match config {
                Some(path) => load_params(&path)?,
                None => SegmentParams::default(),
            };
            let cfg = IrisDetectConfig {
                image_path: image.display().to_string(),
                rois,
                output_path: None,
                debug_dir: debug_dir.map(|d| d.display().to_string()),
                params,
            };
            let report = run_config(&cfg, events)?;
            match output {
                Some(path) => report.write_json(&path)?,
                None => print_report(&report)?,
            }
        }
        Command::Run { config, events } => {
            let cfg = IrisDetectConfig::load_json(&config)?;
            let report = run_config(&cfg, events)?;
            let out = cfg.output_path();
            report.write_json(&out)?;
            println!("wrote {}", out.display());
        }
        Command::DefaultConfig => {
            println!("{}", serde_json::to_string_pretty(&SegmentParams::default())?);
        }
    }
    Ok(())
}

fn load_params(path: &Path) -> Result<SegmentParams, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_report(report: &IrisReport) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
