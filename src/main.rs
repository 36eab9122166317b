use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber;

use minicam_compiler::{
    config::Config,
    pipeline::CompileEngine,
    session::{Device, FixedRoot, RootProvider, SessionLayout, TrialSpec},
};

#[derive(Parser)]
#[command(
    name = "minicam-compiler",
    version,
    about = "Batch-rename and merge behavioral minicam trial clips",
    long_about = "Minicam-Compiler copies a trial's camera clips into a compiled folder under a trial-ordinal prefix, orders them naturally, and merges them into one resized session video."
)]
struct Cli {
    /// Session root directory (holds the trial subfolders)
    #[arg(short, long)]
    root: PathBuf,

    /// Trial subfolder name under the session root
    #[arg(short, long)]
    trial: String,

    /// Trial ordinal used as the staged-name prefix
    #[arg(long, default_value_t = 0)]
    ordinal: u32,

    /// Camera device (minicam1, minicam2, or the numeric id 1/2)
    #[arg(short, long, default_value = "minicam1", value_parser = Device::parse)]
    device: Device,

    /// Declared output frame rate, overriding the configured value
    #[arg(long)]
    fps: Option<f64>,

    /// Skip the rename/copy stage and reuse an existing compiled folder
    #[arg(long)]
    no_stage: bool,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    info!("Starting Minicam-Compiler v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = match cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(&config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };

    // CLI overrides
    if let Some(fps) = cli.fps {
        config.video.params.fps = fps;
    }
    if cli.no_stage {
        config.staging.enabled = false;
    }

    let root = FixedRoot::new(cli.root).session_root()?;
    let layout = SessionLayout::new(root, cli.device);
    let trial = TrialSpec {
        name: cli.trial,
        ordinal: cli.ordinal,
    };

    // Create and run the compile engine
    let engine = CompileEngine::new(config);
    let report = engine.compile(&layout, &trial).await?;

    info!(
        "Done: {} frames merged into {:?}",
        report.total_frames, report.output
    );
    Ok(())
}
