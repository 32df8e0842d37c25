//! logweave - Entry Point

use clap::Parser;
use logweave::config::{
    apply_cli_overrides, apply_env_overrides, load_config_with_precedence, merge_config, Rules,
};
use logweave::ingest::{self, Ingestor};
use logweave::model::AppError;
use logweave::source::StdinSource;
use logweave::view::{ColorConfig, Palette};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// logweave - group a live stream of log lines into conversations
#[derive(Parser, Debug)]
#[command(name = "logweave")]
#[command(version)]
#[command(about = "Pipe a process's log output in and browse it grouped by request, trace or category")]
pub struct Args {
    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Field name or template for the line level
    #[arg(long)]
    pub level_field: Option<String>,

    /// Field name or template for the line message
    #[arg(long)]
    pub message_field: Option<String>,

    /// Field name or template for the line timestamp (RFC 3339)
    #[arg(long)]
    pub timestamp_field: Option<String>,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    run(args)?;
    Ok(())
}

fn run(args: Args) -> Result<(), AppError> {
    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = load_config_with_precedence(args.config.clone())?;
        let merged = merge_config(config_file);
        let with_env = apply_env_overrides(merged);
        apply_cli_overrides(
            with_env,
            args.level_field,
            args.message_field,
            args.timestamp_field,
            args.no_color,
        )
    };

    // Invalid rules abort before the terminal is touched.
    let rules = Rules::compile(&config)?;

    logweave::logging::init(&config.log_file_path)?;
    info!(config = ?config, "Configuration loaded and resolved");

    let source = StdinSource::new()?;
    let ingestor = Ingestor::new(source, Arc::new(rules));
    let snapshot = ingestor.snapshot();

    let (tx, rx) = ingest::channel();
    ingestor.spawn(tx)?;

    let palette = Palette::with_color_config(ColorConfig::new(config.color));
    logweave::view::run(snapshot, rx, palette)?;

    Ok(())
}
