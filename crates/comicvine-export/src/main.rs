//! Comic Vine series exporter CLI application.

use anyhow::{bail, Context, Result};
use clap::Parser;
use comicvine_export::{ComicVineClient, SeriesExporter};
use shared::config::API_KEY_ENV;
use shared::{Config, ConfigSource};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Series name to search for (overrides the config file)
    #[arg(short, long)]
    series: Option<String>,

    /// CSV output file (overrides the config file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Comic Vine API key (overrides COMICVINE_API_KEY and the config file)
    #[arg(long)]
    api_key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, source) = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        shared::logging::parse_level(&config.logging.default_level)
    };

    shared::logging::init(shared::LogConfig {
        log_dir: config.log_dir().to_string_lossy().to_string(),
        component: "comicvine-export".to_string(),
        default_level: log_level,
        console: config.logging.console,
        file: config.logging.file,
        json_format: config.logging.json_format,
    })?;

    info!("Comic Vine exporter starting");
    match source {
        ConfigSource::File => {
            info!(config_file = %args.config.display(), "Loaded configuration");
        }
        ConfigSource::Defaults => {
            warn!(config_file = %args.config.display(), "Config file not found, using defaults");
        }
    }

    let Some(api_key) = config.api_key(args.api_key.as_deref()) else {
        bail!(
            "No API key: pass --api-key, set {} or fill comicvine.api_key in {}",
            API_KEY_ENV,
            args.config.display()
        );
    };

    let series = args.series.unwrap_or_else(|| config.export.series.clone());
    if series.trim().is_empty() {
        bail!("No series given: pass --series or set export.series in the config file");
    }
    let output = args.output.unwrap_or_else(|| config.output_path());

    let client = ComicVineClient::new(api_key, &config.comicvine)
        .context("Failed to create Comic Vine client")?;

    let mut exporter = SeriesExporter::new(
        client,
        config.comicvine.request_delay(),
        config.comicvine.throttle_wait(),
    );

    info!(series = %series, output = %output.display(), "Starting export");
    let stats = exporter
        .run(&series, &output)
        .await
        .context("Export failed")?;

    info!("=== Export Complete ===");
    info!("Series: {} (volume {})", stats.volume_name, stats.volume_id);
    info!("Publisher: {}", stats.publisher);
    info!("Issues listed: {}", stats.issues_listed);
    info!("Rows written: {}", stats.rows_written);
    info!("Throttle waits: {}", stats.throttle_waits);
    info!("Data written to {}", output.display());

    Ok(())
}
