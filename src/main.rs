//! PhoneDB Miner main entry point
//!
//! This is the command-line interface for the PhoneDB device scraper.

use anyhow::Context;
use clap::{Parser, Subcommand};
use phonedb_miner::config::{load_config_with_hash, MinerConfig};
use phonedb_miner::miner::{scrape_brand_device_details, scrape_brand_devices, DeviceListSource};
use phonedb_miner::output::{print_detail_summary, print_list_summary};
use phonedb_miner::storage::{ensure_dir, prepare_output_dirs};
use phonedb_miner::url::normalize_brand;
use phonedb_miner::MinerError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// PhoneDB Miner: scrape device information from PhoneDB
///
/// `list` collects the devices of a brand from the site's search results;
/// `extract` visits each collected device and stores its full detail page.
#[derive(Parser, Debug)]
#[command(name = "phonedb-miner")]
#[command(version = "1.0.0")]
#[command(about = "Scrape device information from PhoneDB", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mine the device list for a brand
    List {
        /// Brand name to scrape (e.g. Samsung, Apple, Xiaomi)
        brand: String,

        /// Update the existing list instead of recreating it
        #[arg(long)]
        update: bool,

        /// Output directory (default: <data-dir>/devices_list)
        #[arg(long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Extract detailed information for the devices of a brand
    Extract {
        /// Brand name to extract device details for
        brand: String,

        /// Maximum number of devices to process
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max: Option<u32>,

        /// Only extract devices that have no details yet
        #[arg(long)]
        update: bool,

        /// Output directory (default: <data-dir>/device_detail_list)
        #[arg(long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Custom input file with a device list (overrides the brand's list)
        #[arg(long, value_name = "FILE")]
        input_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("phonedb_miner=info,warn"),
            1 => EnvFilter::new("phonedb_miner=debug,info"),
            2 => EnvFilter::new("phonedb_miner=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_configuration(cli.config.as_ref())?;

    prepare_output_dirs(&config.output).context("Failed to prepare output directories")?;

    match cli.command {
        Command::List {
            brand,
            update,
            output,
        } => handle_list(&config, &brand, update, output).await,
        Command::Extract {
            brand,
            max,
            update,
            output,
            input_file,
        } => handle_extract(&config, &brand, max, update, output, input_file).await,
    }
}

fn load_configuration(path: Option<&PathBuf>) -> anyhow::Result<MinerConfig> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(MinerConfig::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Handles the `list` command
async fn handle_list(
    config: &MinerConfig,
    brand: &str,
    update: bool,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let brand = normalize_brand(brand);
    tracing::info!("Starting PhoneDB Miner for brand: {}", brand);

    let output_dir = output.unwrap_or_else(|| config.output.devices_list_path());
    ensure_dir(&output_dir)?;

    let report = scrape_brand_devices(&brand, update, &output_dir, config)
        .await
        .with_context(|| format!("Mining the device list for {} failed", brand))?;

    print_list_summary(&report);
    Ok(())
}

/// Handles the `extract` command
async fn handle_extract(
    config: &MinerConfig,
    brand: &str,
    max: Option<u32>,
    update: bool,
    output: Option<PathBuf>,
    input_file: Option<PathBuf>,
) -> anyhow::Result<()> {
    let brand = normalize_brand(brand);
    tracing::info!("Starting PhoneDB Data Extraction for brand: {}", brand);

    let output_dir = output.unwrap_or_else(|| config.output.device_detail_path());
    ensure_dir(&output_dir)?;

    let source = match input_file {
        Some(path) => {
            tracing::info!("Using custom input file: {}", path.display());
            DeviceListSource::File(path)
        }
        None => DeviceListSource::BrandList(config.output.devices_list_path()),
    };

    let max_devices = max.map(|m| m as usize);
    match scrape_brand_device_details(&brand, max_devices, update, &output_dir, &source, config)
        .await
    {
        Ok(report) => {
            print_detail_summary(&report);
            Ok(())
        }
        Err(e @ MinerError::DeviceListUnavailable { .. }) => {
            Err(anyhow::Error::new(e).context(format!(
                "Run `phonedb-miner list {}` first or pass --input-file",
                brand
            )))
        }
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("Extracting device details for {} failed", brand))),
    }
}
