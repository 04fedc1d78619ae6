//! Korzina main entry point
//!
//! Command-line interface for the catalog product harvester.

use clap::Parser;
use korzina::config::load_config_with_hash;
use korzina::output::{print_report, CsvWriter, JsonlWriter, RecordWriter};
use korzina::run_pipeline;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Korzina: a catalog product harvester
///
/// Walks the configured catalog categories, extracts structured product
/// records from detail pages and exports the accepted ones to CSV and JSONL.
#[derive(Parser, Debug)]
#[command(name = "korzina")]
#[command(version = "1.0.0")]
#[command(about = "A catalog product harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Delivery address or "lat,lon" pair to bind before crawling
    #[arg(long)]
    address: Option<String>,

    /// Stop after this many accepted records (overrides the config value)
    #[arg(long)]
    target_count: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(target) = cli.target_count {
        config.crawl.target_count = target;
    }

    if cli.dry_run {
        handle_dry_run(&config, &config_hash);
        return Ok(());
    }

    // Ctrl-C raises the shared stop flag; in-flight work finishes naturally
    // and whatever was collected so far is still reported and exported.
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, finishing in-flight work");
                stop.store(true, Ordering::Relaxed);
            }
        });
    }

    let report = run_pipeline(&config, cli.address.as_deref(), stop).await?;

    print_report(&report.stats);

    if report.stats.urls_discovered == 0 {
        println!("\nNo results: no product URLs discovered.");
        return Ok(());
    }
    if report.products.is_empty() {
        println!("\nNo results: no records passed extraction and classification.");
        return Ok(());
    }

    CsvWriter::new(&config.output.csv_path).write_records(&report.products)?;
    JsonlWriter::new(&config.output.jsonl_path).write_records(&report.products)?;

    println!(
        "\n✓ {} records exported to {} and {}",
        report.products.len(),
        config.output.csv_path,
        config.output.jsonl_path
    );

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("korzina=info,warn"),
            1 => EnvFilter::new("korzina=debug,info"),
            2 => EnvFilter::new("korzina=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &korzina::Config, config_hash: &str) {
    println!("=== Korzina Dry Run ===\n");

    println!("Config hash: {}\n", config_hash);

    println!("Fetch:");
    println!(
        "  Max concurrent requests: {}",
        config.fetch.max_concurrent_requests
    );
    println!("  Request timeout: {}s", config.fetch.request_timeout_secs);

    println!("\nCrawl:");
    println!("  Base URL: {}", config.crawl.base_url);
    println!("  Detail URL pattern: {}", config.crawl.detail_url_pattern);
    println!("  Page ceiling: {}", config.crawl.page_ceiling);
    println!("  Page delay: {}ms", config.crawl.page_delay_ms);
    println!("  Target count: {}", config.crawl.target_count);

    println!("\nExtraction:");
    println!("  Batch size: {}", config.extract.batch_size);
    println!(
        "  Max concurrent extractions: {}",
        config.extract.max_concurrent_extractions
    );
    println!(
        "  Composition retries: {}",
        config.extract.composition_retries
    );

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);
    println!("  JSONL: {}", config.output.jsonl_path);

    println!("\nClassifier:");
    println!("  URL segments: {:?}", config.classifier.url_segments);
    println!("  Allow keywords: {}", config.classifier.allow_keywords.len());
    println!("  Deny keywords: {}", config.classifier.deny_keywords.len());

    println!("\nCategories ({}):", config.categories.len());
    for entry in &config.categories {
        println!(
            "  - {} ('{}', cap {})",
            entry.path, entry.label, entry.max_products
        );
    }

    println!("\n✓ Configuration is valid");
}
