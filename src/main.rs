//! Article-Linkcheck main entry point
//!
//! This is the command-line interface for the article link checker.

use article_linkcheck::config::{load_config_with_hash, Config};
use article_linkcheck::crawler::{GatherSettings, Gatherer, Scanner};
use article_linkcheck::output::{
    format_basic_report, format_json_report, generate_markdown_report, RunInfo, ScanReport,
};
use article_linkcheck::storage::{open_storage, RunStatus, SqliteStorage, Storage};
use chrono::Utc;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Article-Linkcheck: find dead links in a site's articles
///
/// Gathers the articles listed on an index page, extracts the links found
/// in each article, and checks every link concurrently.
#[derive(Parser, Debug)]
#[command(name = "article-linkcheck")]
#[command(version = "1.0.0")]
#[command(about = "Find dead links in a site's articles", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Validate config and show what would be scanned without scanning
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_scan(&config, &config_hash, cli.json).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Progress messages of a verbose target are logged at info level, so they
/// show with the default filter.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("article_linkcheck=info,warn"),
            1 => EnvFilter::new("article_linkcheck=debug,info"),
            2 => EnvFilter::new("article_linkcheck=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --dry-run mode: shows what would be scanned
fn handle_dry_run(config: &Config) {
    println!("=== Article-Linkcheck Dry Run ===\n");

    println!("Target:");
    println!("  Domain: {}", config.target.domain);
    println!("  Root page: {}", config.target.root_page);
    println!("  Parent level: {}", config.target.parent_level);
    println!("  Verify TLS: {}", config.target.verify_tls);

    println!("\nScan:");
    println!("  Timeout: {}s", config.scan.timeout_secs);
    println!(
        "  Max concurrent requests: {}",
        config.scan.max_concurrent_requests
    );
    println!("  Levels ({}):", config.scan.levels.len());
    for level in &config.scan.levels {
        println!("    - {}", level);
    }

    println!("\nOutput:");
    println!(
        "  Markdown: {}",
        config.output.markdown_path.as_deref().unwrap_or("(none)")
    );
    println!(
        "  Database: {}",
        config.output.database_path.as_deref().unwrap_or("(none)")
    );

    println!("\n✓ Configuration is valid");
    if config.scan.levels.is_empty() {
        println!("✗ No scan levels configured, a scan would find no links");
    }
}

/// Handles the main scan: gather, extract, verify, then report
async fn handle_scan(
    config: &Config,
    config_hash: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let started_at = Utc::now().to_rfc3339();

    let mut storage = match &config.output.database_path {
        Some(path) => Some(open_storage(Path::new(path))?),
        None => None,
    };
    let run_id = match storage.as_mut() {
        Some(storage) => Some(storage.create_run(config_hash)?),
        None => None,
    };

    let gatherer = match Gatherer::new(GatherSettings::from_config(config)).await {
        Ok(gatherer) => gatherer,
        Err(e) => {
            tracing::error!("Gathering failed: {}", e);
            fail_run(storage.as_mut(), run_id);
            return Err(e.into());
        }
    };

    let mut scanner = Scanner::from_config(&gatherer, &config.scan)?;
    if let Err(e) = scanner.collect_links().await {
        tracing::error!("Link extraction failed: {}", e);
        fail_run(storage.as_mut(), run_id);
        return Err(e.into());
    }

    let verified = scanner.scan_links().await;

    if let (Some(storage), Some(run_id)) = (storage.as_mut(), run_id) {
        storage.save_results(run_id, &scanner.results())?;
        let status = if verified.is_ok() {
            RunStatus::Completed
        } else {
            RunStatus::Failed
        };
        storage.finish_run(run_id, status)?;
        tracing::info!("Saved run {} ({})", run_id, status.to_db_string());
    }

    if let Err(e) = verified {
        tracing::error!("Verification failed: {}", e);
        return Err(e.into());
    }

    let report = scanner.report();
    print_report(&report, json)?;

    if let Some(path) = &config.output.markdown_path {
        let run = RunInfo {
            root_page: config.target.root_page.clone(),
            started_at,
            finished_at: Some(Utc::now().to_rfc3339()),
            config_hash: config_hash.to_string(),
        };
        generate_markdown_report(&report, &run, Path::new(path))?;
    }

    Ok(())
}

fn print_report(report: &ScanReport, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", format_json_report(report)?);
    } else {
        print!("{}", format_basic_report(report));
    }
    Ok(())
}

/// Marks a run failed, logging instead of propagating storage errors
fn fail_run(storage: Option<&mut SqliteStorage>, run_id: Option<i64>) {
    if let (Some(storage), Some(run_id)) = (storage, run_id) {
        if let Err(e) = storage.finish_run(run_id, RunStatus::Failed) {
            tracing::error!("Failed to record run {} as failed: {}", run_id, e);
        }
    }
}
