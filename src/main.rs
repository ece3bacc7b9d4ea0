//! sve-cardlist main entry point
//!
//! This is the command-line interface for the Shadowverse EVOLVE card-list
//! harvester.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use sve_cardlist::config::{load_config, validate, Config};
use sve_cardlist::crawler::{harvest, inspect_search, Fetcher, RetryPolicy, DEFAULT_SAMPLE_SIZE};
use sve_cardlist::output::{print_summary, RecordSink, RunSummary, TsvWriter};
use tracing_subscriber::EnvFilter;

/// Exit status when the run produced no records
const EXIT_NO_RECORDS: u8 = 2;

/// sve-cardlist: Shadowverse EVOLVE card-list harvester
///
/// Crawls the official card-list search pages (classic or infinite-scroll
/// pagination), deduplicates cards by card number and writes them as TSV.
/// Without any seed URL, one search per expansion is discovered from the
/// card-list index. `--inspect-search` only reports on the given search URLs.
#[derive(Parser, Debug)]
#[command(name = "sve-cardlist")]
#[command(version = "1.0.0")]
#[command(about = "Shadowverse EVOLVE card-list harvester", long_about = None)]
struct Cli {
    /// Card-list search URL to crawl (repeatable)
    #[arg(long = "search-url", value_name = "URL")]
    search_urls: Vec<String>,

    /// Keep only cards of this expansion code (repeatable)
    #[arg(long = "only-expansion", value_name = "CODE")]
    only_expansions: Vec<String>,

    /// Maximum number of cards to keep (0 = no limit)
    #[arg(long)]
    limit: Option<usize>,

    /// Minimum delay between requests, in seconds
    #[arg(long, value_name = "SECONDS")]
    delay: Option<f64>,

    /// Output TSV path
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Fill missing fields from each card's detail page
    #[arg(long)]
    details: bool,

    /// Request timeout, in seconds
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<f64>,

    /// Retries per failed request
    #[arg(long)]
    retries: Option<u32>,

    /// Validate the configuration and show what would be crawled, without fetching
    #[arg(long)]
    dry_run: bool,

    /// Report duplicate card numbers and links without cardno= for a search URL
    /// (repeatable); nothing is written
    #[arg(long = "inspect-search", value_name = "URL")]
    inspect_search: Vec<String>,

    /// Samples shown per section of an inspection report
    #[arg(long, value_name = "N", default_value_t = DEFAULT_SAMPLE_SIZE)]
    inspect_limit: usize,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout is reserved for the run summary.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sve_cardlist=info,warn"),
            1 => EnvFilter::new("sve_cardlist=debug,info"),
            2 => EnvFilter::new("sve_cardlist=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = build_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(ExitCode::SUCCESS);
    }

    if !cli.inspect_search.is_empty() {
        return handle_inspect(&config, &cli.inspect_search, cli.inspect_limit).await;
    }

    handle_harvest(config).await
}

/// Loads the configuration file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path).with_context(|| {
                format!("failed to load configuration from {}", path.display())
            })?
        }
        None => Config::default(),
    };

    if !cli.search_urls.is_empty() {
        config.crawl.seeds = cli.search_urls.clone();
    }
    if !cli.only_expansions.is_empty() {
        config.crawl.only_expansions = cli.only_expansions.clone();
    }
    if let Some(limit) = cli.limit {
        config.crawl.limit = limit;
    }
    if cli.details {
        config.crawl.details = true;
    }
    if let Some(delay) = cli.delay {
        config.fetch.delay_secs = delay;
    }
    if let Some(timeout) = cli.timeout {
        config.fetch.timeout_secs = timeout;
    }
    if let Some(retries) = cli.retries {
        config.fetch.max_retries = retries;
    }
    if let Some(out) = &cli.out {
        config.output.path = out.display().to_string();
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== sve-cardlist Dry Run ===\n");

    println!("Fetch:");
    println!("  User agent: {}", config.fetch.user_agent);
    println!("  Delay: {}s", config.fetch.delay_secs);
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!(
        "  Retries: {} (backoff {}s)",
        config.fetch.max_retries, config.fetch.retry_backoff_secs
    );

    println!("\nCrawl:");
    println!("  Base URL: {}", config.crawl.base_url);
    match config.crawl.limit() {
        Some(limit) => println!("  Limit: {} cards", limit),
        None => println!("  Limit: none"),
    }
    println!(
        "  Detail pass: {}",
        if config.crawl.details { "on" } else { "off" }
    );
    if config.crawl.only_expansions.is_empty() {
        println!("  Expansions: all");
    } else {
        println!("  Expansions: {}", config.crawl.only_expansions.join(", "));
    }

    if config.crawl.seeds.is_empty() {
        println!(
            "\nSeeds: discovered from {}/cardlist/",
            config.crawl.base_url.trim_end_matches('/')
        );
    } else {
        println!("\nSeeds ({}):", config.crawl.seeds.len());
        for seed in &config.crawl.seeds {
            println!("  - {}", seed);
        }
    }

    println!("\nOutput: {}", config.output.path);
    println!("\n✓ Configuration is valid");
}

/// Handles the --inspect-search mode: one diagnostic report per URL
///
/// A URL that cannot be inspected is logged and the others still run; the
/// exit status is a failure if any of them could not be inspected.
async fn handle_inspect(
    config: &Config,
    urls: &[String],
    sample: usize,
) -> anyhow::Result<ExitCode> {
    let started = Instant::now();
    let retry = RetryPolicy::from_config(&config.fetch);
    let mut fetcher = Fetcher::new(&config.fetch).context("failed to build HTTP client")?;
    let mut failures = 0;

    for url in urls {
        match inspect_search(&mut fetcher, &retry, url, sample).await {
            Ok(report) => println!("{}", report.render()),
            Err(e) => {
                tracing::error!("Cannot inspect {}: {}", url, e);
                failures += 1;
            }
        }
    }

    println!("Elapsed: {:.1}s", started.elapsed().as_secs_f64());
    if failures > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Handles the main harvest: crawl, write, summarize
async fn handle_harvest(config: Config) -> anyhow::Result<ExitCode> {
    let started = Instant::now();
    tracing::info!(
        "Seeds: {}, expansion filter: {}, limit: {}",
        config.crawl.seeds.len(),
        config.crawl.only_expansions.len(),
        config.crawl.limit
    );

    let outcome = harvest(&config).await.context("harvest failed")?;

    if let Some(err) = outcome.no_records_error() {
        tracing::error!("{}", err);
        return Ok(ExitCode::from(EXIT_NO_RECORDS));
    }

    let output = Path::new(&config.output.path);
    let mut sink = TsvWriter::new(output);
    sink.write_records(&outcome.records)
        .with_context(|| format!("failed to write {}", sink.destination()))?;

    print_summary(&RunSummary::new(&outcome, output, started.elapsed()));
    Ok(ExitCode::SUCCESS)
}
