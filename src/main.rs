//! Sitewalk main entry point
//!
//! This is the command-line interface for the Sitewalk site crawler.

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use sitewalk::config::{load_config, validate, Config};
use sitewalk::crawl_site_with_progress;
use sitewalk::output::{print_statistics, render_report, CrawlStatistics, OutputFormat};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Sitewalk: a concurrent single-host web crawler
///
/// Sitewalk visits every page reachable from URL without leaving its host,
/// and prints each page together with the links found on it. Press Ctrl-C to
/// stop early and still get the pages crawled so far.
#[derive(Parser, Debug)]
#[command(name = "sitewalk")]
#[command(version)]
#[command(about = "A concurrent single-host web crawler", long_about = None)]
struct Cli {
    /// URL to start crawling from (https:// is assumed when missing)
    #[arg(value_name = "URL")]
    url: String,

    /// Maximum number of simultaneous requests
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Number of workers (defaults to the concurrency)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Stop after this many pages
    #[arg(long)]
    max_pages: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format for the results
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print summary statistics after the results
    #[arg(long)]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Loads the config file, if any, and applies command-line overrides
    fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("Loading configuration from: {}", path.display());
                load_config(path)
                    .with_context(|| format!("Failed to load {}", path.display()))?
            }
            None => Config::default(),
        };

        if let Some(concurrency) = self.concurrency {
            config.crawler.concurrency = concurrency;
        }
        if let Some(workers) = self.workers {
            config.crawler.workers = Some(workers);
        }
        if let Some(max_pages) = self.max_pages {
            config.crawler.max_pages = max_pages;
        }
        if let Some(timeout) = self.timeout {
            config.http.timeout_secs = timeout;
        }

        validate(&config).context("Invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = cli.resolve_config()?;
    tracing::info!(
        "Concurrency: {}, workers: {}, max pages: {}",
        config.crawler.concurrency,
        config.crawler.worker_count(),
        config.crawler.max_pages
    );

    let interrupt = CancellationToken::new();
    spawn_interrupt_handler(interrupt.clone());

    // Per-page debug logs replace the spinner at -v
    let progress = progress_bar(cli.quiet || cli.verbose > 0);
    let bar = progress.clone();
    let result = crawl_site_with_progress(&cli.url, &config, interrupt, move |page, _| {
        bar.inc(1);
        bar.set_message(page.url.to_string());
    })
    .await;
    progress.finish_and_clear();

    let report = result.with_context(|| format!("Cannot crawl '{}'", cli.url))?;
    if report.stop_reason.is_early() {
        tracing::warn!(
            "Crawl stopped early ({}), results are partial",
            report.stop_reason
        );
    }

    println!("{}", render_report(&report, cli.format)?);

    if cli.stats {
        print_statistics(&CrawlStatistics::from_report(&report));
    }

    Ok(())
}

/// Spinner on stderr showing the page count and the last crawled URL
fn progress_bar(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new_spinner();
    match ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] Crawled: {pos} | {msg}")
    {
        Ok(style) => bar.set_style(style),
        Err(e) => tracing::warn!("Invalid progress template: {}", e),
    }
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Cancels `interrupt` on the first Ctrl-C
fn spawn_interrupt_handler(interrupt: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Crawling interrupted by user, finishing in-flight pages");
                interrupt.cancel();
            }
            Err(e) => tracing::error!("Failed to listen for Ctrl-C: {}", e),
        }
    });
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so the report on stdout stays machine-readable.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitewalk=info,warn"),
            1 => EnvFilter::new("sitewalk=debug,info"),
            2 => EnvFilter::new("sitewalk=trace,debug"),
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
