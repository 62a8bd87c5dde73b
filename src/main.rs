//! sys-scrape Binary Entry Point
//!
//! Runs every enabled scraper once against a MySQL server and prints the
//! observations in Prometheus text format.

use std::time::Duration;

use clap::Parser;
use mysqld_sys_scraper::{
    config::{AppConfig, parse_timeout},
    metric::{self, render_text},
    scraper::{ScrapeContext, ScraperRegistry},
    source::MySqlSource,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// sys-scrape - MySQL sys schema scraper
#[derive(Parser, Debug)]
#[command(name = "sys-scrape", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(short, long, env = "SYS_SCRAPE_CONFIG")]
    config: Option<String>,

    /// Database URL (overrides config file)
    #[arg(long, env = "SYS_SCRAPE_DSN")]
    dsn: Option<String>,

    /// Collection deadline, e.g. `10s` (overrides config file)
    #[arg(long, env = "SYS_SCRAPE_TIMEOUT", value_parser = parse_timeout)]
    timeout: Option<Duration>,

    /// Scraper to run; repeat for several (overrides config file)
    #[arg(long = "scraper")]
    scrapers: Vec<String>,

    /// List available scrapers and exit
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout carries the exposition.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,mysqld_sys_scraper=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let builtin = ScraperRegistry::builtin();

    if cli.list {
        for scraper in builtin.iter() {
            println!("{}\t{}\t{}", scraper.name(), scraper.version(), scraper.help());
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            AppConfig::load(path)?
        }
        None => AppConfig::default(),
    };

    // Apply CLI/env overrides (CLI > ENV > config file)
    if let Some(dsn) = cli.dsn {
        config.database.dsn = dsn;
    }
    if let Some(timeout) = cli.timeout {
        config.scrape.timeout = timeout;
    }
    if !cli.scrapers.is_empty() {
        config.scrape.scrapers = cli.scrapers;
    }
    config.validate()?;

    let dsn = config.database.parsed_dsn()?;
    tracing::info!(dsn = %dsn, "Connecting to MySQL");
    let source = MySqlSource::connect_with(
        dsn.as_str(),
        config.database.max_connections,
        config.database.connect_timeout,
    )
    .await?;

    let server_version = source.server_version().await?;
    tracing::info!(version = %server_version, "Connected to MySQL");

    let registry = builtin
        .select(&config.scrape.scrapers)?
        .supported_by(server_version);

    let ctx = ScrapeContext::new().with_timeout(config.scrape.timeout);
    let canceller = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl+C signal");
            canceller.cancel();
        }
    });

    let (sink, mut rx) = metric::channel(config.scrape.sink_capacity);
    let drain = tokio::spawn(async move {
        let mut observations = Vec::new();
        while let Some(obs) = rx.recv().await {
            observations.push(obs);
        }
        observations
    });

    let outcomes = registry.collect_once(&ctx, &source, &sink).await;
    drop(sink);
    let observations = drain.await?;
    source.close().await;

    print!("{}", render_text(&observations)?);

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    tracing::info!(
        scrapers = outcomes.len(),
        failed,
        observations = observations.len(),
        "Collection complete"
    );
    if failed > 0 {
        return Err(format!("{} of {} scrapers failed", failed, outcomes.len()).into());
    }
    Ok(())
}
