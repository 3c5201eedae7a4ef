//! # DEX Indexer
//!
//! Replays raw DEX events and publishes USD TVL and volume metrics.
//!
//! ## Overview
//!
//! This binary:
//! - Replays a JSON-lines file of raw chain events in order (`--events`)
//! - Runs one reserve snapshot over all registered pools (`--snapshot`)
//! - Keeps snapshotting every `snapshot.interval_seconds` until Ctrl+C (`--watch`)
//! - Exposes Prometheus metrics when built with `observability` and `metrics.enabled`
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin dex_indexer -- --events events.jsonl --watch
//! ```

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use dex_pool_metrics::{
    chain_client::{ChainClient, PriceOracle},
    coin_resolver::CoinResolver,
    events::{EventDecoder, RawEvent},
    metrics,
    pool_registry::PoolRegistry,
    price_oracle::CoinGeckoOracle,
    processor::EventProcessor,
    settings::{LogSettings, MetricsSettings, Settings},
    snapshot::SnapshotRunner,
    sui_rpc::SuiRpcClient,
    valuation::ValuationEngine,
    MetricsAggregator,
};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;

#[derive(Debug, Parser)]
#[command(name = "dex_indexer", about = "Values DEX events and publishes pool metrics")]
struct Args {
    /// Settings file (TOML). Missing file means defaults.
    #[arg(long, default_value = "Config.toml")]
    config: String,

    /// JSON-lines file of raw events to replay.
    #[arg(long)]
    events: Option<PathBuf>,

    /// Run one reserve snapshot after the replay.
    #[arg(long)]
    snapshot: bool,

    /// Keep snapshotting until Ctrl+C.
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let settings = Settings::from_file(&args.config)
        .with_context(|| format!("loading settings from {}", args.config))?;
    init_logging(&settings.log);
    init_metrics(&settings.metrics)?;

    info!(
        "Starting dex_indexer ({}, package {})",
        settings.network.as_str(),
        settings.package_id
    );

    let client: Arc<dyn ChainClient> = Arc::new(SuiRpcClient::new(&settings.rpc)?);
    let oracle: Arc<dyn PriceOracle> = Arc::new(CoinGeckoOracle::new(&settings.price_feeds)?);

    let registry = PoolRegistry::new(client.clone(), CoinResolver::new(client));
    let valuation = Arc::new(
        ValuationEngine::new(registry, oracle, settings.network)
            .with_price_aliases(settings.price_feeds.price_aliases.clone()),
    );
    let aggregator = MetricsAggregator::new(settings.whitelist.to_whitelist(), settings.project.clone());

    if let Some(path) = &args.events {
        let processor = EventProcessor::new(
            EventDecoder::new(&settings.package_id),
            valuation.clone(),
            aggregator.clone(),
            settings.project.clone(),
        );
        replay(&processor, path).await?;
    }

    let runner = SnapshotRunner::new(
        valuation,
        aggregator,
        settings.snapshot.batch_size,
        settings.snapshot.interval_seconds,
    );

    if args.snapshot {
        let report = runner.run_once(Utc::now()).await;
        info!(
            "Snapshot: {} pools, {} failed, {} measurements",
            report.pools_seen,
            report.pools_failed,
            report.measurements.len()
        );
    }

    if args.watch {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(runner.run_periodic(shutdown_rx));

        signal::ctrl_c().await?;
        info!("Shutdown requested");
        let _ = shutdown_tx.send(true);
        handle.await?;
    }

    Ok(())
}

async fn replay(processor: &EventProcessor, path: &Path) -> Result<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading events from {}", path.display()))?;

    let (mut processed, mut failed) = (0usize, 0usize);
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let raw: RawEvent = match serde_json::from_str(line) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Line {}: not a raw event: {}", line_no + 1, e);
                failed += 1;
                continue;
            }
        };

        match processor.process_raw(&raw).await {
            Ok(outcome) => {
                processed += 1;
                info!("{}", outcome.message);
            }
            Err(e) => {
                failed += 1;
                warn!("Line {}: event dropped: {}", line_no + 1, e);
            }
        }
    }

    info!(
        "Replay finished: {} processed, {} dropped, {} pools registered",
        processed,
        failed,
        processor.registry().len()
    );
    Ok(())
}

#[cfg(not(feature = "observability"))]
fn init_logging(log: &LogSettings) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log.level.as_str()))
        .init();
}

#[cfg(feature = "observability")]
fn init_logging(log: &LogSettings) {
    use dex_pool_metrics::settings::LogFormat;

    let level: tracing::Level = log.level.parse().unwrap_or(tracing::Level::INFO);
    match log.format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_max_level(level).init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_max_level(level).init(),
    }
}

#[cfg(feature = "observability")]
fn init_metrics(settings: &MetricsSettings) -> Result<()> {
    if !settings.enabled {
        return Ok(());
    }
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], settings.port))
        .install()
        .context("installing Prometheus exporter")?;
    metrics::describe_metrics();
    info!("Prometheus metrics on :{}", settings.port);
    Ok(())
}

#[cfg(not(feature = "observability"))]
fn init_metrics(settings: &MetricsSettings) -> Result<()> {
    if settings.enabled {
        warn!("metrics.enabled is set but the binary was built without `observability`");
    }
    metrics::describe_metrics();
    Ok(())
}
