// src/snapshot.rs

use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::aggregator::{Measurement, MetricsAggregator};
use crate::error::IndexerError;
use crate::metrics;
use crate::types::conversions::remove_decimals;
use crate::valuation::{Valuation, ValuationEngine};

/// Result of one snapshot pass.
#[derive(Debug, Default)]
pub struct SnapshotReport {
    pub pools_seen: usize,
    pub pools_failed: usize,
    pub measurements: Vec<Measurement>,
}

/// Periodically reads reserves of every registered pool and records TVL and
/// reserve gauges.
pub struct SnapshotRunner {
    valuation: Arc<ValuationEngine>,
    aggregator: MetricsAggregator,
    batch_size: usize,
    interval: Duration,
}

impl SnapshotRunner {
    pub fn new(
        valuation: Arc<ValuationEngine>,
        aggregator: MetricsAggregator,
        batch_size: usize,
        interval_seconds: u64,
    ) -> Self {
        Self {
            valuation,
            aggregator,
            batch_size: batch_size.max(1),
            interval: Duration::from_secs(interval_seconds.max(1)),
        }
    }

    /// Snapshots all registered pools once. Pools are read concurrently in
    /// chunks of `batch_size`; a pool that fails is skipped until next pass.
    pub async fn run_once(&self, at: DateTime<Utc>) -> SnapshotReport {
        let pool_ids = self.valuation.registry().pool_ids();
        let mut report = SnapshotReport {
            pools_seen: pool_ids.len(),
            ..Default::default()
        };

        for batch in pool_ids.chunks(self.batch_size) {
            let results = join_all(batch.iter().map(|id| self.snapshot_pool(id, at))).await;
            for (pool_id, result) in batch.iter().zip(results) {
                match result {
                    Ok(measurements) => report.measurements.extend(measurements),
                    Err(e) => {
                        warn!("Snapshot skipped pool {}: {}", pool_id, e);
                        metrics::increment_snapshot_failure(pool_id);
                        report.pools_failed += 1;
                    }
                }
            }
        }

        metrics::record_measurements(&report.measurements);
        report
    }

    async fn snapshot_pool(
        &self,
        pool_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Vec<Measurement>, IndexerError> {
        let registry = self.valuation.registry();
        let snapshot = registry.lookup_or_reconstruct(pool_id).await?;
        let pool = &snapshot.pool;
        let (coin_x, coin_y) = registry.pool_coins(pool).await;

        let amount_x = remove_decimals(snapshot.balance_x, coin_x.decimals);
        let amount_y = remove_decimals(snapshot.balance_y, coin_y.decimals);

        let valuation: Valuation = self
            .valuation
            .value_with_reserves(pool, amount_x, amount_y, at, Some((amount_x, amount_y)))
            .await;

        let mut out = self
            .aggregator
            .reserves(pool, &coin_x, &coin_y, amount_x, amount_y);
        out.extend(self.aggregator.tvl(pool, &coin_x, &coin_y, &valuation));
        Ok(out)
    }

    /// Runs [`run_once`](Self::run_once) on every tick until `shutdown`
    /// turns true or its sender is dropped.
    pub async fn run_periodic(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("Snapshot loop started (every {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.run_once(Utc::now()).await;
                    info!(
                        "Snapshot: {} pools, {} failed, {} measurements",
                        report.pools_seen,
                        report.pools_failed,
                        report.measurements.len()
                    );
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Snapshot loop stopped");
    }
}
