// src/processor.rs

use chrono::Utc;
use log::debug;
use std::sync::Arc;

use crate::aggregator::{Activity, Measurement, MetricsAggregator};
use crate::error::IndexerError;
use crate::events::{DexAction, DexEvent, EventDecoder, RawEvent};
use crate::metrics;
use crate::pool_registry::PoolRegistry;
use crate::types::conversions::remove_decimals;
use crate::types::PoolInfo;
use crate::valuation::{Valuation, ValuationEngine};

/// Target of the structured per-action records.
pub const ACTION_TARGET: &str = "dex_pool_metrics::actions";

/// What handling one event produced.
#[derive(Debug, Clone)]
pub struct EventOutcome {
    pub kind: &'static str,
    pub pool: PoolInfo,
    /// Decimal-adjusted `(x, y)` amounts.
    pub amounts: (f64, f64),
    /// `None` for pool creation, which is not valued.
    pub valuation: Option<Valuation>,
    /// Measurements recorded for this event (empty when gated).
    pub measurements: Vec<Measurement>,
    pub message: String,
}

/// Handles decoded DEX events: registers the pool, values the amounts and
/// records volume metrics.
///
/// Every event is counted and logged; USD metrics obey the aggregator's
/// whitelist.
pub struct EventProcessor {
    decoder: EventDecoder,
    valuation: Arc<ValuationEngine>,
    aggregator: MetricsAggregator,
    project: String,
}

impl EventProcessor {
    pub fn new(
        decoder: EventDecoder,
        valuation: Arc<ValuationEngine>,
        aggregator: MetricsAggregator,
        project: impl Into<String>,
    ) -> Self {
        Self {
            decoder,
            valuation,
            aggregator,
            project: project.into(),
        }
    }

    pub fn registry(&self) -> &PoolRegistry {
        self.valuation.registry()
    }

    pub async fn process_raw(&self, raw: &RawEvent) -> Result<EventOutcome, IndexerError> {
        let event = self.decoder.decode(raw)?;
        self.process(&event).await
    }

    pub async fn process(&self, event: &DexEvent) -> Result<EventOutcome, IndexerError> {
        let kind = event.action.kind();
        metrics::increment_events(kind, &self.project);

        let args = &event.type_args;
        let registry = self.registry();
        let pool = registry
            .register(&event.pool_id, &args.coin_x_type, &args.coin_y_type, args.is_stable)
            .await;

        let (coin_x, coin_y) = registry.pool_coins(&pool).await;
        let (raw_x, raw_y) = event.action.amounts();
        let amount_x = remove_decimals(raw_x, coin_x.decimals);
        let amount_y = remove_decimals(raw_y, coin_y.decimals);

        let activity = match event.action {
            DexAction::PoolCreated { .. } => None,
            DexAction::AddLiquidity { .. } => Some(Activity::AddLiquidity),
            DexAction::RemoveLiquidity { .. } => Some(Activity::RemoveLiquidity),
            DexAction::SwapX { .. } | DexAction::SwapY { .. } => Some(Activity::Swap),
        };

        let Some(activity) = activity else {
            let message = format!("Created pool {}", pool.name);
            self.log_action(event, &pool, amount_x, amount_y, 0.0, &message);
            return Ok(EventOutcome {
                kind,
                pool,
                amounts: (amount_x, amount_y),
                valuation: None,
                measurements: Vec::new(),
                message,
            });
        };

        let at = event.timestamp.unwrap_or_else(Utc::now);
        let valuation = self
            .valuation
            .value_in_usd(&pool.pool_id, amount_x, amount_y, at)
            .await?;

        let measurements = self
            .aggregator
            .volume(&pool, &coin_x, &coin_y, &valuation, activity);
        if measurements.is_empty() {
            debug!("No volume metrics for {} ({:?})", pool.name, valuation.source);
        }
        metrics::record_measurements(&measurements);

        let message = match event.action {
            DexAction::AddLiquidity { .. } => format!(
                "Add USD${} Liquidity in {}",
                valuation.total(),
                pool.name
            ),
            DexAction::RemoveLiquidity { .. } => format!(
                "Remove USD${} Liquidity in {}",
                valuation.total(),
                pool.name
            ),
            DexAction::SwapY { .. } => format!(
                "Swapped {} {} -> {} {}. USD value {} in {}",
                amount_y,
                coin_y.symbol,
                amount_x,
                coin_x.symbol,
                valuation.swapped_value(),
                pool.name
            ),
            _ => format!(
                "Swapped {} {} -> {} {}. USD value {} in {}",
                amount_x,
                coin_x.symbol,
                amount_y,
                coin_y.symbol,
                valuation.swapped_value(),
                pool.name
            ),
        };

        let usd_value = match activity {
            Activity::Swap => valuation.swapped_value(),
            _ => valuation.total(),
        };
        self.log_action(event, &pool, amount_x, amount_y, usd_value, &message);

        Ok(EventOutcome {
            kind,
            pool,
            amounts: (amount_x, amount_y),
            valuation: Some(valuation),
            measurements,
            message,
        })
    }

    fn log_action(
        &self,
        event: &DexEvent,
        pool: &PoolInfo,
        amount_x: f64,
        amount_y: f64,
        usd_value: f64,
        message: &str,
    ) {
        tracing::info!(
            target: ACTION_TARGET,
            kind = event.action.kind(),
            sender = %event.sender,
            pool_id = %pool.pool_id,
            pool_name = %pool.name,
            coin_x_type = %pool.coin_x_type,
            coin_y_type = %pool.coin_y_type,
            is_stable = pool.is_stable,
            amount_x,
            amount_y,
            usd_value,
            project = %self.project,
            "{}",
            message
        );
    }
}
