//! # Metrics Aggregator
//!
//! Turns a [`Valuation`] into named, labelled measurements:
//!
//! - `tvl_by_pool` / `tvl_by_coin` from periodic reserve snapshots
//! - `vol_by_pool` / `vol_by_coin` per swap or liquidity event
//! - `liquidity_added_usd` / `liquidity_removed_usd` per liquidity event
//! - `trading_volume_usd` running swap volume per pool
//! - `reserves_x` / `reserves_y` raw reserve gauges (never gated)
//!
//! USD measurements are only produced for whitelisted pools and never for an
//! unavailable (all-zero) valuation. Coin measurements carry a `bridge` label
//! only when the coin was bridged.
//!
//! Per-event USD samples are histograms so that every event reaches the
//! exporter's `_sum`; snapshot values and running totals are gauges.

use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;

use crate::types::{CoinInfo, PoolInfo};
use crate::valuation::Valuation;

pub const TVL_BY_POOL: &str = "tvl_by_pool";
pub const TVL_BY_COIN: &str = "tvl_by_coin";
pub const VOL_BY_POOL: &str = "vol_by_pool";
pub const VOL_BY_COIN: &str = "vol_by_coin";
pub const LIQUIDITY_ADDED_USD: &str = "liquidity_added_usd";
pub const LIQUIDITY_REMOVED_USD: &str = "liquidity_removed_usd";
pub const RESERVES_X: &str = "reserves_x";
pub const RESERVES_Y: &str = "reserves_y";
pub const TRADING_VOLUME_USD: &str = "trading_volume_usd";

/// How a measurement is exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementKind {
    /// Latest value wins.
    Gauge,
    /// One sample per event.
    Histogram,
}

/// A single metric sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub name: &'static str,
    pub value: f64,
    pub labels: Vec<(&'static str, String)>,
}

impl Measurement {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn kind(&self) -> MeasurementKind {
        match self.name {
            VOL_BY_POOL | VOL_BY_COIN | LIQUIDITY_ADDED_USD | LIQUIDITY_REMOVED_USD => {
                MeasurementKind::Histogram
            }
            _ => MeasurementKind::Gauge,
        }
    }
}

/// Pool activity that produces volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Swap,
    AddLiquidity,
    RemoveLiquidity,
}

/// Set of pool ids allowed to emit USD metrics.
#[derive(Debug, Clone)]
pub struct Whitelist {
    enabled: bool,
    pools: HashSet<String>,
}

impl Whitelist {
    pub fn new<I, S>(pools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            enabled: true,
            pools: pools
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    /// Lets every pool through.
    pub fn allow_all() -> Self {
        Self {
            enabled: false,
            pools: HashSet::new(),
        }
    }

    pub fn allows(&self, pool_id: &str) -> bool {
        !self.enabled || self.pools.contains(&pool_id.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

/// Clones share the running swap totals.
#[derive(Debug, Clone)]
pub struct MetricsAggregator {
    whitelist: Whitelist,
    project: String,
    trading_volume: Arc<DashMap<String, f64>>,
}

impl MetricsAggregator {
    pub fn new(whitelist: Whitelist, project: impl Into<String>) -> Self {
        Self {
            whitelist,
            project: project.into(),
            trading_volume: Arc::new(DashMap::new()),
        }
    }

    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    /// USD swap volume recorded for `pool_id` since startup.
    pub fn trading_volume(&self, pool_id: &str) -> f64 {
        self.trading_volume
            .get(pool_id)
            .map(|total| *total.value())
            .unwrap_or(0.0)
    }

    fn emits_usd(&self, pool: &PoolInfo, valuation: &Valuation) -> bool {
        self.whitelist.allows(&pool.pool_id) && !valuation.is_unavailable()
    }

    fn pool_labels(&self, pool: &PoolInfo) -> Vec<(&'static str, String)> {
        vec![
            ("pool", pool.name.clone()),
            ("pool_id", pool.pool_id.clone()),
            ("project", self.project.clone()),
        ]
    }

    fn coin_labels(&self, coin: &CoinInfo) -> Vec<(&'static str, String)> {
        let mut labels = vec![
            ("coin", coin.symbol.clone()),
            ("coin_type", coin.coin_type.clone()),
        ];
        if let Some(bridge) = coin.bridge {
            labels.push(("bridge", bridge.as_str().to_string()));
        }
        labels.push(("project", self.project.clone()));
        labels
    }

    fn per_coin(
        &self,
        name: &'static str,
        coin_x: &CoinInfo,
        coin_y: &CoinInfo,
        valuation: &Valuation,
    ) -> Vec<Measurement> {
        [(coin_x, valuation.value_x), (coin_y, valuation.value_y)]
            .into_iter()
            .filter(|(_, value)| *value != 0.0)
            .map(|(coin, value)| Measurement {
                name,
                value,
                labels: self.coin_labels(coin),
            })
            .collect()
    }

    /// TVL of a pool snapshot, by pool and by coin.
    pub fn tvl(
        &self,
        pool: &PoolInfo,
        coin_x: &CoinInfo,
        coin_y: &CoinInfo,
        valuation: &Valuation,
    ) -> Vec<Measurement> {
        if !self.emits_usd(pool, valuation) {
            return Vec::new();
        }

        let mut out = vec![Measurement {
            name: TVL_BY_POOL,
            value: valuation.total(),
            labels: self.pool_labels(pool),
        }];
        out.extend(self.per_coin(TVL_BY_COIN, coin_x, coin_y, valuation));
        out
    }

    /// Volume of one swap or liquidity event.
    ///
    /// A swap's notional is its larger leg and is added to the pool's
    /// `trading_volume_usd` total. A liquidity event's notional is the sum of
    /// both legs, also reported as `liquidity_added_usd` / `liquidity_removed_usd`.
    pub fn volume(
        &self,
        pool: &PoolInfo,
        coin_x: &CoinInfo,
        coin_y: &CoinInfo,
        valuation: &Valuation,
        activity: Activity,
    ) -> Vec<Measurement> {
        if !self.emits_usd(pool, valuation) {
            return Vec::new();
        }

        let notional = match activity {
            Activity::Swap => valuation.swapped_value(),
            Activity::AddLiquidity | Activity::RemoveLiquidity => valuation.total(),
        };

        let mut out = vec![Measurement {
            name: VOL_BY_POOL,
            value: notional,
            labels: self.pool_labels(pool),
        }];
        out.extend(self.per_coin(VOL_BY_COIN, coin_x, coin_y, valuation));

        let (name, value) = match activity {
            Activity::AddLiquidity => (LIQUIDITY_ADDED_USD, notional),
            Activity::RemoveLiquidity => (LIQUIDITY_REMOVED_USD, notional),
            Activity::Swap => {
                let mut total = self
                    .trading_volume
                    .entry(pool.pool_id.clone())
                    .or_insert(0.0);
                *total += notional;
                let total = *total;
                (TRADING_VOLUME_USD, total)
            }
        };
        out.push(Measurement {
            name,
            value,
            labels: self.pool_labels(pool),
        });
        out
    }

    /// Decimal-adjusted reserve gauges of a pool snapshot.
    pub fn reserves(
        &self,
        pool: &PoolInfo,
        coin_x: &CoinInfo,
        coin_y: &CoinInfo,
        amount_x: f64,
        amount_y: f64,
    ) -> Vec<Measurement> {
        [(RESERVES_X, coin_x, amount_x), (RESERVES_Y, coin_y, amount_y)]
            .into_iter()
            .map(|(name, coin, value)| {
                let mut labels = self.pool_labels(pool);
                labels.push(("symbol", coin.symbol.clone()));
                labels.push(("coin_type", coin.coin_type.clone()));
                Measurement {
                    name,
                    value,
                    labels,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coins::{ETH_WORMHOLE_USDC, KNOWN_COINS, SUI};
    use crate::valuation::ValuationSource;

    const POOL_ID: &str = "0x85e87655a47628098b5fc2e62d4926c6384e0430f2eae60cf9c692562b688702";

    fn fixture() -> (PoolInfo, CoinInfo, CoinInfo) {
        let sui = KNOWN_COINS[SUI].clone();
        let usdc = KNOWN_COINS[ETH_WORMHOLE_USDC].clone();
        let pool = PoolInfo::new(POOL_ID, &sui, &usdc, false);
        (pool, sui, usdc)
    }

    fn valuation(x: f64, y: f64) -> Valuation {
        Valuation {
            value_x: x,
            value_y: y,
            source: ValuationSource::Direct,
        }
    }

    #[test]
    fn tvl_sums_legs_and_tags_bridge_only_when_bridged() {
        let (pool, sui, usdc) = fixture();
        let agg = MetricsAggregator::new(Whitelist::new([POOL_ID]), "dex");

        let out = agg.tvl(&pool, &sui, &usdc, &valuation(10.0, 12.5));
        assert_eq!(out.len(), 3);

        assert_eq!(out[0].name, TVL_BY_POOL);
        assert_eq!(out[0].value, 22.5);
        assert_eq!(out[0].label("pool"), Some("volatile-SUI/USDC"));
        assert_eq!(out[0].label("pool_id"), Some(POOL_ID));

        assert_eq!(out[1].label("coin"), Some("SUI"));
        assert_eq!(out[1].label("bridge"), None);
        assert_eq!(out[2].label("coin"), Some("USDC"));
        assert_eq!(out[2].label("bridge"), Some("Wormhole"));
    }

    #[test]
    fn unavailable_valuation_emits_nothing() {
        let (pool, sui, usdc) = fixture();
        let agg = MetricsAggregator::new(Whitelist::allow_all(), "dex");

        assert!(agg.tvl(&pool, &sui, &usdc, &Valuation::unavailable()).is_empty());
        assert!(agg
            .volume(&pool, &sui, &usdc, &Valuation::unavailable(), Activity::Swap)
            .is_empty());
    }

    #[test]
    fn swap_volume_reports_larger_leg() {
        let (pool, sui, usdc) = fixture();
        let agg = MetricsAggregator::new(Whitelist::allow_all(), "dex");

        let out = agg.volume(&pool, &sui, &usdc, &valuation(42.0, 41.5), Activity::Swap);
        let by_pool: Vec<_> = out.iter().filter(|m| m.name == VOL_BY_POOL).collect();
        assert_eq!(by_pool.len(), 1);
        assert_eq!(by_pool[0].value, 42.0);
        assert_eq!(out.iter().filter(|m| m.name == VOL_BY_COIN).count(), 2);
    }

    #[test]
    fn swaps_accumulate_trading_volume_per_pool() {
        let (pool, sui, usdc) = fixture();
        let agg = MetricsAggregator::new(Whitelist::allow_all(), "dex");
        let shared = agg.clone();

        agg.volume(&pool, &sui, &usdc, &valuation(10.0, 9.5), Activity::Swap);
        let out = shared.volume(&pool, &sui, &usdc, &valuation(4.0, 5.0), Activity::Swap);

        let total = out.iter().find(|m| m.name == TRADING_VOLUME_USD).unwrap();
        assert_eq!(total.value, 15.0);
        assert_eq!(total.kind(), MeasurementKind::Gauge);
        assert_eq!(agg.trading_volume(POOL_ID), 15.0);
        assert_eq!(agg.trading_volume("0xother"), 0.0);
        assert!(out
            .iter()
            .filter(|m| m.name == VOL_BY_POOL || m.name == VOL_BY_COIN)
            .all(|m| m.kind() == MeasurementKind::Histogram));
    }

    #[test]
    fn liquidity_volume_reports_sum_and_liquidity_gauge() {
        let (pool, sui, usdc) = fixture();
        let agg = MetricsAggregator::new(Whitelist::allow_all(), "dex");

        let out = agg.volume(&pool, &sui, &usdc, &valuation(5.0, 0.0), Activity::RemoveLiquidity);
        let names: Vec<_> = out.iter().map(|m| m.name).collect();
        assert_eq!(names, vec![VOL_BY_POOL, VOL_BY_COIN, LIQUIDITY_REMOVED_USD]);
        assert_eq!(out[2].value, 5.0);
        assert_eq!(out[2].kind(), MeasurementKind::Histogram);
        assert_eq!(agg.trading_volume(POOL_ID), 0.0);
    }

    #[test]
    fn non_whitelisted_pool_is_gated() {
        let (pool, sui, usdc) = fixture();
        let agg = MetricsAggregator::new(Whitelist::new(["0xother"]), "dex");

        assert!(agg.tvl(&pool, &sui, &usdc, &valuation(1.0, 1.0)).is_empty());
        assert!(agg
            .volume(&pool, &sui, &usdc, &valuation(1.0, 1.0), Activity::AddLiquidity)
            .is_empty());
        // reserves are not USD metrics and stay visible
        assert_eq!(agg.reserves(&pool, &sui, &usdc, 1.0, 2.0).len(), 2);
    }

    #[test]
    fn whitelist_matching_ignores_case() {
        let wl = Whitelist::new(["0xABCDEF"]);
        assert!(wl.allows("0xabcdef"));
        assert!(!wl.allows("0xabcdee"));
        assert!(Whitelist::allow_all().allows("anything"));
        assert!(!Whitelist::new(Vec::<String>::new()).allows("anything"));
    }
}
