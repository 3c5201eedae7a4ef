//! # Valuation Engine
//!
//! Computes USD values for the two legs of a pool amount pair.
//!
//! ## Fallback chain
//!
//! 1. Both coins quoted by the oracle: each leg is `price * amount`.
//! 2. One coin quoted: the unknown leg is priced through the pool's own
//!    reserve ratio, `value = (reserve_known / reserve_unknown) * amount * price_known`.
//! 3. Neither quoted: `(0, 0)`, which callers treat as "valuation unavailable".
//!
//! Step 2 always uses the pool's *current* reserves, even when valuing an
//! older event amount. This is an approximation that is only accurate at or
//! near the time of the reserve read.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;

use crate::chain_client::PriceOracle;
use crate::error::IndexerError;
use crate::pool_registry::PoolRegistry;
use crate::settings::SuiNetwork;
use crate::types::coin::{normalize_coin_type, settings_key};
use crate::types::conversions::remove_decimals;
use crate::types::PoolInfo;

/// How a valuation was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValuationSource {
    /// Both legs priced by the oracle.
    Direct,
    /// One leg priced by the oracle, the other through the reserve ratio.
    ImpliedFromReserves,
    /// No quote for either leg.
    Unavailable,
}

/// USD value of each leg, in that order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Valuation {
    pub value_x: f64,
    pub value_y: f64,
    pub source: ValuationSource,
}

impl Valuation {
    pub fn unavailable() -> Self {
        Self {
            value_x: 0.0,
            value_y: 0.0,
            source: ValuationSource::Unavailable,
        }
    }

    /// An all-zero result means no usable price, not worthless amounts.
    pub fn is_unavailable(&self) -> bool {
        self.value_x == 0.0 && self.value_y == 0.0
    }

    pub fn total(&self) -> f64 {
        self.value_x + self.value_y
    }

    /// Notional size of a swap: the larger of the two legs.
    pub fn swapped_value(&self) -> f64 {
        self.value_x.max(self.value_y)
    }
}

/// Value of `amount_unknown` priced through the pool's reserve ratio.
///
/// Returns 0 when the unknown side has no reserves.
pub fn implied_value(
    amount_unknown: f64,
    reserve_known: f64,
    reserve_unknown: f64,
    price_known: f64,
) -> f64 {
    if reserve_unknown <= 0.0 {
        return 0.0;
    }
    (reserve_known / reserve_unknown) * amount_unknown * price_known
}

pub struct ValuationEngine {
    registry: PoolRegistry,
    oracle: Arc<dyn PriceOracle>,
    network: SuiNetwork,
    /// Coin type -> coin type the oracle should be asked for instead.
    price_aliases: HashMap<String, String>,
}

impl ValuationEngine {
    pub fn new(registry: PoolRegistry, oracle: Arc<dyn PriceOracle>, network: SuiNetwork) -> Self {
        Self {
            registry,
            oracle,
            network,
            price_aliases: HashMap::new(),
        }
    }

    pub fn with_price_aliases(mut self, aliases: HashMap<String, String>) -> Self {
        self.price_aliases = aliases
            .into_iter()
            .map(|(from, to)| (settings_key(&from), normalize_coin_type(&to)))
            .collect();
        self
    }

    pub fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    /// Values decimal-adjusted amounts of both coins of `pool_id` at `at`.
    ///
    /// A pool that has not been registered yet is reconstructed from its live
    /// object first, and the reserves of that read feed the fallback.
    pub async fn value_in_usd(
        &self,
        pool_id: &str,
        amount_x: f64,
        amount_y: f64,
        at: DateTime<Utc>,
    ) -> Result<Valuation, IndexerError> {
        let (pool, reserves) = match self.registry.get(pool_id) {
            Some(pool) => (pool, None),
            None => {
                let snapshot = self.registry.lookup_or_reconstruct(pool_id).await?;
                let reserves = (
                    remove_decimals(snapshot.balance_x, snapshot.pool.decimal_x),
                    remove_decimals(snapshot.balance_y, snapshot.pool.decimal_y),
                );
                (snapshot.pool, Some(reserves))
            }
        };
        Ok(self
            .value_with_reserves(&pool, amount_x, amount_y, at, reserves)
            .await)
    }

    /// Same as [`value_in_usd`](Self::value_in_usd) for a known pool.
    ///
    /// `reserves` are decimal-adjusted `(x, y)` balances the caller already
    /// holds; when `None` and the reserve fallback is needed they are read
    /// from chain.
    pub async fn value_with_reserves(
        &self,
        pool: &PoolInfo,
        amount_x: f64,
        amount_y: f64,
        at: DateTime<Utc>,
        reserves: Option<(f64, f64)>,
    ) -> Valuation {
        let (price_x, price_y) = futures::join!(
            self.price(&pool.coin_x_type, at),
            self.price(&pool.coin_y_type, at)
        );

        match (price_x, price_y) {
            (Some(px), Some(py)) => Valuation {
                value_x: px * amount_x,
                value_y: py * amount_y,
                source: ValuationSource::Direct,
            },
            (Some(px), None) => {
                let value_y = match self.reserves_or_fetch(pool, reserves).await {
                    Some((rx, ry)) => implied_value(amount_y, rx, ry, px),
                    None => 0.0,
                };
                Valuation {
                    value_x: px * amount_x,
                    value_y,
                    source: ValuationSource::ImpliedFromReserves,
                }
            }
            (None, Some(py)) => {
                let value_x = match self.reserves_or_fetch(pool, reserves).await {
                    Some((rx, ry)) => implied_value(amount_x, ry, rx, py),
                    None => 0.0,
                };
                Valuation {
                    value_x,
                    value_y: py * amount_y,
                    source: ValuationSource::ImpliedFromReserves,
                }
            }
            (None, None) => {
                debug!("No price for either coin of {}", pool.name);
                Valuation::unavailable()
            }
        }
    }

    async fn reserves_or_fetch(
        &self,
        pool: &PoolInfo,
        reserves: Option<(f64, f64)>,
    ) -> Option<(f64, f64)> {
        if reserves.is_some() {
            return reserves;
        }
        match self.registry.lookup_or_reconstruct(&pool.pool_id).await {
            Ok(snapshot) => Some((
                remove_decimals(snapshot.balance_x, pool.decimal_x),
                remove_decimals(snapshot.balance_y, pool.decimal_y),
            )),
            Err(e) => {
                warn!("Reserve fallback unavailable for {}: {}", pool.name, e);
                None
            }
        }
    }

    async fn price(&self, coin_type: &str, at: DateTime<Utc>) -> Option<f64> {
        let query = self
            .price_aliases
            .get(&settings_key(coin_type))
            .map(String::as_str)
            .unwrap_or(coin_type);

        match self.oracle.get_price_by_type(self.network, query, at).await {
            Ok(Some(price)) if price.is_finite() && price >= 0.0 => Some(price),
            Ok(Some(price)) => {
                warn!("Discarding invalid price {} for {}", price, query);
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Price lookup failed for {}: {}", query, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implied_value_uses_reserve_ratio() {
        // 100 X vs 200 Y, X at $3: one Y is worth 1.5 USD
        assert!((implied_value(10.0, 100.0, 200.0, 3.0) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn implied_value_is_zero_without_reserves() {
        assert_eq!(implied_value(10.0, 100.0, 0.0, 3.0), 0.0);
    }

    #[test]
    fn swapped_value_is_the_larger_leg() {
        let v = Valuation {
            value_x: 42.0,
            value_y: 41.5,
            source: ValuationSource::Direct,
        };
        assert_eq!(v.swapped_value(), 42.0);
        assert_eq!(v.total(), 83.5);
        assert!(!v.is_unavailable());
        assert!(Valuation::unavailable().is_unavailable());
    }
}
