// src/coin_resolver.rs

use dashmap::DashMap;
use log::{debug, warn};
use std::sync::Arc;

use crate::chain_client::ChainClient;
use crate::coins::KNOWN_COINS;
use crate::metrics;
use crate::types::coin::{normalize_coin_type, CoinInfo};

/// Resolves coin types to [`CoinInfo`], caching every answer for the life of
/// the process.
///
/// ## Resolution order
///
/// 1. Cache (seeded from [`KNOWN_COINS`]) - no I/O
/// 2. Live metadata fetch through the [`ChainClient`]
/// 3. Fallback derived from the type string with `decimals = 0`
///
/// Whatever step 2 or 3 produces is cached, so a type whose fetch failed is
/// never retried. Concurrent first resolutions of the same type may both
/// fetch; the first insert wins and every caller gets the cached value.
#[derive(Clone)]
pub struct CoinResolver {
    client: Arc<dyn ChainClient>,
    cache: Arc<DashMap<String, CoinInfo>>,
}

impl CoinResolver {
    /// Resolver seeded with the well-known coin table.
    pub fn new(client: Arc<dyn ChainClient>) -> Self {
        let cache: DashMap<String, CoinInfo> = KNOWN_COINS
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self {
            client,
            cache: Arc::new(cache),
        }
    }

    /// Resolver with an empty cache.
    pub fn unseeded(client: Arc<dyn ChainClient>) -> Self {
        Self {
            client,
            cache: Arc::new(DashMap::new()),
        }
    }

    pub fn get_cached(&self, coin_type: &str) -> Option<CoinInfo> {
        self.cache
            .get(&normalize_coin_type(coin_type))
            .map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub async fn resolve(&self, coin_type: &str) -> CoinInfo {
        let key = normalize_coin_type(coin_type);

        if let Some(hit) = self.cache.get(&key) {
            metrics::increment_cache_hit("coin_info");
            return hit.value().clone();
        }
        metrics::increment_cache_miss("coin_info");

        let info = self.fetch_coin_info(&key).await;

        let stored = self.cache.entry(key).or_insert(info).value().clone();
        metrics::set_cache_size("coin_info", self.cache.len() as f64);
        stored
    }

    async fn fetch_coin_info(&self, coin_type: &str) -> CoinInfo {
        match self.client.fetch_coin_metadata(coin_type).await {
            Ok(Some(metadata)) => {
                debug!(
                    "Fetched metadata for {}: {} ({} decimals)",
                    coin_type, metadata.symbol, metadata.decimals
                );
                CoinInfo::from_metadata(coin_type, metadata)
            }
            Ok(None) => {
                warn!("No coin metadata for {}, using derived symbol", coin_type);
                CoinInfo::fallback(coin_type)
            }
            Err(e) => {
                warn!(
                    "Coin metadata fetch failed for {}: {}, using derived symbol",
                    coin_type, e
                );
                CoinInfo::fallback(coin_type)
            }
        }
    }
}
