// src/pool_registry.rs

use dashmap::DashMap;
use log::{debug, info};
use std::sync::Arc;

use crate::chain_client::ChainClient;
use crate::coin_resolver::CoinResolver;
use crate::error::IndexerError;
use crate::metrics;
use crate::type_args::parse_pool_type;
use crate::types::{CoinInfo, PoolInfo};

/// Live pool state read back from chain: the registry record plus the raw
/// (not decimal-adjusted) reserve balances.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolSnapshot {
    pub pool: PoolInfo,
    pub balance_x: u128,
    pub balance_y: u128,
}

/// Process-wide pool registry.
///
/// Registration is idempotent and first-writer-wins: once a pool id is known,
/// later `register` calls return the stored record and ignore their
/// arguments. Every registered pool is also a tracked pool for snapshots.
#[derive(Clone)]
pub struct PoolRegistry {
    client: Arc<dyn ChainClient>,
    coins: CoinResolver,
    pools: Arc<DashMap<String, PoolInfo>>,
}

impl PoolRegistry {
    pub fn new(client: Arc<dyn ChainClient>, coins: CoinResolver) -> Self {
        Self {
            client,
            coins,
            pools: Arc::new(DashMap::new()),
        }
    }

    pub fn coins(&self) -> &CoinResolver {
        &self.coins
    }

    pub fn get(&self, pool_id: &str) -> Option<PoolInfo> {
        self.pools.get(pool_id).map(|e| e.value().clone())
    }

    pub fn pool_ids(&self) -> Vec<String> {
        self.pools.iter().map(|e| e.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub async fn register(
        &self,
        pool_id: &str,
        coin_x_type: &str,
        coin_y_type: &str,
        is_stable: bool,
    ) -> PoolInfo {
        if let Some(existing) = self.pools.get(pool_id) {
            metrics::increment_cache_hit("pool_info");
            return existing.value().clone();
        }
        metrics::increment_cache_miss("pool_info");

        let (coin_x, coin_y) =
            futures::join!(self.coins.resolve(coin_x_type), self.coins.resolve(coin_y_type));
        let info = PoolInfo::new(pool_id, &coin_x, &coin_y, is_stable);

        let stored = self
            .pools
            .entry(pool_id.to_string())
            .or_insert(info)
            .value()
            .clone();
        metrics::set_cache_size("pool_info", self.pools.len() as f64);
        info!("Registered pool {} ({})", stored.name, pool_id);
        stored
    }

    /// Both coins of a registered pool, resolved through the coin cache.
    pub async fn pool_coins(&self, pool: &PoolInfo) -> (CoinInfo, CoinInfo) {
        futures::join!(
            self.coins.resolve(&pool.coin_x_type),
            self.coins.resolve(&pool.coin_y_type)
        )
    }

    /// Reads the pool object from chain, recovers its identity from the
    /// object's type string and registers it (a prior registration wins).
    pub async fn lookup_or_reconstruct(&self, pool_id: &str) -> Result<PoolSnapshot, IndexerError> {
        let state = self
            .client
            .fetch_object_state(pool_id)
            .await
            .map_err(|source| IndexerError::ObjectFetchFailed {
                object_id: pool_id.to_string(),
                source,
            })?;

        let args = parse_pool_type(&state.object_type)?;
        let pool = self
            .register(pool_id, &args.coin_x_type, &args.coin_y_type, args.is_stable)
            .await;

        let balance_x = state.u128_field("balance_x").unwrap_or(0);
        let balance_y = state.u128_field("balance_y").unwrap_or(0);
        debug!(
            "Pool {} reserves: x={} y={}",
            pool.name, balance_x, balance_y
        );

        Ok(PoolSnapshot {
            pool,
            balance_x,
            balance_y,
        })
    }
}
