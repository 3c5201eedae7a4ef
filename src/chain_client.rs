//! # Collaborator Traits
//!
//! The registry and valuation layers never talk to the network directly. They
//! depend on two narrow async traits so the RPC node and the price oracle can
//! be swapped (or mocked) without touching core logic.
//!
//! - [`ChainClient`]: raw object reads and coin metadata lookups
//! - [`PriceOracle`]: USD quotes by coin type at a point in time
//!
//! Implementations are expected to bound each call with their own timeout.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::ClientError;
use crate::settings::SuiNetwork;
use crate::types::CoinMetadata;

/// Raw on-chain object as returned by the node.
///
/// `fields` holds the Move struct fields; reserve balances are read from
/// `balance_x` / `balance_y`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectState {
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

impl ObjectState {
    /// Integer field that may be encoded as a JSON string or number.
    pub fn u128_field(&self, name: &str) -> Option<u128> {
        value_as_u128(self.fields.get(name)?)
    }
}

/// Move `u64`/`u128` values arrive as decimal strings; small ones sometimes as numbers.
pub fn value_as_u128(value: &Value) -> Option<u128> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_u64().map(u128::from),
        _ => None,
    }
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Reads the live object with its type and content fields.
    async fn fetch_object_state(&self, object_id: &str) -> Result<ObjectState, ClientError>;

    /// Coin metadata for `coin_type`; `Ok(None)` when the chain has none.
    async fn fetch_coin_metadata(&self, coin_type: &str)
        -> Result<Option<CoinMetadata>, ClientError>;
}

#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// USD price of one human unit of `coin_type` at `at`, or `Ok(None)`
    /// when the oracle has no quote.
    async fn get_price_by_type(
        &self,
        network: SuiNetwork,
        coin_type: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<f64>, ClientError>;
}
