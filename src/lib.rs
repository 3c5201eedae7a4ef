//! # DEX Pool Metrics
//!
//! Event valuation and pool registry engine for a constant-product DEX on Sui.
//! It turns raw DEX events (pool creation, liquidity changes, swaps) into USD
//! denominated TVL and volume metrics.
//!
//! ## Overview
//!
//! - **Parsing**: recovers the curve and coin types from Move generic arguments
//! - **Resolution**: coin metadata with a seeded, process-wide cache
//! - **Registry**: idempotent pool registration, lazily reconstructed from chain
//! - **Valuation**: oracle prices with a reserve-ratio fallback
//! - **Aggregation**: whitelist-gated TVL, volume and liquidity measurements
//!
//! ## Architecture
//!
//! ### Collaborators
//! The core talks to the network only through [`chain_client::ChainClient`] and
//! [`chain_client::PriceOracle`]. [`sui_rpc::SuiRpcClient`] and
//! [`price_oracle::CoinGeckoOracle`] are the production implementations.
//!
//! ### Event path
//! [`events::EventDecoder`] decodes a raw event, [`processor::EventProcessor`]
//! registers its pool, values the amounts and records volume.
//!
//! ### Snapshot path
//! [`snapshot::SnapshotRunner`] periodically reads the reserves of every
//! registered pool and records TVL and reserve gauges.

// Core Types
/// Common types and data structures
pub mod types;
/// Error types
pub mod error;
/// Well-known coin table
pub mod coins;
/// Move generic type-argument parsing
pub mod type_args;

// Registry & Valuation
/// Collaborator traits (chain node, price oracle)
pub mod chain_client;
/// Coin metadata resolution with caching
pub mod coin_resolver;
/// Pool registry
pub mod pool_registry;
/// USD valuation with reserve-ratio fallback
pub mod valuation;
/// Measurement building and whitelist gating
pub mod aggregator;

// Event & Snapshot Processing
/// Raw event decoding
pub mod events;
/// Per-event handling
pub mod processor;
/// Periodic reserve snapshots
pub mod snapshot;

// Infrastructure
/// Sui JSON-RPC client
pub mod sui_rpc;
/// CoinGecko price oracle
pub mod price_oracle;
/// Configuration
pub mod settings;
/// Metrics sink
pub mod metrics;

pub use aggregator::{Measurement, MetricsAggregator, Whitelist};
pub use chain_client::{ChainClient, ObjectState, PriceOracle};
pub use coin_resolver::CoinResolver;
pub use error::{ClientError, IndexerError};
pub use events::{DexAction, DexEvent, EventDecoder, RawEvent};
pub use pool_registry::{PoolRegistry, PoolSnapshot};
pub use processor::{EventOutcome, EventProcessor};
pub use settings::{Settings, SuiNetwork};
pub use snapshot::{SnapshotReport, SnapshotRunner};
pub use type_args::{PoolTypeArgs, TypeArgConvention};
pub use types::{CoinInfo, PoolInfo};
pub use valuation::{Valuation, ValuationEngine, ValuationSource};
