/// Coin identity, bridge provenance and type-string helpers
pub mod coin;
/// Decimal adjustment between raw on-chain integers and human units
pub mod conversions;
/// Pool identity record
pub mod pool;

pub use coin::{Bridge, Chain, CoinInfo, CoinMetadata};
pub use pool::PoolInfo;
