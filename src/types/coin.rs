use serde::{Deserialize, Serialize};
use std::fmt;

/// Cross-chain bridge a coin was relayed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bridge {
    Wormhole,
    Celer,
}

impl Bridge {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bridge::Wormhole => "Wormhole",
            Bridge::Celer => "Celer",
        }
    }
}

impl fmt::Display for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Origin chain of a bridged coin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chain {
    Eth,
    Bsc,
    Solana,
    Avax,
    Ftm,
    Celo,
    Polygon,
}

impl Chain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Eth => "ETH",
            Chain::Bsc => "BSC",
            Chain::Solana => "SOLANA",
            Chain::Avax => "AVAX",
            Chain::Ftm => "FTM",
            Chain::Celo => "CELO",
            Chain::Polygon => "POLYGON",
        }
    }
}

/// Metadata as returned by the chain's coin metadata endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CoinMetadata {
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

/// Identity and display facts about a coin type.
///
/// `coin_type` is the primary key. Entries are created once (seed table, live
/// fetch or fallback) and never replaced afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinInfo {
    pub coin_type: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    pub bridge: Option<Bridge>,
    pub source_chain: Option<Chain>,
}

impl CoinInfo {
    pub fn from_metadata(coin_type: &str, metadata: CoinMetadata) -> Self {
        Self {
            coin_type: coin_type.to_string(),
            symbol: metadata.symbol,
            name: metadata.name,
            decimals: metadata.decimals,
            bridge: None,
            source_chain: None,
        }
    }

    /// Placeholder used when metadata cannot be fetched: symbol and name are
    /// derived from the type string and the amount is treated as unscaled.
    pub fn fallback(coin_type: &str) -> Self {
        let symbol = symbol_from_coin_type(coin_type);
        Self {
            coin_type: coin_type.to_string(),
            name: symbol.clone(),
            symbol,
            decimals: 0,
            bridge: None,
            source_chain: None,
        }
    }
}

/// Last `::` segment of a coin type, without any generic suffix.
///
/// `0xabc::coin::COIN` -> `COIN`, `0x1::lp::LP<0x2::sui::SUI>` -> `LP`.
pub fn symbol_from_coin_type(coin_type: &str) -> String {
    let base = coin_type.split('<').next().unwrap_or(coin_type).trim();
    base.rsplit("::").next().unwrap_or(base).to_string()
}

/// Strips leading zeros from the address part of a coin type so that the
/// short and long forms of the same address share one cache key.
///
/// Only the leading address is rewritten; generic arguments are kept as is.
pub fn normalize_coin_type(coin_type: &str) -> String {
    let trimmed = coin_type.trim();
    let Some((address, rest)) = trimmed.split_once("::") else {
        return trimmed.to_string();
    };
    let Some(hex) = address.strip_prefix("0x") else {
        return trimmed.to_string();
    };
    let digits = hex.trim_start_matches('0');
    let digits = if digits.is_empty() { "0" } else { digits };
    format!("0x{}::{}", digits.to_lowercase(), rest)
}

/// Case-insensitive key for coin types read from settings maps, whose keys the
/// config loader lowercases.
pub fn settings_key(coin_type: &str) -> String {
    normalize_coin_type(coin_type).to_lowercase()
}
