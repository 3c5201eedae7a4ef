use serde::Serialize;

use super::coin::CoinInfo;

/// Identity and display facts about a trading pool.
///
/// Symbols and decimals are copied from the two coins at registration time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolInfo {
    pub pool_id: String,
    pub coin_x_type: String,
    pub coin_y_type: String,
    pub symbol_x: String,
    pub symbol_y: String,
    pub decimal_x: u8,
    pub decimal_y: u8,
    pub is_stable: bool,
    pub name: String,
}

impl PoolInfo {
    pub fn new(pool_id: &str, coin_x: &CoinInfo, coin_y: &CoinInfo, is_stable: bool) -> Self {
        Self {
            pool_id: pool_id.to_string(),
            coin_x_type: coin_x.coin_type.clone(),
            coin_y_type: coin_y.coin_type.clone(),
            symbol_x: coin_x.symbol.clone(),
            symbol_y: coin_y.symbol.clone(),
            decimal_x: coin_x.decimals,
            decimal_y: coin_y.decimals,
            is_stable,
            name: pool_name(is_stable, &coin_x.symbol, &coin_y.symbol),
        }
    }
}

/// `stable-SUI/USDC`, `volatile-SUI/ETH`
pub fn pool_name(is_stable: bool, symbol_x: &str, symbol_y: &str) -> String {
    let curve = if is_stable { "stable" } else { "volatile" };
    format!("{}-{}/{}", curve, symbol_x, symbol_y)
}
