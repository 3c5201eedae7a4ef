// src/coins.rs
//
// Seed table of well-known coin types. Loaded into the coin cache at startup
// so bridged assets carry their provenance without a metadata round trip.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::types::coin::{normalize_coin_type, Bridge, Chain, CoinInfo};

pub const SUI: &str = "0x2::sui::SUI";
pub const ETH_WORMHOLE_USDC: &str =
    "0x5d4b302506645c37ff133b98c4b50a5ae14841659738d6d733d59d0d217a93bf::coin::COIN";
pub const NATIVE_WORMHOLE_ETH: &str =
    "0xaf8cd5edc19c4512f4259f0bee101a40d41ebed738ade5874359610ef8eeced5::coin::COIN";
pub const ETH_WORMHOLE_USDT: &str =
    "0xc060006111016b8a020ad5b33834984a437aaa7d3c74c18e09a95d48aceab08c::coin::COIN";
pub const NATIVE_WORMHOLE_WBNB: &str =
    "0xb848cce11ef3a8f62eccea6eb5b35a12c4c2b1ee1af7755d02d7bd6218e8226f::coin::COIN";
pub const NATIVE_WORMHOLE_WAVAX: &str =
    "0x1e8b532cca6569cab9f9b9ebc73f8c13885012ade714729aa3b450e0339ac766::coin::COIN";
pub const NATIVE_WORMHOLE_WFTM: &str =
    "0x6081300950a4f1e2081580e919c210436a1bed49080502834950d31ee55a2396::coin::COIN";
pub const NATIVE_WORMHOLE_CELO: &str =
    "0xa198f3be41cda8c07b3bf3fee02263526e535d682499806979a111e88a5a8d0f::coin::COIN";
pub const NATIVE_WORMHOLE_WMATIC: &str =
    "0xdbe380b13a6d0f5cdedd58de8f04625263f113b3f9db32b3e1983f49e2841676::coin::COIN";
pub const NATIVE_WORMHOLE_SOL: &str =
    "0xb7844e289a8410e50fb3ca48d69eb9cf29e27d223ef90353fe1bd8e27ff8f3f8::coin::COIN";
pub const BSC_WORMHOLE_ADA: &str =
    "0x4eac6573f65e7db5aea5a23e1335993a57e088dcd4aff7934059d9a6311d8655::coin::COIN";
pub const BSC_WORMHOLE_BTCB: &str =
    "0x5cc7b6ed0ce0d43d08667793f6efe7a34d678a780755dc37ea8bfa8805f63327::coin::COIN";
pub const BSC_WORMHOLE_USDT: &str =
    "0x603b488c87e0d1df64560a61418c87238d440a29ee39bbd757b0c92d38a35c7c::coin::COIN";
pub const BSC_WORMHOLE_USDC: &str =
    "0x909cba62ce96d54de25bec9502de5ca7b4f28901747bbf96b76c2e63ec5f1cba::coin::COIN";
pub const BSC_WORMHOLE_ETH: &str =
    "0x5029d5a94429a73b8036cd67192d9c5e09bbc2c0fee942d50075a9edba66744f::coin::COIN";
pub const BSC_WORMHOLE_FLOKI: &str =
    "0xbcbbd5c23edf35fc279e21ebc129a1187dbfa5b086c63a8e7ff202865888b27b::coin::COIN";
pub const BSC_WORMHOLE_DOGE: &str =
    "0xd399b358bd0e835000f6caa8c771a7d186499b6e62d413c2fd6cfed709689f28::coin::COIN";

fn wormhole(coin_type: &str, symbol: &str, name: &str, decimals: u8, chain: Chain) -> CoinInfo {
    CoinInfo {
        coin_type: normalize_coin_type(coin_type),
        symbol: symbol.to_string(),
        name: name.to_string(),
        decimals,
        bridge: Some(Bridge::Wormhole),
        source_chain: Some(chain),
    }
}

/// Known coins keyed by normalized coin type.
pub static KNOWN_COINS: Lazy<HashMap<String, CoinInfo>> = Lazy::new(|| {
    let coins = vec![
        CoinInfo {
            coin_type: normalize_coin_type(SUI),
            symbol: "SUI".to_string(),
            name: "SUI".to_string(),
            decimals: 9,
            bridge: None,
            source_chain: None,
        },
        wormhole(NATIVE_WORMHOLE_ETH, "ETH", "Ether", 8, Chain::Eth),
        wormhole(ETH_WORMHOLE_USDC, "USDC", "USD Coin", 6, Chain::Eth),
        wormhole(ETH_WORMHOLE_USDT, "USDT", "USD Tether", 6, Chain::Eth),
        wormhole(NATIVE_WORMHOLE_WBNB, "WBNB", "Wrapped BNB", 8, Chain::Bsc),
        wormhole(NATIVE_WORMHOLE_SOL, "SOL", "Solana", 8, Chain::Solana),
        wormhole(NATIVE_WORMHOLE_WAVAX, "WAVAX", "Wrapped AVAX", 8, Chain::Avax),
        wormhole(NATIVE_WORMHOLE_WFTM, "WFTM", "Wrapped FTM", 8, Chain::Ftm),
        wormhole(NATIVE_WORMHOLE_CELO, "CELO", "CELO", 8, Chain::Celo),
        wormhole(NATIVE_WORMHOLE_WMATIC, "WMATIC", "Wrapped Matic", 8, Chain::Polygon),
        wormhole(BSC_WORMHOLE_ADA, "ADA", "Cardano", 8, Chain::Bsc),
        wormhole(BSC_WORMHOLE_BTCB, "WBTCB", "Wrapped Bitcoin Binance", 8, Chain::Bsc),
        wormhole(BSC_WORMHOLE_USDC, "USDC", "USD Coin", 8, Chain::Bsc),
        wormhole(BSC_WORMHOLE_USDT, "USDT", "USD Tether", 8, Chain::Bsc),
        wormhole(BSC_WORMHOLE_ETH, "WETH", "Wrapped Ether", 8, Chain::Bsc),
        wormhole(BSC_WORMHOLE_FLOKI, "FLOKI", "FLOKI", 8, Chain::Bsc),
        wormhole(BSC_WORMHOLE_DOGE, "DOGE", "DOGE", 8, Chain::Bsc),
    ];

    coins
        .into_iter()
        .map(|coin| (coin.coin_type.clone(), coin))
        .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_table_is_keyed_by_its_own_type() {
        assert_eq!(KNOWN_COINS.len(), 17);
        for (key, coin) in KNOWN_COINS.iter() {
            assert_eq!(key, &coin.coin_type);
        }
    }

    #[test]
    fn bridged_coins_carry_provenance() {
        let usdc = &KNOWN_COINS[ETH_WORMHOLE_USDC];
        assert_eq!(usdc.symbol, "USDC");
        assert_eq!(usdc.decimals, 6);
        assert_eq!(usdc.bridge, Some(Bridge::Wormhole));
        assert_eq!(usdc.source_chain, Some(Chain::Eth));

        let sui = &KNOWN_COINS[SUI];
        assert_eq!(sui.decimals, 9);
        assert!(sui.bridge.is_none());
    }
}
