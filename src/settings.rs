use config::{Config, ConfigError, File, FileFormat};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;

use crate::aggregator::Whitelist;
use crate::coins;

pub const DEFAULT_PACKAGE_ID: &str =
    "0x5c45d10c26c5fb53bfaff819666da6bc7053d2190dfa29fec311cc666ff1f4b0";

/// Pools whose USD metrics are published by default.
pub const DEFAULT_WHITELISTED_POOLS: [&str; 22] = [
    // SUI/BTCB (BSC-wormhole)
    "0xd9856ab45adec800dfa7887815422ac8f55607baeeb4a08b86c5d0ebd6ce1ec7",
    // SUI/ETH (ETH-wormhole)
    "0x8f41de61cdc1ee379cadd7889dd588fcab62552e48959d027ba1d8839c027771",
    // SUI/ETH (BSC-wormhole)
    "0x4e66be98b0b6f560d9c9e6ac6845e43a87f7a0f7c22679da992963122616daa8",
    // SUI/WBNB
    "0x8fc0924fda0700bfa3c2a21a71ad02205547673c03bb4c131a6fa15831fec73f",
    // SUI/USDC (ETH-wormhole)
    "0x85e87655a47628098b5fc2e62d4926c6384e0430f2eae60cf9c692562b688702",
    // SUI/USDT (ETH-wormhole)
    "0x9fc77859750974b84b931d79acfc7116abde230b5dd2bb164331819561b90771",
    // SUI/USDC (BSC-wormhole)
    "0xb05544f109fc1f77e4dbdfd1c42ac1585c52f31984371c677c7a47674de2f8b3",
    // SUI/USDT (BSC-wormhole)
    "0x7e735695049e3e1e14d86768da12d0465d3b37b797ff6f775bd76225e331d457",
    // SUI/SOL
    "0xb5d8ff88e9093847d2bed1c11faa4884aa56f286e662c58f0e1a424939300a1c",
    // SUI/ADA
    "0x31186ba7ba3d79e78a21d8282987bae0f78230a755734440bad931a9b06b10f1",
    // SUI/MATIC
    "0x877a542a5e9e8b5b71b5ff62d37774820fbb2230bea3bb9dec76e25e126e6268",
    // SUI/WAVAX
    "0xfadbbca64245714cbd22f85f0d74cdba0a595e585155a2e2223de6e69400c7d2",
    // SUI/WFTM
    "0xa8385d3ae4378c610d355085cf01e565ab5c8e3e80d27e32d7b2a93fad7af583",
    // SUI/CELO
    "0x40ffe408f84b562677cfbdc2a081abc3618642d98d8208675dc42a87589a31dd",
    // SUI/DOGE
    "0x7fc6556f6dcbdc1e639154eb71d9364f21b0845e944a7c4de7cec11abe1e0554",
    // SUI/FLOKI
    "0x2d5f55761fd1dfdbb078e8d1ed11e1b6a35e162577e8c09eba1cc656c297b6b7",
    // USDC (ETH-wormhole) / USDC (BSC-wormhole)
    "0x7ee34a0ffc65c89e07312928291e6a0bcc8628513c6f3faf32cc4b4d0815ba3a",
    // USDC (ETH-wormhole) / USDT (ETH-wormhole)
    "0x9b7ef251c98bf6990f70f45bfd012de5308483ae2fa0d8e39f559323baacf9ca",
    // USDT (BSC-wormhole) / USDC (BSC-wormhole)
    "0x8f6c873aa5f680390aae092c4c62e7a755d602a6492eefdc02122400cf34f7e2",
    // SUI/WETH (Celer)
    "0x6506cb8cdd7edac437822881ddfd178ad3a09066d83f505c87999b1e3f595210",
    // SUI/BTC (Celer)
    "0x3604dcc9514a375d0d0a076fdde63ea8890ca59e00d105e52d4de7c32c09b621",
    // SUI/USDC (Celer)
    "0x148968a14fae894eb39397802c3dd1173a3851d239f5d71672a22fb5931d3658",
];

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SuiNetwork {
    #[default]
    #[serde(alias = "main_net")]
    MainNet,
    #[serde(alias = "test_net")]
    TestNet,
}

impl SuiNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuiNetwork::MainNet => "mainnet",
            SuiNetwork::TestNet => "testnet",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Rpc {
    #[serde(default = "default_rpc_url")]
    pub url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Requests per second; unlimited when unset.
    #[serde(default)]
    pub qps_limit: Option<u32>,
}

fn default_rpc_url() -> String {
    "https://fullnode.mainnet.sui.io:443".to_string()
}
fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for Rpc {
    fn default() -> Self {
        Self {
            url: default_rpc_url(),
            request_timeout_ms: default_request_timeout_ms(),
            qps_limit: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PriceFeeds {
    #[serde(default = "default_price_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Coin type -> CoinGecko coin id.
    #[serde(default = "default_coingecko_ids")]
    pub coingecko_ids: HashMap<String, String>,
    /// Coin type -> coin type to quote instead (e.g. a bridged variant priced
    /// as its canonical coin).
    #[serde(default)]
    pub price_aliases: HashMap<String, String>,
}

fn default_price_base_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_coingecko_ids() -> HashMap<String, String> {
    [
        (coins::SUI, "sui"),
        (coins::ETH_WORMHOLE_USDC, "usd-coin"),
        (coins::BSC_WORMHOLE_USDC, "usd-coin"),
        (coins::ETH_WORMHOLE_USDT, "tether"),
        (coins::BSC_WORMHOLE_USDT, "tether"),
        (coins::NATIVE_WORMHOLE_ETH, "ethereum"),
        (coins::BSC_WORMHOLE_ETH, "ethereum"),
        (coins::NATIVE_WORMHOLE_WBNB, "binancecoin"),
        (coins::NATIVE_WORMHOLE_WAVAX, "avalanche-2"),
        (coins::NATIVE_WORMHOLE_WFTM, "fantom"),
        (coins::NATIVE_WORMHOLE_CELO, "celo"),
        (coins::NATIVE_WORMHOLE_WMATIC, "matic-network"),
        (coins::NATIVE_WORMHOLE_SOL, "solana"),
        (coins::BSC_WORMHOLE_ADA, "cardano"),
        (coins::BSC_WORMHOLE_BTCB, "bitcoin"),
        (coins::BSC_WORMHOLE_FLOKI, "floki"),
        (coins::BSC_WORMHOLE_DOGE, "dogecoin"),
    ]
    .into_iter()
    .map(|(coin_type, id)| (coin_type.to_string(), id.to_string()))
    .collect()
}

impl Default for PriceFeeds {
    fn default() -> Self {
        Self {
            base_url: default_price_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
            coingecko_ids: default_coingecko_ids(),
            price_aliases: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Snapshot {
    #[serde(default = "default_snapshot_interval_seconds")]
    pub interval_seconds: u64,
    /// Pools read concurrently per round trip.
    #[serde(default = "default_snapshot_batch_size")]
    pub batch_size: usize,
}

fn default_snapshot_interval_seconds() -> u64 {
    240
}
fn default_snapshot_batch_size() -> usize {
    60
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            interval_seconds: default_snapshot_interval_seconds(),
            batch_size: default_snapshot_batch_size(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WhitelistSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_whitelisted_pools")]
    pub pools: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_whitelisted_pools() -> Vec<String> {
    DEFAULT_WHITELISTED_POOLS
        .iter()
        .map(|p| p.to_string())
        .collect()
}

impl Default for WhitelistSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            pools: default_whitelisted_pools(),
        }
    }
}

impl WhitelistSettings {
    pub fn to_whitelist(&self) -> Whitelist {
        if self.enabled {
            Whitelist::new(&self.pools)
        } else {
            Whitelist::allow_all()
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

fn default_metrics_port() -> u16 {
    9090
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub network: SuiNetwork,
    #[serde(default = "default_package_id")]
    pub package_id: String,
    #[serde(default = "default_start_checkpoint")]
    pub start_checkpoint: u64,
    /// Value of the `project` label on every metric.
    #[serde(default = "default_project")]
    pub project: String,
    #[serde(default)]
    pub rpc: Rpc,
    #[serde(default)]
    pub price_feeds: PriceFeeds,
    #[serde(default)]
    pub snapshot: Snapshot,
    #[serde(default)]
    pub whitelist: WhitelistSettings,
    #[serde(default)]
    pub metrics: MetricsSettings,
    #[serde(default)]
    pub log: LogSettings,
}

fn default_package_id() -> String {
    DEFAULT_PACKAGE_ID.to_string()
}
fn default_start_checkpoint() -> u64 {
    1_500_000
}
fn default_project() -> String {
    "dex".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            network: SuiNetwork::default(),
            package_id: default_package_id(),
            start_checkpoint: default_start_checkpoint(),
            project: default_project(),
            rpc: Rpc::default(),
            price_feeds: PriceFeeds::default(),
            snapshot: Snapshot::default(),
            whitelist: WhitelistSettings::default(),
            metrics: MetricsSettings::default(),
            log: LogSettings::default(),
        }
    }
}

impl Settings {
    /// Loads `Config.toml` from the working directory (if present) and applies
    /// environment overrides.
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_file("Config.toml")
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .build()?;

        let mut settings: Self = s.try_deserialize()?;
        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Parses settings from TOML text without environment overrides.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("DEX_RPC_URL") {
            let trimmed = url.trim();
            if !trimmed.is_empty() {
                self.rpc.url = trimmed.to_string();
            }
        }

        if let Ok(package) = env::var("DEX_PACKAGE_ID") {
            let trimmed = package.trim();
            if !trimmed.is_empty() {
                self.package_id = trimmed.to_string();
            }
        }

        if let Ok(raw) = env::var("DEX_WHITELIST") {
            if let Some(list) = parse_string_list(&raw) {
                if !list.is_empty() {
                    self.whitelist.pools = list;
                }
            }
        }
    }
}

/// Accepts a JSON array or a comma separated list.
fn parse_string_list(input: &str) -> Option<Vec<String>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Some(vec![]);
    }

    if trimmed.starts_with('[') {
        if let Ok(v) = serde_json::from_str::<Vec<String>>(trimmed) {
            return Some(v);
        }
        let without_brackets = trimmed.trim_start_matches('[').trim_end_matches(']');
        return Some(split_list(without_brackets));
    }

    Some(split_list(trimmed))
}

fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().trim_matches('"').trim_matches('\'').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings.network, SuiNetwork::MainNet);
        assert_eq!(settings.package_id, DEFAULT_PACKAGE_ID);
        assert_eq!(settings.start_checkpoint, 1_500_000);
        assert_eq!(settings.snapshot.interval_seconds, 240);
        assert_eq!(settings.snapshot.batch_size, 60);
        assert_eq!(settings.whitelist.pools.len(), 22);
        assert!(settings.whitelist.enabled);
        assert_eq!(settings.log.format, LogFormat::Pretty);
        assert_eq!(
            settings.price_feeds.coingecko_ids.get(coins::SUI).map(String::as_str),
            Some("sui")
        );
    }

    #[test]
    fn sections_override_defaults() {
        let settings = Settings::from_toml_str(
            r#"
            network = "testnet"
            project = "test-dex"

            [rpc]
            url = "http://127.0.0.1:9000"
            qps_limit = 20

            [snapshot]
            batch_size = 5

            [whitelist]
            enabled = false

            [log]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(settings.network, SuiNetwork::TestNet);
        assert_eq!(settings.project, "test-dex");
        assert_eq!(settings.rpc.url, "http://127.0.0.1:9000");
        assert_eq!(settings.rpc.qps_limit, Some(20));
        assert_eq!(settings.rpc.request_timeout_ms, 10_000);
        assert_eq!(settings.snapshot.batch_size, 5);
        assert_eq!(settings.snapshot.interval_seconds, 240);
        assert_eq!(settings.log.format, LogFormat::Json);
        assert!(settings.whitelist.to_whitelist().allows("0xanything"));
    }

    #[test]
    fn default_whitelist_gates_unknown_pools() {
        let wl = Settings::default().whitelist.to_whitelist();
        assert!(wl.allows(DEFAULT_WHITELISTED_POOLS[0]));
        assert!(!wl.allows("0xdeadbeef"));
    }

    #[test]
    fn parses_json_and_comma_lists() {
        assert_eq!(
            parse_string_list(r#"["0xa", "0xb"]"#),
            Some(vec!["0xa".to_string(), "0xb".to_string()])
        );
        assert_eq!(
            parse_string_list("0xa, 0xb ,"),
            Some(vec!["0xa".to_string(), "0xb".to_string()])
        );
        assert_eq!(
            parse_string_list("[0xa,0xb]"),
            Some(vec!["0xa".to_string(), "0xb".to_string()])
        );
        assert_eq!(parse_string_list("  "), Some(vec![]));
    }
}
