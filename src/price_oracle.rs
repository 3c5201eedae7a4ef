// src/price_oracle.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use tokio::time::{timeout, Duration};

use crate::chain_client::PriceOracle;
use crate::error::ClientError;
use crate::metrics;
use crate::settings::{PriceFeeds, SuiNetwork};
use crate::types::coin::settings_key;

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    market_data: Option<MarketData>,
}

#[derive(Debug, Deserialize)]
struct MarketData {
    current_price: HashMap<String, f64>,
}

/// Daily USD prices from CoinGecko's `coins/{id}/history` endpoint.
///
/// Quotes are cached per (coin id, day). A missing quote is cached only for
/// past days, since the current day may still get one. Only mainnet coins
/// are priced.
pub struct CoinGeckoOracle {
    base_url: String,
    client: reqwest::Client,
    request_timeout: Duration,
    /// [`settings_key`] of a coin type -> CoinGecko id.
    ids: HashMap<String, String>,
    cache: DashMap<(String, String), Option<f64>>,
}

impl CoinGeckoOracle {
    pub fn new(settings: &PriceFeeds) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client,
            request_timeout: Duration::from_millis(settings.request_timeout_ms),
            ids: settings
                .coingecko_ids
                .iter()
                .map(|(coin_type, id)| (settings_key(coin_type), id.clone()))
                .collect(),
            cache: DashMap::new(),
        })
    }

    pub fn coingecko_id(&self, coin_type: &str) -> Option<&str> {
        self.ids.get(&settings_key(coin_type)).map(String::as_str)
    }

    async fn fetch_history(&self, id: &str, date: &str) -> Result<Option<f64>, ClientError> {
        let url = format!("{}/coins/{}/history", self.base_url, id);
        let request = async {
            let response = self
                .client
                .get(&url)
                .query(&[("date", date), ("localization", "false")])
                .send()
                .await?;
            if response.status().as_u16() == 429 {
                return Err(ClientError::RateLimited);
            }
            if response.status().as_u16() == 404 {
                return Ok(None);
            }
            let body: HistoryResponse = response.error_for_status()?.json().await?;
            Ok(body
                .market_data
                .and_then(|m| m.current_price.get("usd").copied()))
        };

        timeout(self.request_timeout, request)
            .await
            .map_err(|_| ClientError::Timeout(self.request_timeout.as_millis() as u64))?
    }
}

#[async_trait]
impl PriceOracle for CoinGeckoOracle {
    async fn get_price_by_type(
        &self,
        network: SuiNetwork,
        coin_type: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<f64>, ClientError> {
        if network != SuiNetwork::MainNet {
            return Ok(None);
        }
        let Some(id) = self.coingecko_id(coin_type).map(str::to_string) else {
            debug!("No CoinGecko id for {}", coin_type);
            return Ok(None);
        };

        let date = at.format("%d-%m-%Y").to_string();
        let key = (id, date);
        if let Some(hit) = self.cache.get(&key) {
            metrics::increment_cache_hit("price");
            return Ok(*hit.value());
        }
        metrics::increment_cache_miss("price");

        let price = self.fetch_history(&key.0, &key.1).await?;
        if !is_cacheable(price, at.date_naive(), Utc::now().date_naive()) {
            return Ok(price);
        }
        let stored = *self.cache.entry(key).or_insert(price).value();
        Ok(stored)
    }
}

fn is_cacheable(price: Option<f64>, day: NaiveDate, today: NaiveDate) -> bool {
    price.is_some() || day < today
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coins;

    #[test]
    fn maps_padded_coin_types_to_ids() {
        let oracle = CoinGeckoOracle::new(&PriceFeeds::default()).unwrap();
        assert_eq!(oracle.coingecko_id(coins::SUI), Some("sui"));
        assert_eq!(
            oracle.coingecko_id(
                "0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI"
            ),
            Some("sui")
        );
        assert_eq!(oracle.coingecko_id("0xabc::meme::MEME"), None);
    }

    #[test]
    fn history_response_reads_usd_quote() {
        let body: HistoryResponse = serde_json::from_str(
            r#"{"id":"sui","market_data":{"current_price":{"usd":1.25,"eur":1.1}}}"#,
        )
        .unwrap();
        let usd = body.market_data.and_then(|m| m.current_price.get("usd").copied());
        assert_eq!(usd, Some(1.25));
    }

    #[test]
    fn missing_quote_is_cached_only_for_past_days() {
        let today = NaiveDate::from_ymd_opt(2023, 5, 2).unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();

        assert!(is_cacheable(Some(1.0), today, today));
        assert!(is_cacheable(None, yesterday, today));
        assert!(!is_cacheable(None, today, today));
    }

    #[tokio::test]
    async fn unknown_coin_and_testnet_have_no_price() {
        let oracle = CoinGeckoOracle::new(&PriceFeeds::default()).unwrap();
        let now = Utc::now();
        assert_eq!(
            oracle
                .get_price_by_type(SuiNetwork::MainNet, "0xabc::meme::MEME", now)
                .await,
            Ok(None)
        );
        assert_eq!(
            oracle
                .get_price_by_type(SuiNetwork::TestNet, coins::SUI, now)
                .await,
            Ok(None)
        );
    }
}
