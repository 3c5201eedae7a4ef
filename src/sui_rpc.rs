// src/sui_rpc.rs

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::{timeout, Duration};

use crate::chain_client::{ChainClient, ObjectState};
use crate::error::ClientError;
use crate::settings::Rpc;
use crate::types::CoinMetadata;

type DefaultDirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ObjectResponse {
    data: Option<ObjectData>,
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ObjectData {
    #[serde(rename = "type")]
    object_type: Option<String>,
    content: Option<ObjectContent>,
}

#[derive(Debug, Deserialize)]
struct ObjectContent {
    #[serde(rename = "type")]
    object_type: Option<String>,
    #[serde(default)]
    fields: serde_json::Map<String, Value>,
}

/// JSON-RPC client for a Sui full node.
pub struct SuiRpcClient {
    url: String,
    client: reqwest::Client,
    request_timeout: Duration,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
    next_id: AtomicU64,
}

impl SuiRpcClient {
    pub fn new(settings: &Rpc) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let limiter = settings
            .qps_limit
            .and_then(NonZeroU32::new)
            .map(|qps| Arc::new(RateLimiter::direct(Quota::per_second(qps))));

        Ok(Self {
            url: settings.url.clone(),
            client,
            request_timeout: Duration::from_millis(settings.request_timeout_ms),
            limiter,
            next_id: AtomicU64::new(1),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<Option<T>, ClientError> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        let body = json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });

        let request = async {
            let response = self.client.post(&self.url).json(&body).send().await?;
            if response.status().as_u16() == 429 {
                return Err(ClientError::RateLimited);
            }
            let response = response.error_for_status()?;
            Ok(response.json::<RpcResponse<T>>().await?)
        };

        let response = timeout(self.request_timeout, request)
            .await
            .map_err(|_| ClientError::Timeout(self.request_timeout.as_millis() as u64))??;

        if let Some(err) = response.error {
            debug!("{} failed: {} ({})", method, err.message, err.code);
            return Err(ClientError::InvalidResponse(format!(
                "{}: {} ({})",
                method, err.message, err.code
            )));
        }
        Ok(response.result)
    }
}

#[async_trait]
impl ChainClient for SuiRpcClient {
    async fn fetch_object_state(&self, object_id: &str) -> Result<ObjectState, ClientError> {
        let response: ObjectResponse = self
            .call(
                "sui_getObject",
                json!([object_id, { "showType": true, "showContent": true }]),
            )
            .await?
            .ok_or_else(|| ClientError::InvalidResponse("empty sui_getObject result".to_string()))?;

        if let Some(err) = response.error {
            return Err(ClientError::NotFound(format!("{}: {}", object_id, err)));
        }
        let data = response
            .data
            .ok_or_else(|| ClientError::NotFound(object_id.to_string()))?;

        let content = data.content;
        let object_type = data
            .object_type
            .or_else(|| content.as_ref().and_then(|c| c.object_type.clone()))
            .ok_or_else(|| ClientError::InvalidResponse(format!("no type for {}", object_id)))?;

        Ok(ObjectState {
            object_type,
            fields: content
                .map(|c| c.fields.into_iter().collect())
                .unwrap_or_default(),
        })
    }

    async fn fetch_coin_metadata(
        &self,
        coin_type: &str,
    ) -> Result<Option<CoinMetadata>, ClientError> {
        self.call("suix_getCoinMetadata", json!([coin_type])).await
    }
}
