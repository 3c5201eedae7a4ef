// src/events.rs

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::chain_client::value_as_u128;
use crate::error::IndexerError;
use crate::type_args::{outer_generic_args, parse_event_type_args, PoolTypeArgs, TypeArgConvention};

/// A chain event as delivered by the node or a replay file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub parsed_json: Value,
    #[serde(default)]
    pub sender: Option<String>,
    /// Milliseconds since epoch, as a string or number. Empty when unknown.
    #[serde(default)]
    pub timestamp_ms: Option<Value>,
}

impl RawEvent {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let ms = value_as_u128(self.timestamp_ms.as_ref()?)?;
        Utc.timestamp_millis_opt(i64::try_from(ms).ok()?).single()
    }

    /// Short event name: `0xabc::core::SwapTokenX<...>` -> `SwapTokenX`.
    pub fn name(&self) -> &str {
        let head = match self.event_type.find('<') {
            Some(i) => &self.event_type[..i],
            None => &self.event_type,
        };
        head.rsplit("::").next().unwrap_or(head).trim()
    }

    /// Address part of the event type.
    pub fn package(&self) -> &str {
        self.event_type
            .split("::")
            .next()
            .unwrap_or_default()
            .trim()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DexAction {
    PoolCreated {
        value_x: u128,
        value_y: u128,
        shares: u128,
    },
    AddLiquidity {
        amount_x: u128,
        amount_y: u128,
        shares_minted: u128,
    },
    RemoveLiquidity {
        amount_x: u128,
        amount_y: u128,
        shares_destroyed: u128,
    },
    /// X sold for Y.
    SwapX { amount_x_in: u128, amount_y_out: u128 },
    /// Y sold for X.
    SwapY { amount_y_in: u128, amount_x_out: u128 },
}

impl DexAction {
    /// Value of the `kind` label on `events_total`.
    pub fn kind(&self) -> &'static str {
        match self {
            DexAction::PoolCreated { .. } => "pool_created",
            DexAction::AddLiquidity { .. } => "add_liquidity",
            DexAction::RemoveLiquidity { .. } => "remove_liquidity",
            DexAction::SwapX { .. } | DexAction::SwapY { .. } => "swap",
        }
    }

    /// Raw `(x, y)` amounts moved by the event.
    pub fn amounts(&self) -> (u128, u128) {
        match *self {
            DexAction::PoolCreated { value_x, value_y, .. } => (value_x, value_y),
            DexAction::AddLiquidity { amount_x, amount_y, .. }
            | DexAction::RemoveLiquidity { amount_x, amount_y, .. } => (amount_x, amount_y),
            DexAction::SwapX {
                amount_x_in,
                amount_y_out,
            } => (amount_x_in, amount_y_out),
            DexAction::SwapY {
                amount_y_in,
                amount_x_out,
            } => (amount_x_out, amount_y_in),
        }
    }
}

/// A decoded DEX event.
#[derive(Debug, Clone, PartialEq)]
pub struct DexEvent {
    pub pool_id: String,
    pub sender: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub type_args: PoolTypeArgs,
    pub action: DexAction,
}

/// Decodes raw events emitted by one DEX package.
#[derive(Debug, Clone)]
pub struct EventDecoder {
    package_id: String,
}

impl EventDecoder {
    pub fn new(package_id: &str) -> Self {
        Self {
            package_id: normalize_address(package_id),
        }
    }

    pub fn decode(&self, raw: &RawEvent) -> Result<DexEvent, IndexerError> {
        let package = normalize_address(raw.package());
        if package != self.package_id {
            return Err(IndexerError::ForeignPackage(package));
        }

        // Pool lifecycle events carry `Pool<Curve, X, Y>`; swaps carry the
        // arguments flattened.
        let convention = match raw.name() {
            "PoolCreated" | "AddLiquidity" | "RemoveLiquidity" => TypeArgConvention::Nested,
            "SwapTokenX" | "SwapTokenY" => TypeArgConvention::Flattened,
            other => return Err(IndexerError::UnknownEvent(other.to_string())),
        };

        let args = outer_generic_args(&raw.event_type).ok_or_else(|| {
            IndexerError::MalformedTypeArgument(format!(
                "no generic arguments in `{}`",
                raw.event_type
            ))
        })?;
        let type_args = parse_event_type_args(&args, convention)?;

        let data = &raw.parsed_json;
        let action = match raw.name() {
            "PoolCreated" => DexAction::PoolCreated {
                value_x: int_field(data, "value_x")?,
                value_y: int_field(data, "value_y")?,
                shares: int_field(data, "shares")?,
            },
            "AddLiquidity" => DexAction::AddLiquidity {
                amount_x: int_field(data, "coin_x_amount")?,
                amount_y: int_field(data, "coin_y_amount")?,
                shares_minted: int_field(data, "shares_minted")?,
            },
            "RemoveLiquidity" => DexAction::RemoveLiquidity {
                amount_x: int_field(data, "coin_x_out")?,
                amount_y: int_field(data, "coin_y_out")?,
                shares_destroyed: int_field(data, "shares_destroyed")?,
            },
            "SwapTokenX" => DexAction::SwapX {
                amount_x_in: int_field(data, "coin_x_in")?,
                amount_y_out: int_field(data, "coin_y_out")?,
            },
            _ => DexAction::SwapY {
                amount_y_in: int_field(data, "coin_y_in")?,
                amount_x_out: int_field(data, "coin_x_out")?,
            },
        };

        let pool_id = str_field(data, "id")?;
        let sender = match data.get("sender").and_then(Value::as_str) {
            Some(s) => s.to_string(),
            None => raw.sender.clone().unwrap_or_default(),
        };

        Ok(DexEvent {
            pool_id,
            sender,
            timestamp: raw.timestamp(),
            type_args,
            action,
        })
    }
}

/// `0x0002` and `0x2` name the same account.
fn normalize_address(address: &str) -> String {
    let lower = address.trim().to_lowercase();
    let hex = lower.strip_prefix("0x").unwrap_or(&lower);
    let digits = hex.trim_start_matches('0');
    format!("0x{}", if digits.is_empty() { "0" } else { digits })
}

fn int_field(data: &Value, name: &str) -> Result<u128, IndexerError> {
    data.get(name)
        .and_then(value_as_u128)
        .ok_or_else(|| IndexerError::MalformedEvent(format!("missing or invalid `{}`", name)))
}

fn str_field(data: &Value, name: &str) -> Result<String, IndexerError> {
    data.get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| IndexerError::MalformedEvent(format!("missing `{}`", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PKG: &str = "0xd15fcc9307dcf822a6ec40950b8b8331ae2367c4455c568296ed4e1eb8527a75";

    fn pool_created() -> RawEvent {
        serde_json::from_value(json!({
            "type": format!(
                "{pkg}::core::PoolCreated<{pkg}::core::Pool<{pkg}::curve::Volatile, 0x2::sui::SUI, 0xa183e0bb0f2d938be732ccc16709e415ea932f08b8d722d36fe529da2bbd61ea::aipx::AIPX>>",
                pkg = PKG
            ),
            "sender": "0xb4536519beaef9d9207af2b5f83ae35d4ac76cc288ab9004b39254b354149d27",
            "parsedJson": {
                "id": "0x7f3af04cf002a25d15e6d43f89b16abcd6c5fe85b09591efc213e3aaab75c7e5",
                "sender": "0xb4536519beaef9d9207af2b5f83ae35d4ac76cc288ab9004b39254b354149d27",
                "shares": "17782",
                "value_x": "10000000",
                "value_y": "10000000000"
            },
            "timestampMs": ""
        }))
        .unwrap()
    }

    #[test]
    fn decodes_pool_created() {
        let event = EventDecoder::new(PKG).decode(&pool_created()).unwrap();

        assert_eq!(
            event.pool_id,
            "0x7f3af04cf002a25d15e6d43f89b16abcd6c5fe85b09591efc213e3aaab75c7e5"
        );
        assert_eq!(event.type_args.coin_x_type, "0x2::sui::SUI");
        assert!(event.type_args.coin_y_type.ends_with("::aipx::AIPX"));
        assert!(!event.type_args.is_stable);
        assert_eq!(event.timestamp, None);
        assert_eq!(
            event.action,
            DexAction::PoolCreated {
                value_x: 10_000_000,
                value_y: 10_000_000_000,
                shares: 17782
            }
        );
        assert_eq!(event.action.kind(), "pool_created");
    }

    #[test]
    fn decodes_flattened_swap_with_numeric_fields() {
        let raw: RawEvent = serde_json::from_value(json!({
            "type": format!("{pkg}::core::SwapTokenY<{pkg}::curve::Stable, 0x2::sui::SUI, 0x5::usdc::USDC>", pkg = PKG),
            "sender": "0xfeed",
            "parsedJson": { "id": "0xpool", "coin_y_in": 2500, "coin_x_out": "1000" },
            "timestampMs": "1683000000000"
        }))
        .unwrap();

        let event = EventDecoder::new(PKG).decode(&raw).unwrap();
        assert!(event.type_args.is_stable);
        assert_eq!(event.sender, "0xfeed");
        assert_eq!(event.action.amounts(), (1000, 2500));
        assert_eq!(event.action.kind(), "swap");
        assert_eq!(event.timestamp.map(|t| t.timestamp()), Some(1_683_000_000));
    }

    #[test]
    fn package_match_ignores_padding_and_case() {
        let padded = format!("0x000{}", &PKG[2..].to_uppercase());
        assert!(EventDecoder::new(&padded).decode(&pool_created()).is_ok());
    }

    #[test]
    fn rejects_other_packages() {
        let err = EventDecoder::new("0x5c45d10c26c5fb53bfaff819666da6bc7053d2190dfa29fec311cc666ff1f4b0")
            .decode(&pool_created())
            .unwrap_err();
        assert!(matches!(err, IndexerError::ForeignPackage(_)));
    }

    #[test]
    fn rejects_unknown_and_incomplete_events() {
        let decoder = EventDecoder::new(PKG);

        let unknown: RawEvent = serde_json::from_value(json!({
            "type": format!("{}::core::Flashloan<0x2::sui::SUI>", PKG),
            "parsedJson": {}
        }))
        .unwrap();
        assert!(matches!(
            decoder.decode(&unknown),
            Err(IndexerError::UnknownEvent(name)) if name == "Flashloan"
        ));

        let mut missing = pool_created();
        missing.parsed_json = json!({ "id": "0xpool", "value_x": "1" });
        assert!(matches!(
            decoder.decode(&missing),
            Err(IndexerError::MalformedEvent(_))
        ));
    }
}
