//! # Type-Argument Parser
//!
//! Recovers pool identity (`coin_x_type`, `coin_y_type`, `is_stable`) from the
//! generic type arguments attached to DEX events and from a pool object's own
//! stored type string.
//!
//! Two conventions are emitted on chain:
//!
//! - **Nested**: a single argument `pkg::core::Pool<Curve, CoinX, CoinY>`
//!   (pool creation and liquidity events).
//! - **Flattened**: three arguments `[Curve, CoinX, CoinY]` (swap events).
//!
//! In both, a pool is stable when the curve tag's last path segment contains
//! `Stable`. Splitting respects nested generics, so coin types such as
//! `0x1::lp::LP<0x2::sui::SUI>` stay intact.

use crate::error::IndexerError;
use crate::types::coin::symbol_from_coin_type;

const STABLE_MARKER: &str = "Stable";

/// Pool identity recovered from a type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolTypeArgs {
    pub curve: String,
    pub coin_x_type: String,
    pub coin_y_type: String,
    pub is_stable: bool,
}

/// Argument layout used by an event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeArgConvention {
    Nested,
    Flattened,
}

/// Splits a comma-separated generic argument list at depth zero, trimming
/// whitespace around each segment.
pub fn split_generic_args(body: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (i, ch) in body.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                out.push(body[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = body[start..].trim();
    if !last.is_empty() || !out.is_empty() {
        out.push(last.to_string());
    }
    out
}

/// Generic arguments of the outermost type in `type_str`, or `None` when the
/// string carries no (balanced) generic list.
pub fn outer_generic_args(type_str: &str) -> Option<Vec<String>> {
    let open = type_str.find('<')?;
    let mut depth = 0usize;
    for (i, ch) in type_str[open..].char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(split_generic_args(&type_str[open + 1..open + i]));
                }
            }
            _ => {}
        }
    }
    None
}

pub fn is_stable_curve(curve: &str) -> bool {
    symbol_from_coin_type(curve).contains(STABLE_MARKER)
}

fn from_segments(segments: &[String], source: &str) -> Result<PoolTypeArgs, IndexerError> {
    if segments.len() < 3 || segments[..3].iter().any(|s| s.is_empty()) {
        return Err(IndexerError::MalformedTypeArgument(format!(
            "expected <Curve, CoinX, CoinY>, got {} segment(s) in `{}`",
            segments.len(),
            source
        )));
    }

    Ok(PoolTypeArgs {
        curve: segments[0].clone(),
        coin_x_type: segments[1].clone(),
        coin_y_type: segments[2].clone(),
        is_stable: is_stable_curve(&segments[0]),
    })
}

/// Parses a pool type string (`Pool<Curve, CoinX, CoinY>`), as found in a
/// nested event argument or in a pool object's `type` field.
pub fn parse_pool_type(pool_type: &str) -> Result<PoolTypeArgs, IndexerError> {
    let segments = outer_generic_args(pool_type).ok_or_else(|| {
        IndexerError::MalformedTypeArgument(format!("no generic arguments in `{}`", pool_type))
    })?;
    from_segments(&segments, pool_type)
}

pub fn parse_nested_type_args<S: AsRef<str>>(args: &[S]) -> Result<PoolTypeArgs, IndexerError> {
    let first = args
        .first()
        .ok_or_else(|| IndexerError::MalformedTypeArgument("empty type argument list".to_string()))?;
    parse_pool_type(first.as_ref())
}

pub fn parse_flattened_type_args<S: AsRef<str>>(args: &[S]) -> Result<PoolTypeArgs, IndexerError> {
    let segments: Vec<String> = args.iter().map(|s| s.as_ref().trim().to_string()).collect();
    from_segments(&segments, &segments.join(", "))
}

pub fn parse_event_type_args<S: AsRef<str>>(
    args: &[S],
    convention: TypeArgConvention,
) -> Result<PoolTypeArgs, IndexerError> {
    match convention {
        TypeArgConvention::Nested => parse_nested_type_args(args),
        TypeArgConvention::Flattened => parse_flattened_type_args(args),
    }
}
