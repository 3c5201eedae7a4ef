// Decimal adjustment between raw on-chain integer amounts and human units.
//
// Zero-decimal coins are treated as already human-scaled, which is also what
// fallback metadata (decimals = 0) relies on.

/// Raw integer amount -> human units (`raw / 10^decimals`).
pub fn remove_decimals(raw: u128, decimals: u8) -> f64 {
    if decimals > 0 {
        raw as f64 / 10f64.powi(decimals as i32)
    } else {
        raw as f64
    }
}

/// Human units -> raw integer scale, as a float.
pub fn add_decimals(value: f64, decimals: u8) -> f64 {
    if decimals > 0 {
        value * 10f64.powi(decimals as i32)
    } else {
        value
    }
}
