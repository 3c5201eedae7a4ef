// src/metrics.rs

#[cfg(feature = "observability")]
pub use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit,
};

use crate::aggregator::{
    Measurement, LIQUIDITY_ADDED_USD, LIQUIDITY_REMOVED_USD, RESERVES_X, RESERVES_Y,
    TRADING_VOLUME_USD, TVL_BY_COIN, TVL_BY_POOL, VOL_BY_COIN, VOL_BY_POOL,
};
#[cfg(feature = "observability")]
use crate::aggregator::MeasurementKind;

// NOTE: When observability feature is disabled, provide stub implementations
#[cfg(not(feature = "observability"))]
pub enum Unit {
    Count,
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! counter {
    ($name:expr, $value:expr $(, $label:expr => $label_value:expr)* $(,)?) => {{
        let _ = $value;
        $( let _ = (&$label, &$label_value); )*
    }};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! gauge {
    ($name:expr, $value:expr $(, $label:expr => $label_value:expr)* $(,)?) => {{
        let _ = $value;
        $( let _ = (&$label, &$label_value); )*
    }};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! histogram {
    ($name:expr, $value:expr $(, $label:expr => $label_value:expr)* $(,)?) => {{
        let _ = $value;
        $( let _ = (&$label, &$label_value); )*
    }};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! describe_counter {
    ($name:expr, $unit:expr, $desc:expr) => {};
    ($name:expr, $desc:expr) => {};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! describe_gauge {
    ($name:expr, $unit:expr, $desc:expr) => {};
    ($name:expr, $desc:expr) => {};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! describe_histogram {
    ($name:expr, $unit:expr, $desc:expr) => {};
    ($name:expr, $desc:expr) => {};
}

/// Registers descriptions for every metric the indexer emits.
/// Call once at startup, after the recorder is installed.
pub fn describe_metrics() {
    describe_gauge!(TVL_BY_POOL, "Pool TVL in USD, from the latest reserve snapshot.");
    describe_gauge!(TVL_BY_COIN, "Per-coin share of pool TVL in USD.");
    describe_histogram!(VOL_BY_POOL, "USD volume of each swap or liquidity event per pool.");
    describe_histogram!(VOL_BY_COIN, "Per-coin USD volume of each event.");
    describe_histogram!(LIQUIDITY_ADDED_USD, "USD value of each liquidity deposit.");
    describe_histogram!(LIQUIDITY_REMOVED_USD, "USD value of each liquidity withdrawal.");
    describe_gauge!(TRADING_VOLUME_USD, "USD swap volume per pool since startup.");
    describe_gauge!(RESERVES_X, "Decimal-adjusted reserve of the pool's first coin.");
    describe_gauge!(RESERVES_Y, "Decimal-adjusted reserve of the pool's second coin.");

    describe_counter!(
        "events_total",
        Unit::Count,
        "DEX events processed, labeled by kind and project."
    );
    describe_counter!(
        "snapshot_failures_total",
        Unit::Count,
        "Pools skipped during a reserve snapshot."
    );
    describe_counter!("cache_hits_total", Unit::Count, "Cache hits, labeled by cache.");
    describe_counter!("cache_miss_total", Unit::Count, "Cache misses, labeled by cache.");
    describe_gauge!("cache_size_gauge", "Entries held per cache.");
}

/// Records a measurement with its labels, as a gauge or a histogram sample.
pub fn record_measurement(measurement: &Measurement) {
    #[cfg(feature = "observability")]
    {
        let labels: Vec<metrics::Label> = measurement
            .labels
            .iter()
            .map(|(k, v)| metrics::Label::new(*k, v.clone()))
            .collect();
        match measurement.kind() {
            MeasurementKind::Gauge => gauge!(measurement.name, measurement.value, labels),
            MeasurementKind::Histogram => histogram!(measurement.name, measurement.value, labels),
        }
    }
    #[cfg(not(feature = "observability"))]
    let _ = measurement;
}

pub fn record_measurements(measurements: &[Measurement]) {
    for m in measurements {
        record_measurement(m);
    }
}

pub fn increment_events(kind: &str, project: &str) {
    counter!("events_total", 1, "kind" => kind.to_string(), "project" => project.to_string());
}

pub fn increment_snapshot_failure(pool_id: &str) {
    counter!("snapshot_failures_total", 1, "pool_id" => pool_id.to_string());
}

pub fn increment_cache_hit(cache_name: &str) {
    counter!("cache_hits_total", 1, "cache" => cache_name.to_string());
}

pub fn increment_cache_miss(cache_name: &str) {
    counter!("cache_miss_total", 1, "cache" => cache_name.to_string());
}

pub fn set_cache_size(cache_name: &str, size: f64) {
    gauge!("cache_size_gauge", size, "cache" => cache_name.to_string());
}
