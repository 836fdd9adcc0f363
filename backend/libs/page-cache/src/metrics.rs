//! Cache metrics for observability

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    /// Page cache events (hit/miss/write/clear/error).
    pub static ref PAGE_CACHE_EVENTS: IntCounterVec = register_int_counter_vec!(
        "page_cache_events_total",
        "Page cache events segmented by outcome",
        &["event"]
    )
    .expect("failed to register page_cache_events_total");
}

/// Cache metrics wrapper
#[derive(Clone, Copy, Default, Debug)]
pub struct CacheMetrics;

impl CacheMetrics {
    pub fn new() -> Self {
        Self
    }

    pub fn record_hit(&self) {
        PAGE_CACHE_EVENTS.with_label_values(&["hit"]).inc();
    }

    pub fn record_miss(&self) {
        PAGE_CACHE_EVENTS.with_label_values(&["miss"]).inc();
    }

    pub fn record_write(&self) {
        PAGE_CACHE_EVENTS.with_label_values(&["write"]).inc();
    }

    pub fn record_clear(&self) {
        PAGE_CACHE_EVENTS.with_label_values(&["clear"]).inc();
    }

    pub fn record_error(&self) {
        PAGE_CACHE_EVENTS.with_label_values(&["error"]).inc();
    }
}
