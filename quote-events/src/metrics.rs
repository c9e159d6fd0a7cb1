//! Prometheus metrics for quote events

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    /// Total events published
    pub static ref EVENT_PUBLISH_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quote_events_publish_total",
        "Total quote events published",
        &["event_type", "sink", "status"]
    )
    .expect("metric can be created");
}
