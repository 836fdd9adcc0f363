use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    /// Listing pages served, by scope (all, group, author, follow).
    pub static ref FEED_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blog_feed_requests_total",
        "Listing pages served segmented by scope",
        &["scope"]
    )
    .expect("failed to register blog_feed_requests_total");

    /// Follow/unfollow requests by outcome.
    pub static ref FOLLOW_EVENTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blog_follow_events_total",
        "Follow and unfollow requests segmented by outcome",
        &["outcome"]
    )
    .expect("failed to register blog_follow_events_total");
}

pub fn record_feed_request(scope: &str) {
    FEED_REQUESTS_TOTAL.with_label_values(&[scope]).inc();
}

pub fn record_follow_event(outcome: &str) {
    FOLLOW_EVENTS_TOTAL.with_label_values(&[outcome]).inc();
}
