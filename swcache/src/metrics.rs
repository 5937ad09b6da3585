//! Metrics declaration and recording.
//!
//! Enabled by the `metrics` feature. Without it every `record_*` function is
//! an empty inline function.

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    // Interception

    /// Requests answered, labelled by route and source.
    pub static ref RESPONSES_SERVED: &'static str = {
        metrics::describe_counter!(
            "swcache_responses_total",
            "Total number of intercepted requests answered."
        );
        "swcache_responses_total"
    };
    /// Requests that could not be answered at all.
    pub static ref RESPONSES_UNAVAILABLE: &'static str = {
        metrics::describe_counter!(
            "swcache_unavailable_total",
            "Total number of intercepted requests that failed offline."
        );
        "swcache_unavailable_total"
    };
    /// Histogram of interception duration.
    pub static ref RESPONSE_DURATION: &'static str = {
        metrics::describe_histogram!(
            "swcache_response_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of intercepted requests in seconds."
        );
        "swcache_response_duration_seconds"
    };

    // Maintenance

    /// Entries removed by the expiry sweep.
    pub static ref ENTRIES_EXPIRED: &'static str = {
        metrics::describe_counter!(
            "swcache_entries_expired_total",
            "Total number of entries removed by the expiry sweep."
        );
        "swcache_entries_expired_total"
    };
    /// Namespaces removed at activation.
    pub static ref NAMESPACES_REMOVED: &'static str = {
        metrics::describe_counter!(
            "swcache_namespaces_removed_total",
            "Total number of superseded namespaces removed at activation."
        );
        "swcache_namespaces_removed_total"
    };

    // Background refreshes

    /// Refreshes spawned after a stale-while-revalidate hit.
    pub static ref REFRESHES_STARTED: &'static str = {
        metrics::describe_counter!(
            "swcache_refreshes_started_total",
            "Total number of background refreshes spawned."
        );
        "swcache_refreshes_started_total"
    };
    /// Refreshes skipped because one for the same request was running.
    pub static ref REFRESHES_SKIPPED: &'static str = {
        metrics::describe_counter!(
            "swcache_refreshes_skipped_total",
            "Total number of refreshes skipped because one was already in flight."
        );
        "swcache_refreshes_skipped_total"
    };
    /// Histogram of refresh duration.
    pub static ref REFRESH_DURATION: &'static str = {
        metrics::describe_histogram!(
            "swcache_refresh_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of background refreshes in seconds."
        );
        "swcache_refresh_duration_seconds"
    };
}

/// Records one answered request.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_response(route: &'static str, source: &str, duration: std::time::Duration) {
    metrics::counter!(*RESPONSES_SERVED, "route" => route, "source" => source.to_string())
        .increment(1);
    metrics::histogram!(*RESPONSE_DURATION, "route" => route).record(duration.as_secs_f64());
}

/// No-op version when the metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_response(_route: &'static str, _source: &str, _duration: std::time::Duration) {}

/// Records a request that failed with no cached answer.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_unavailable(route: &'static str) {
    metrics::counter!(*RESPONSES_UNAVAILABLE, "route" => route).increment(1);
}

/// No-op version when the metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_unavailable(_route: &'static str) {}

/// Records entries removed by the expiry sweep.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_expired(count: usize) {
    metrics::counter!(*ENTRIES_EXPIRED).increment(count as u64);
}

/// No-op version when the metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_expired(_count: usize) {}

/// Records namespaces removed at activation.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_namespaces_removed(count: usize) {
    metrics::counter!(*NAMESPACES_REMOVED).increment(count as u64);
}

/// No-op version when the metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_namespaces_removed(_count: usize) {}

/// Records a spawned background refresh.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_refresh_started() {
    metrics::counter!(*REFRESHES_STARTED).increment(1);
}

/// No-op version when the metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_refresh_started() {}

/// Records a refresh skipped because one was already running.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_refresh_skipped() {
    metrics::counter!(*REFRESHES_SKIPPED).increment(1);
}

/// No-op version when the metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_refresh_skipped() {}

/// Records how long a background refresh ran.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_refresh_finished(duration: std::time::Duration) {
    metrics::histogram!(*REFRESH_DURATION).record(duration.as_secs_f64());
}

/// No-op version when the metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_refresh_finished(_duration: std::time::Duration) {}
