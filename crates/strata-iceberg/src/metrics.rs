//! Sink routing metrics.
//!
//! Counters are recorded through the `metrics` facade; they are no-ops until
//! the embedding process installs a recorder.

use std::sync::Once;

use metrics::{counter, describe_counter};

// ============================================================================
// Routing Metrics
// ============================================================================

/// Records routed to a writer task.
pub const RECORDS_ROUTED: &str = "strata_sink_records_routed_total";

/// Records that failed to route, labelled by `reason`.
pub const ROUTING_ERRORS: &str = "strata_sink_routing_errors_total";

// ============================================================================
// Metric Registration
// ============================================================================

static REGISTER: Once = Once::new();

/// Registers all sink metric descriptions.
///
/// Call this at startup after installing the metrics recorder. Later calls
/// are no-ops.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        describe_counter!(RECORDS_ROUTED, "Total records routed to writer tasks");
        describe_counter!(ROUTING_ERRORS, "Total records that failed to route");
    });
}

// ============================================================================
// Metric Recording
// ============================================================================

/// Records a successfully routed record.
pub fn record_routed() {
    counter!(RECORDS_ROUTED).increment(1);
}

/// Records a routing failure.
pub fn record_routing_error(reason: &'static str) {
    counter!(ROUTING_ERRORS, "reason" => reason).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        register_metrics();
        record_routed();
        record_routing_error("null_bucket");
        register_metrics();
    }
}
