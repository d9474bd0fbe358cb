//! Prometheus metrics.
//!
//! Label values are bounded: phases are bucketed to the three known names
//! plus `"__unknown__"` because phase strings come from untrusted input.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::PhoenixError;
use crate::phase::Phase;

static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Installs the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. Must be called from within a tokio runtime in that
/// case.
///
/// # Errors
///
/// Returns `PhoenixError::Io` if the recorder or listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), PhoenixError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| PhoenixError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

fn describe_metrics() {
    describe_counter!("phoenix_readings_total", "Readings evaluated");
    describe_counter!(
        "phoenix_phase_transitions_total",
        "Readings that changed the phase"
    );
    describe_counter!(
        "phoenix_mitigations_total",
        "Mitigations recommended, by kind"
    );
    describe_counter!(
        "phoenix_events_skipped_total",
        "Input lines skipped as malformed"
    );
}

/// Buckets a phase string into a bounded label.
#[must_use]
pub fn sanitize_phase_label(name: &str) -> &'static str {
    Phase::from_name(name).map_or("__unknown__", Phase::as_str)
}

/// Records one evaluated reading.
pub fn record_reading(phase: &str) {
    counter!("phoenix_readings_total", "phase" => sanitize_phase_label(phase)).increment(1);
}

/// Records a phase transition.
pub fn record_phase_transition(from: Phase, to: Phase) {
    counter!(
        "phoenix_phase_transitions_total",
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);
}

/// Records a recommended mitigation.
pub fn record_mitigation(kind: &'static str) {
    counter!("phoenix_mitigations_total", "kind" => kind).increment(1);
}

/// Records a skipped input line.
pub fn record_skipped(reason: &'static str) {
    counter!("phoenix_events_skipped_total", "reason" => reason).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_known_phases() {
        assert_eq!(sanitize_phase_label("normal"), "Normal");
        assert_eq!(sanitize_phase_label("NIGREDO"), "Nigredo");
        assert_eq!(sanitize_phase_label("Rubedo"), "Rubedo");
    }

    #[test]
    fn sanitize_unknown_phase() {
        assert_eq!(sanitize_phase_label("evil\"label"), "__unknown__");
        assert_eq!(sanitize_phase_label(&"x".repeat(10_000)), "__unknown__");
    }

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        // metrics macros no-op when no global recorder is installed
        record_reading("Normal");
        record_phase_transition(Phase::Normal, Phase::Nigredo);
        record_mitigation("rate_limit");
        record_skipped("invalid_json");
    }
}
