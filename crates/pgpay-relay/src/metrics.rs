use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::{LazyLock, Once};
use std::time::Instant;

use pgpay::RelayError;

pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// Relay operation counters
pub static RELAY_REQUESTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("pgpay_relay_requests_total", "Relay operations by outcome"),
        &["operation", "outcome"],
    )
    .unwrap()
});

pub static UPSTREAM_LATENCY: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "pgpay_relay_upstream_duration_seconds",
            "Relay operation latency including NOWPayments round trips",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["operation"],
    )
    .unwrap()
});

// Status callbacks
pub static CALLBACKS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("pgpay_relay_callbacks_total", "Status callbacks received"),
        &["kind", "action"],
    )
    .unwrap()
});

static REGISTER: Once = Once::new();

/// Register all metrics with the registry. Safe to call more than once.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        REGISTRY.register(Box::new(RELAY_REQUESTS.clone())).unwrap();
        REGISTRY
            .register(Box::new(UPSTREAM_LATENCY.clone()))
            .unwrap();
        REGISTRY.register(Box::new(CALLBACKS.clone())).unwrap();
    });
}

/// Record the outcome and latency of one relay operation.
pub fn observe<T>(operation: &str, started: Instant, result: &Result<T, RelayError>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    };
    RELAY_REQUESTS
        .with_label_values(&[operation, outcome])
        .inc();
    UPSTREAM_LATENCY
        .with_label_values(&[operation])
        .observe(started.elapsed().as_secs_f64());
}

/// Text exposition of everything in [`REGISTRY`].
pub fn metrics_output() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_counts_outcome() {
        register_metrics();
        register_metrics();

        let before = RELAY_REQUESTS
            .with_label_values(&["unit-test", "timeout"])
            .get();
        let result: Result<(), RelayError> = Err(RelayError::Timeout);
        observe("unit-test", Instant::now(), &result);
        assert_eq!(
            RELAY_REQUESTS
                .with_label_values(&["unit-test", "timeout"])
                .get(),
            before + 1
        );

        let text = metrics_output().unwrap();
        assert!(text.contains("pgpay_relay_requests_total"));
    }
}
