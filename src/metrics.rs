use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all wallet metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();
    Ok(handle)
}

/// A handle backed by a recorder that is not installed globally.
/// Used where the process-wide recorder is already taken (tests).
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

/// Register every wallet metric at zero on the current recorder.
pub fn register_metrics() {
    // Pre-register counters so they appear even before the first increment.
    for resource in ["balance", "sold_orders", "payouts"] {
        counter!("wallet_fetch_total", "resource" => resource).absolute(0);
        counter!("wallet_fetch_failures_total", "resource" => resource).absolute(0);
    }
    counter!("wallet_loads_total", "outcome" => "ready").absolute(0);
    counter!("wallet_loads_total", "outcome" => "error").absolute(0);
    counter!("payout_requests_total").absolute(0);
    counter!("payout_failures_total").absolute(0);
    gauge!("wallet_active_sessions").set(0.0);

    histogram!("wallet_load_seconds").record(0.0);
}

pub fn record_fetch(resource: &'static str) {
    counter!("wallet_fetch_total", "resource" => resource).increment(1);
}

pub fn record_fetch_failure(resource: &'static str) {
    counter!("wallet_fetch_failures_total", "resource" => resource).increment(1);
}
