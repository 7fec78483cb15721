//! Metrics module
//!
//! Prometheus counters for API traffic, task polling and scenario outcomes.

use lazy_static::lazy_static;
use prometheus::{
    register_counter, register_counter_vec, register_histogram, Counter, CounterVec, Encoder,
    Histogram, TextEncoder,
};

lazy_static! {
    // API metrics
    pub static ref API_REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "pulp_migrate_api_requests_total",
        "Total number of Pulp API requests",
        &["resource", "status"]
    ).unwrap();

    // Task metrics
    pub static ref TASK_POLLS_TOTAL: Counter = register_counter!(
        "pulp_migrate_task_polls_total",
        "Number of task status reads"
    ).unwrap();

    pub static ref TASK_WAIT_DURATION: Histogram = register_histogram!(
        "pulp_migrate_task_wait_seconds",
        "Time spent waiting for a task to reach a terminal state",
        vec![1.0, 5.0, 15.0, 30.0, 60.0, 300.0, 900.0, 1800.0]
    ).unwrap();

    // Scenario metrics
    pub static ref SCENARIOS_TOTAL: CounterVec = register_counter_vec!(
        "pulp_migrate_scenarios_total",
        "Scenario runs by outcome",
        &["scenario", "outcome"]
    ).unwrap();
}

/// Record an API response (or transport failure when `status` is `None`)
pub fn record_api_request(resource: &str, status: Option<u16>) {
    let status = status
        .map(|code| code.to_string())
        .unwrap_or_else(|| "error".to_string());
    API_REQUESTS_TOTAL
        .with_label_values(&[resource, status.as_str()])
        .inc();
}

/// Record a single task status read
pub fn record_task_poll() {
    TASK_POLLS_TOTAL.inc();
}

/// Record how long a task took to become terminal
pub fn record_task_wait(duration_secs: f64) {
    TASK_WAIT_DURATION.observe(duration_secs);
}

/// Record a scenario outcome
pub fn record_scenario(scenario: &str, passed: bool) {
    let outcome = if passed { "passed" } else { "failed" };
    SCENARIOS_TOTAL.with_label_values(&[scenario, outcome]).inc();
}

/// Render all registered metrics in the Prometheus text format
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_api_request() {
        record_api_request("tasks", Some(200));
        record_api_request("tasks", None);
        assert!(API_REQUESTS_TOTAL.with_label_values(&["tasks", "error"]).get() >= 1.0);
    }

    #[test]
    fn test_record_task_poll() {
        record_task_poll();
        assert!(TASK_POLLS_TOTAL.get() >= 1.0);
    }

    #[test]
    fn test_render_includes_scenarios() {
        record_scenario("mirror-all", true);
        let text = render();
        assert!(text.contains("pulp_migrate_scenarios_total"));
    }
}
