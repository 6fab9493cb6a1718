//! Backend request metrics.

use std::time::Instant;

use metrics::{counter, histogram};

/// Record the duration of one backend request.
pub fn record_request_duration(operation: &str, duration_secs: f64) {
    histogram!(
        "geofence_backend_request_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration_secs);
}

/// Count a failed backend request by operation and failure kind.
pub fn record_request_error(operation: &str, kind: &'static str) {
    counter!(
        "geofence_backend_errors_total",
        "operation" => operation.to_string(),
        "kind" => kind
    )
    .increment(1);
}

/// Times a backend request and records it on [`RequestTimer::record`].
///
/// ```ignore
/// let timer = RequestTimer::new("get_geofence");
/// let response = client.get(url).send().await;
/// timer.record();
/// ```
pub struct RequestTimer {
    operation: &'static str,
    start: Instant,
}

impl RequestTimer {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn record(self) {
        record_request_duration(self.operation, self.start.elapsed().as_secs_f64());
    }
}
