use std::time::Duration;

pub const DEFAULT_VUS: u32 = 1;
pub const DEFAULT_DURATION: Duration = Duration::from_secs(30);

/// Configuration for a single scenario run.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub name: String,
    pub vus: u32,
    pub duration: Duration,
    pub thresholds: Option<Thresholds>,
}

impl RunConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            vus: DEFAULT_VUS,
            duration: DEFAULT_DURATION,
            thresholds: None,
        }
    }
}

/// Pass/fail gates evaluated against the final report.
///
/// Mirrors the conventional load-test gates: an overall request failure
/// rate ceiling and a p95 latency ceiling.
#[derive(Clone, Copy, Debug)]
pub struct Thresholds {
    pub max_error_rate: f64,
    pub max_latency_p95: Duration,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_error_rate: 0.01,
            max_latency_p95: Duration::from_millis(750),
        }
    }
}
