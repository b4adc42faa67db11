use crate::config::{RunConfig, Thresholds};
use crate::recorder::RecorderSnapshot;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("unable to write summary file: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to serialize summary: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// End-of-run summary for a scenario, written as a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub scenario: String,
    pub vus: u32,
    pub duration_secs: f64,
    pub elapsed_secs: f64,
    pub iterations: u64,
    pub requests: RequestStats,
    pub latency: LatencyStats,
    pub checks: Vec<CheckOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<ThresholdOutcome>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestStats {
    pub total: u64,
    pub failed: u64,
    pub error_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencyStats {
    pub p50_ms: f64,
    pub p90_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub max_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub name: String,
    pub passes: u64,
    pub fails: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdOutcome {
    pub error_rate_ok: bool,
    pub latency_p95_ok: bool,
}

impl RunReport {
    pub(crate) fn build(
        config: &RunConfig,
        elapsed: Duration,
        iterations: u64,
        snapshot: RecorderSnapshot,
    ) -> Self {
        let total = snapshot.success + snapshot.error;
        let error_rate = if total > 0 {
            snapshot.error as f64 / total as f64
        } else {
            0.0
        };

        let mut latencies = snapshot.latency;
        latencies.sort();
        let latency = LatencyStats::from_sorted(&latencies);

        // Gates are strict: a run sitting exactly at a ceiling fails it.
        let thresholds = config.thresholds.map(|t| ThresholdOutcome {
            error_rate_ok: error_rate < t.max_error_rate,
            latency_p95_ok: latency.p95_ms < t.max_latency_p95.as_secs_f64() * 1e3,
        });

        Self {
            scenario: config.name.clone(),
            vus: config.vus,
            duration_secs: config.duration.as_secs_f64(),
            elapsed_secs: elapsed.as_secs_f64(),
            iterations,
            requests: RequestStats {
                total,
                failed: snapshot.error,
                error_rate,
            },
            latency,
            checks: snapshot
                .checks
                .into_iter()
                .map(|(name, passes, fails)| CheckOutcome {
                    name,
                    passes,
                    fails,
                })
                .collect(),
            thresholds,
        }
    }

    /// Whether every configured threshold held. Reports without
    /// thresholds always pass.
    pub fn passed(&self) -> bool {
        match &self.thresholds {
            Some(t) => t.error_rate_ok && t.latency_p95_ok,
            None => true,
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}

impl LatencyStats {
    fn from_sorted(latencies: &[Duration]) -> Self {
        Self {
            p50_ms: quantile_ms(latencies, 0.50),
            p90_ms: quantile_ms(latencies, 0.90),
            p95_ms: quantile_ms(latencies, 0.95),
            p99_ms: quantile_ms(latencies, 0.99),
            max_ms: latencies
                .last()
                .map(|d| d.as_secs_f64() * 1e3)
                .unwrap_or(0.0),
        }
    }
}

/// Nearest-rank quantile over an already sorted sample set.
fn quantile_ms(sorted: &[Duration], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() - 1) as f64 * q).round() as usize;
    sorted[idx].as_secs_f64() * 1e3
}
