use metrics_util::AtomicBucket;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Shared sink for check outcomes and request latencies.
///
/// Cloned into every virtual-user task; all counters are atomics so no
/// coordination happens on the hot path beyond the occasional read lock
/// for the check registry.
#[derive(Clone)]
pub struct Recorder {
    inner: Arc<RecorderInner>,
}

struct RecorderInner {
    checks: RwLock<HashMap<&'static str, CheckCounters>>,
    latency: AtomicBucket<Duration>,
    success: AtomicU64,
    error: AtomicU64,
}

#[derive(Default)]
struct CheckCounters {
    passes: AtomicU64,
    fails: AtomicU64,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RecorderInner {
                checks: RwLock::new(HashMap::new()),
                latency: AtomicBucket::new(),
                success: AtomicU64::new(0),
                error: AtomicU64::new(0),
            }),
        }
    }

    /// Record a named check outcome. Failures are counted, never raised.
    pub fn check(&self, name: &'static str, passed: bool) {
        {
            let read = self
                .inner
                .checks
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(counters) = read.get(name) {
                counters.bump(passed);
                emit_check_metric(name, passed);
                return;
            }
        }

        let mut write = self
            .inner
            .checks
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        write.entry(name).or_default().bump(passed);
        emit_check_metric(name, passed);
    }

    /// Time a fallible request future, classify the outcome under `name`
    /// and feed the latency sample set.
    pub async fn timed<F, R, E>(&self, name: &'static str, fut: F) -> Result<R, E>
    where
        F: Future<Output = Result<R, E>>,
    {
        let start = Instant::now();
        let res = fut.await;
        let elapsed = start.elapsed();

        self.inner.latency.push(elapsed);
        metrics::histogram!("shield_request_latency_ns", "check" => name)
            .record(elapsed.as_nanos() as f64);

        if res.is_ok() {
            self.inner.success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.inner.error.fetch_add(1, Ordering::Relaxed);
        }
        self.check(name, res.is_ok());

        res
    }

    pub(crate) fn snapshot(&self) -> RecorderSnapshot {
        let success = self.inner.success.swap(0, Ordering::Relaxed);
        let error = self.inner.error.swap(0, Ordering::Relaxed);

        let mut latency = vec![];
        self.inner.latency.clear_with(|durs| {
            latency.extend_from_slice(durs);
        });

        let checks = {
            let read = self
                .inner
                .checks
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            let mut checks: Vec<_> = read
                .iter()
                .map(|(name, counters)| {
                    (
                        name.to_string(),
                        counters.passes.load(Ordering::Relaxed),
                        counters.fails.load(Ordering::Relaxed),
                    )
                })
                .collect();
            checks.sort();
            checks
        };

        RecorderSnapshot {
            success,
            error,
            latency,
            checks,
        }
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckCounters {
    fn bump(&self, passed: bool) {
        if passed {
            self.passes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.fails.fetch_add(1, Ordering::Relaxed);
        }
    }
}

fn emit_check_metric(name: &'static str, passed: bool) {
    if passed {
        metrics::counter!("shield_check_passed", "check" => name).increment(1);
    } else {
        metrics::counter!("shield_check_failed", "check" => name).increment(1);
    }
}

/// Drained view of a [`Recorder`], consumed by report building.
pub(crate) struct RecorderSnapshot {
    pub success: u64,
    pub error: u64,
    pub latency: Vec<Duration>,
    /// `(name, passes, fails)`, sorted by name.
    pub checks: Vec<(String, u64, u64)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_pass_and_fail_outcomes() {
        let recorder = Recorder::new();
        recorder.check("status is 200", true);
        recorder.check("status is 200", true);
        recorder.check("status is 200", false);
        recorder.check("body has token", true);

        let snap = recorder.snapshot();
        assert_eq!(
            snap.checks,
            vec![
                ("body has token".to_string(), 1, 0),
                ("status is 200".to_string(), 2, 1),
            ]
        );
    }

    #[tokio::test]
    async fn timed_classifies_results_and_samples_latency() {
        let recorder = Recorder::new();

        let ok: Result<(), ()> = recorder.timed("ok check", async { Ok(()) }).await;
        assert!(ok.is_ok());
        let err: Result<(), ()> = recorder.timed("err check", async { Err(()) }).await;
        assert!(err.is_err());

        let snap = recorder.snapshot();
        assert_eq!(snap.success, 1);
        assert_eq!(snap.error, 1);
        assert_eq!(snap.latency.len(), 2);
        assert_eq!(
            snap.checks,
            vec![("err check".to_string(), 0, 1), ("ok check".to_string(), 1, 0)]
        );
    }
}
