use crate::config::{RunConfig, Thresholds};
use crate::recorder::Recorder;
use crate::report::RunReport;
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::{Duration, Instant},
};
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Handle to a single simulated client.
///
/// `vu_id` is 1-based and unique within a run, so iteration bodies can
/// derive per-user resource names that never collide across users.
#[derive(Clone)]
pub struct VuContext {
    pub vu_id: u32,
    pub recorder: Recorder,
}

/// A configurable load-test scenario.
///
/// Wraps a per-iteration async body and is awaitable: polling drives the
/// whole run (spawning one task per virtual user) and resolves to the
/// final [`RunReport`].
#[pin_project::pin_project]
pub struct Scenario<T> {
    func: T,
    runner_fut: Option<Pin<Box<dyn Future<Output = RunReport> + Send>>>,
    config: RunConfig,
}

impl<T> Scenario<T> {
    pub fn new(name: &str, func: T) -> Self {
        Self {
            func,
            runner_fut: None,
            config: RunConfig::new(name),
        }
    }

    /// Number of virtual users to simulate. Values below 1 are clamped.
    pub fn vus(mut self, vus: u32) -> Self {
        self.config.vus = vus.max(1);
        self
    }

    /// How long to keep iterating before the run winds down.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.config.duration = duration;
        self
    }

    /// Gate the run on error-rate and p95 latency ceilings.
    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.config.thresholds = Some(thresholds);
        self
    }
}

impl<T, F> Future for Scenario<T>
where
    T: Fn(VuContext) -> F + Send + Sync + 'static + Clone,
    F: Future<Output = ()> + Send,
{
    type Output = RunReport;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.runner_fut.is_none() {
            let func = self.func.clone();
            let config = self.config.clone();
            self.runner_fut = Some(Box::pin(async move { run_scenario(func, config).await }));
        }

        if let Some(runner) = &mut self.runner_fut {
            runner.as_mut().poll(cx)
        } else {
            unreachable!()
        }
    }
}

#[instrument(name = "scenario", skip_all, fields(name = config.name))]
async fn run_scenario<T, F>(func: T, config: RunConfig) -> RunReport
where
    T: Fn(VuContext) -> F + Send + Sync + 'static + Clone,
    F: Future<Output = ()> + Send,
{
    info!(
        vus = config.vus,
        duration = ?config.duration,
        "Running {}",
        config.name
    );

    let recorder = Recorder::new();
    let start = Instant::now();
    let deadline = start + config.duration;

    let mut tasks = Vec::with_capacity(config.vus as usize);
    for vu_id in 1..=config.vus {
        let func = func.clone();
        let recorder = recorder.clone();
        tasks.push(tokio::spawn(async move {
            let mut iterations = 0u64;
            while Instant::now() < deadline {
                let ctx = VuContext {
                    vu_id,
                    recorder: recorder.clone(),
                };
                func(ctx).await;
                iterations += 1;
            }
            trace!(vu_id, iterations, "virtual user finished");
            iterations
        }));
    }

    let mut iterations = 0u64;
    for task in tasks {
        match task.await {
            Ok(count) => iterations += count,
            Err(err) => error!("virtual user task failed: {err}"),
        }
    }

    let elapsed = start.elapsed();
    info!(iterations, ?elapsed, "Scenario complete");

    RunReport::build(&config, elapsed, iterations, recorder.snapshot())
}
