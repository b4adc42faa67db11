//! Health-check smoke test: repeatedly probes `/actuator/health` with a
//! short pause and no setup phase.

use anyhow::Context;
use clap::Parser;
use shield_bench::client::PlatformClient;
use shield_bench::config;
use shield_bench::flow;
use shield_bench_core::{Scenario, Thresholds, VuContext};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "health-smoke", about = "Shield health endpoint smoke test")]
struct Cli {
    #[arg(long, env = "BASE_URL", default_value = config::DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "PERF_VUS", default_value_t = 1)]
    vus: u32,

    #[arg(long, env = "PERF_DURATION", default_value = "30s", value_parser = humantime::parse_duration)]
    duration: Duration,

    #[arg(long, env = "PERF_THINK_TIME", default_value = "1s", value_parser = humantime::parse_duration)]
    think_time: Duration,

    #[arg(long, env = "PERF_SUMMARY_PATH", default_value = "health-smoke-summary.json")]
    summary_path: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shield_bench=info,shield_bench_core=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            error!("thresholds breached; see summary for details");
            ExitCode::from(2)
        }
        Err(err) => {
            error!("fatal: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let client = Arc::new(PlatformClient::new(&cli.base_url));

    let think_time = cli.think_time;
    let report = Scenario::new("health-smoke", move |ctx: VuContext| {
        let client = client.clone();
        async move {
            flow::health_iteration(&client, &ctx).await;
            if !think_time.is_zero() {
                tokio::time::sleep(think_time).await;
            }
        }
    })
    .vus(cli.vus)
    .duration(cli.duration)
    .thresholds(Thresholds::default())
    .await;

    report
        .write_json(&cli.summary_path)
        .context("writing summary file")?;
    info!(
        summary = %cli.summary_path.display(),
        iterations = report.iterations,
        error_rate = report.requests.error_rate,
        "smoke run complete"
    );

    Ok(report.passed())
}
