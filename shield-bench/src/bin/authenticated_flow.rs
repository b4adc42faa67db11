//! Authenticated end-to-end load test against the Shield platform API.
//!
//! Performs the one-shot setup sequence (root bootstrap, optional
//! password rotation, society onboarding, admin login), then drives the
//! config read/write iteration with the configured number of virtual
//! users and writes a JSON summary at the end.

use anyhow::Context;
use clap::Parser;
use shield_bench::client::PlatformClient;
use shield_bench::config::{self, TargetConfig};
use shield_bench::flow;
use shield_bench_core::{Scenario, Thresholds, VuContext};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "authenticated-flow", about = "Authenticated Shield API load test")]
struct Cli {
    #[arg(long, env = "BASE_URL", default_value = config::DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "ROOT_BOOTSTRAP_FILE", default_value = config::DEFAULT_BOOTSTRAP_FILE)]
    bootstrap_file: PathBuf,

    #[arg(long, env = "PERF_ROOT_PASSWORD", default_value = config::DEFAULT_ROOT_PASSWORD)]
    root_password: String,

    #[arg(long, env = "PERF_ROOT_EMAIL", default_value = config::DEFAULT_ROOT_EMAIL)]
    root_email: String,

    #[arg(long, env = "PERF_ROOT_MOBILE", default_value = config::DEFAULT_ROOT_MOBILE)]
    root_mobile: String,

    #[arg(long, env = "PERF_ADMIN_PASSWORD", default_value = config::DEFAULT_ADMIN_PASSWORD)]
    admin_password: String,

    #[arg(long, env = "PERF_VUS", default_value_t = 5)]
    vus: u32,

    #[arg(long, env = "PERF_DURATION", default_value = "30s", value_parser = humantime::parse_duration)]
    duration: Duration,

    /// Pause between iterations of a single virtual user.
    #[arg(long, env = "PERF_THINK_TIME", default_value = "1s", value_parser = humantime::parse_duration)]
    think_time: Duration,

    #[arg(
        long,
        env = "PERF_SUMMARY_PATH",
        default_value = "performance-authenticated-summary.json"
    )]
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
    let target = TargetConfig {
        root_password: cli.root_password,
        root_email: cli.root_email,
        root_mobile: cli.root_mobile,
        admin_password: cli.admin_password,
    };

    let bootstrap_content = std::fs::read_to_string(&cli.bootstrap_file)
        .with_context(|| format!("reading bootstrap file {}", cli.bootstrap_file.display()))?;

    let client = Arc::new(PlatformClient::new(&cli.base_url));
    let session = Arc::new(
        flow::establish_session(&client, &target, &bootstrap_content)
            .await
            .context("setup sequence failed")?,
    );

    let think_time = cli.think_time;
    let report = Scenario::new("authenticated-flow", move |ctx: VuContext| {
        let client = client.clone();
        let session = session.clone();
        async move {
            flow::authenticated_iteration(&client, &session, &ctx).await;
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
        p95_ms = report.latency.p95_ms,
        "run complete"
    );

    Ok(report.passed())
}
