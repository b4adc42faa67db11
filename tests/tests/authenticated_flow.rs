//! End-to-end authenticated run against the in-process mock platform.

mod utils;
use utils::init;

use mock_shield::{MockConfig, MockShield};
use shield_bench::client::PlatformClient;
use shield_bench::config::TargetConfig;
use shield_bench::flow;
use shield_bench_core::{RunReport, Scenario, Thresholds, VuContext};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread")]
async fn authenticated_run_produces_a_clean_summary() {
    init();
    let mock = MockShield::spawn(MockConfig {
        bootstrap_credential: "Secret123".to_string(),
        require_password_change: true,
    })
    .await;

    let client = Arc::new(PlatformClient::new(&mock.base_url()));
    let target = TargetConfig::default();
    let session = Arc::new(
        flow::establish_session(&client, &target, &mock.bootstrap_file_content())
            .await
            .unwrap(),
    );

    let scenario_client = client.clone();
    let report = Scenario::new("authenticated-flow", move |ctx: VuContext| {
        let client = scenario_client.clone();
        let session = session.clone();
        async move {
            flow::authenticated_iteration(&client, &session, &ctx).await;
        }
    })
    .vus(3)
    .duration(Duration::from_millis(500))
    .thresholds(Thresholds::default())
    .await;

    assert_eq!(report.vus, 3);
    assert!(report.iterations >= 3);
    assert_eq!(report.requests.failed, 0);
    assert_eq!(report.requests.error_rate, 0.0);
    // Three checks per iteration, none failing.
    assert_eq!(report.requests.total, report.iterations * 3);
    for check in &report.checks {
        assert_eq!(check.fails, 0, "check {:?} failed", check.name);
    }
    let names: Vec<_> = report.checks.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "fetch config is 200",
            "list modules is 200",
            "update config is 200"
        ]
    );

    // Every virtual user wrote its own derived key.
    assert_eq!(
        mock.state().config_keys(),
        vec!["perf.setting.1", "perf.setting.2", "perf.setting.3"]
    );

    // Summary lands on disk and round-trips.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("performance-authenticated-summary.json");
    report.write_json(&path).unwrap();
    let parsed: RunReport =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed.scenario, "authenticated-flow");
    assert!(parsed.thresholds.is_some());
    assert!(parsed.passed());
}

#[tokio::test(flavor = "multi_thread")]
async fn iteration_failures_are_recorded_not_raised() {
    init();
    let mock = MockShield::spawn(MockConfig::default()).await;
    let client = Arc::new(PlatformClient::new(&mock.base_url()));

    // An unauthenticated session: every config call will come back 401,
    // but the run itself must still complete and report the failures.
    let session = Arc::new(flow::Session {
        admin_token: "not-a-real-token".to_string(),
        tenant_id: "none".to_string(),
        admin_email: "nobody@shield.dev".to_string(),
    });

    let report = Scenario::new("authenticated-flow-unauthorized", move |ctx: VuContext| {
        let client = client.clone();
        let session = session.clone();
        async move {
            flow::authenticated_iteration(&client, &session, &ctx).await;
        }
    })
    .vus(2)
    .duration(Duration::from_millis(300))
    .thresholds(Thresholds::default())
    .await;

    assert!(report.iterations >= 2);
    assert_eq!(report.requests.failed, report.requests.total);
    assert_eq!(report.requests.error_rate, 1.0);
    for check in &report.checks {
        assert_eq!(check.passes, 0);
        assert!(check.fails > 0);
    }
    assert!(!report.passed());
}
