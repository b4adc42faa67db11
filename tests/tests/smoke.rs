//! Health-check smoke scenario against the in-process mock platform.

mod utils;
use utils::init;

use mock_shield::{MockConfig, MockShield};
use shield_bench::client::PlatformClient;
use shield_bench::flow;
use shield_bench_core::{Scenario, Thresholds, VuContext};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread")]
async fn health_probe_needs_no_setup() {
    init();
    let mock = MockShield::spawn(MockConfig::default()).await;
    let client = Arc::new(PlatformClient::new(&mock.base_url()));

    let report = Scenario::new("health-smoke", move |ctx: VuContext| {
        let client = client.clone();
        async move {
            flow::health_iteration(&client, &ctx).await;
        }
    })
    .vus(2)
    .duration(Duration::from_millis(300))
    .thresholds(Thresholds::default())
    .await;

    assert!(report.iterations >= 2);
    assert_eq!(report.requests.failed, 0);
    assert_eq!(report.checks.len(), 1);
    assert_eq!(report.checks[0].name, "health status is 200");
    assert_eq!(report.checks[0].fails, 0);
    assert!(report.passed());
}
