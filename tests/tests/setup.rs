//! Setup-sequence behavior against the in-process mock platform.

mod utils;
use utils::init;

use mock_shield::{MockConfig, MockShield};
use shield_bench::client::PlatformClient;
use shield_bench::config::TargetConfig;
use shield_bench::flow::{self, SetupError};

async fn spawn_mock(require_password_change: bool) -> MockShield {
    init();
    MockShield::spawn(MockConfig {
        bootstrap_credential: "Secret123".to_string(),
        require_password_change,
    })
    .await
}

#[tokio::test]
async fn forced_rotation_changes_the_password_exactly_once() {
    let mock = spawn_mock(true).await;
    let client = PlatformClient::new(&mock.base_url());
    let target = TargetConfig::default();

    let session = flow::establish_session(&client, &target, "credential=Secret123\n")
        .await
        .unwrap();

    assert!(!session.admin_token.is_empty());
    assert!(!session.tenant_id.is_empty());
    assert_eq!(mock.state().change_password_calls(), 1);
    // Bootstrap login plus the re-login with the rotated password.
    assert_eq!(mock.state().root_login_calls(), 2);
}

#[tokio::test]
async fn no_rotation_requested_means_no_change_password_call() {
    let mock = spawn_mock(false).await;
    let client = PlatformClient::new(&mock.base_url());
    let target = TargetConfig::default();

    let session = flow::establish_session(&client, &target, "credential=Secret123\n")
        .await
        .unwrap();

    assert!(!session.admin_token.is_empty());
    assert_eq!(mock.state().change_password_calls(), 0);
    assert_eq!(mock.state().root_login_calls(), 1);
}

#[tokio::test]
async fn missing_credential_marker_is_fatal() {
    let mock = spawn_mock(false).await;
    let client = PlatformClient::new(&mock.base_url());
    let target = TargetConfig::default();

    let err = flow::establish_session(&client, &target, "password=Secret123\n")
        .await
        .unwrap_err();

    assert!(matches!(err, SetupError::Bootstrap(_)));
    // Nothing was attempted against the platform.
    assert_eq!(mock.state().root_login_calls(), 0);
}

#[tokio::test]
async fn wrong_bootstrap_credential_is_fatal() {
    let mock = spawn_mock(false).await;
    let client = PlatformClient::new(&mock.base_url());
    let target = TargetConfig::default();

    let err = flow::establish_session(&client, &target, "credential=NotTheOne\n")
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("root login"), "unexpected error: {message}");
    assert!(message.contains("401"), "unexpected error: {message}");
}

#[tokio::test]
async fn successive_setups_onboard_distinct_societies() {
    let mock = spawn_mock(false).await;
    let client = PlatformClient::new(&mock.base_url());
    let target = TargetConfig::default();

    let first = flow::establish_session(&client, &target, "credential=Secret123\n")
        .await
        .unwrap();
    let second = flow::establish_session(&client, &target, "credential=Secret123\n")
        .await
        .unwrap();

    assert_ne!(first.tenant_id, second.tenant_id);
    assert_ne!(first.admin_email, second.admin_email);
    assert_eq!(mock.state().society_count(), 2);
}
