use mock_shield::{router, MockConfig, ShieldState};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mock_shield=debug".into()),
        )
        .init();

    let addr: SocketAddr = std::env::var("MOCK_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse()
        .unwrap();

    let config = MockConfig {
        require_password_change: true,
        ..MockConfig::default()
    };
    info!(
        %addr,
        credential = %config.bootstrap_credential,
        "starting mock Shield API"
    );

    let state = Arc::new(ShieldState::new(config));
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, router(state)).await.unwrap();
}
