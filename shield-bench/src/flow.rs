//! The authenticated flow: one-shot setup sequence plus the bodies the
//! virtual users iterate.

use crate::bootstrap::{extract_credential, BootstrapError};
use crate::client::{ApiError, PlatformClient, SocietyOnboarding};
use crate::config::TargetConfig;
use shield_bench_core::VuContext;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::info;

pub const ROOT_LOGIN_ID: &str = "root";

/// Setup failures are fatal: no valid session means no load to drive.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Read-only session state shared with every virtual user.
#[derive(Debug, Clone)]
pub struct Session {
    pub admin_token: String,
    pub tenant_id: String,
    pub admin_email: String,
}

/// Run the setup sequence exactly once before load generation begins.
///
/// Bootstrap credential -> root login -> forced password rotation (at most
/// once, only when the platform demands it) -> society onboarding with a
/// unique suffix -> admin login.
pub async fn establish_session(
    client: &PlatformClient,
    target: &TargetConfig,
    bootstrap_content: &str,
) -> Result<Session, SetupError> {
    let bootstrap_password = extract_credential(bootstrap_content)?;
    let mut root = client.root_login(ROOT_LOGIN_ID, &bootstrap_password).await?;

    if root.password_change_required {
        info!("root password change required; rotating");
        client
            .change_root_password(
                &root.access_token,
                &target.root_email,
                &target.root_mobile,
                &target.root_password,
            )
            .await?;
        root = client
            .root_login(ROOT_LOGIN_ID, &target.root_password)
            .await?;
    }

    let payload = SocietyOnboarding::with_suffix(unique_suffix(), &target.admin_password);
    let tenant_id = client.onboard_society(&root.access_token, &payload).await?;
    let admin_token = client
        .admin_login(&payload.admin_email, &payload.admin_password)
        .await?;

    info!(%tenant_id, admin_email = %payload.admin_email, "session established");
    Ok(Session {
        admin_token,
        tenant_id,
        admin_email: payload.admin_email,
    })
}

/// Config key scoped to one virtual user so concurrent users never touch
/// the same setting.
pub fn setting_key(vu_id: u32) -> String {
    format!("perf.setting.{vu_id}")
}

/// One authenticated iteration: write the VU's setting, read it back,
/// list the settings modules. Check failures are recorded, never raised.
pub async fn authenticated_iteration(client: &PlatformClient, session: &Session, ctx: &VuContext) {
    let key = setting_key(ctx.vu_id);
    let token = &session.admin_token;

    let _ = ctx
        .recorder
        .timed(
            "update config is 200",
            client.update_config(token, &key, "5", "performance"),
        )
        .await;

    let _ = ctx
        .recorder
        .timed("fetch config is 200", client.fetch_config(token, &key))
        .await;

    let _ = ctx
        .recorder
        .timed("list modules is 200", client.list_settings_modules(token))
        .await;
}

/// One smoke iteration: a single unauthenticated health probe.
pub async fn health_iteration(client: &PlatformClient, ctx: &VuContext) {
    let _ = ctx
        .recorder
        .timed("health status is 200", client.health())
        .await;
}

/// Current Unix time in milliseconds, bumped past the previous value so
/// back-to-back invocations within the same millisecond still differ.
pub fn unique_suffix() -> u64 {
    static LAST: AtomicU64 = AtomicU64::new(0);

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;

    let mut last = LAST.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(observed) => last = observed,
        }
    }
}
