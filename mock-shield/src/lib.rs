//! In-memory mock of the Shield platform API surface used by the load
//! tests: root login with an optional forced password rotation, society
//! onboarding, tenant admin login, a per-key config store, settings
//! modules and the actuator health probe.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, RwLock,
};
use tracing::debug;

pub const DEFAULT_BOOTSTRAP_CREDENTIAL: &str = "Bootstrap#0001";

/// Mock server configuration.
#[derive(Clone, Debug)]
pub struct MockConfig {
    /// The one-time root password the server starts with.
    pub bootstrap_credential: String,
    /// Whether the first root login demands a password rotation.
    pub require_password_change: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            bootstrap_credential: DEFAULT_BOOTSTRAP_CREDENTIAL.to_string(),
            require_password_change: false,
        }
    }
}

pub struct ShieldState {
    root_password: RwLock<String>,
    password_change_required: AtomicBool,
    root_tokens: RwLock<HashSet<String>>,
    admin_tokens: RwLock<HashSet<String>>,
    admins: RwLock<HashMap<String, AdminAccount>>,
    config_store: RwLock<HashMap<String, ConfigEntry>>,
    root_login_calls: AtomicU64,
    change_password_calls: AtomicU64,
}

struct AdminAccount {
    password: String,
    tenant_id: String,
}

#[derive(Clone)]
struct ConfigEntry {
    value: String,
    category: String,
}

impl ShieldState {
    pub fn new(config: MockConfig) -> Self {
        Self {
            root_password: RwLock::new(config.bootstrap_credential),
            password_change_required: AtomicBool::new(config.require_password_change),
            root_tokens: RwLock::new(HashSet::new()),
            admin_tokens: RwLock::new(HashSet::new()),
            admins: RwLock::new(HashMap::new()),
            config_store: RwLock::new(HashMap::new()),
            root_login_calls: AtomicU64::new(0),
            change_password_calls: AtomicU64::new(0),
        }
    }

    pub fn root_login_calls(&self) -> u64 {
        self.root_login_calls.load(Ordering::Relaxed)
    }

    pub fn change_password_calls(&self) -> u64 {
        self.change_password_calls.load(Ordering::Relaxed)
    }

    pub fn society_count(&self) -> usize {
        self.admins.read().unwrap().len()
    }

    /// Keys currently present in the config store, sorted.
    pub fn config_keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.config_store.read().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// A running mock server bound to an ephemeral local port.
pub struct MockShield {
    state: Arc<ShieldState>,
    addr: SocketAddr,
}

impl MockShield {
    /// Spawn the server in the background and return a handle to it.
    pub async fn spawn(config: MockConfig) -> Self {
        let state = Arc::new(ShieldState::new(config));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();

        let app = router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { state, addr }
    }

    /// Base URL in the same shape the real deployment exposes.
    pub fn base_url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    pub fn state(&self) -> &ShieldState {
        &self.state
    }

    /// A bootstrap credential file body matching the platform's format.
    pub fn bootstrap_file_content(&self) -> String {
        format!(
            "credential={}\n",
            self.state.root_password.read().unwrap()
        )
    }
}

pub fn router(state: Arc<ShieldState>) -> Router {
    let api = Router::new()
        .route("/platform/root/login", post(root_login))
        .route("/platform/root/change-password", post(change_password))
        .route("/platform/societies", post(onboard_society))
        .route("/auth/login", post(admin_login))
        .route("/config/:key", put(update_config).get(fetch_config))
        .route("/settings/modules", get(list_modules))
        .route("/actuator/health", get(health))
        .with_state(state);

    Router::new().nest("/api/v1", api)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RootLoginRequest {
    login_id: String,
    password: String,
}

async fn root_login(
    State(state): State<Arc<ShieldState>>,
    Json(req): Json<RootLoginRequest>,
) -> Response {
    state.root_login_calls.fetch_add(1, Ordering::Relaxed);

    let current = state.root_password.read().unwrap().clone();
    if req.login_id != "root" || req.password != current {
        debug!("root login rejected");
        return error_response(StatusCode::UNAUTHORIZED, "invalid root credentials");
    }

    let token = uuid::Uuid::new_v4().to_string();
    state.root_tokens.write().unwrap().insert(token.clone());

    Json(json!({
        "data": {
            "accessToken": token,
            "passwordChangeRequired": state.password_change_required.load(Ordering::Relaxed),
        }
    }))
    .into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordRequest {
    #[allow(dead_code)]
    email: String,
    #[allow(dead_code)]
    mobile: String,
    new_password: String,
    confirm_new_password: String,
}

async fn change_password(
    State(state): State<Arc<ShieldState>>,
    headers: HeaderMap,
    Json(req): Json<ChangePasswordRequest>,
) -> Response {
    if !has_token(&headers, &state.root_tokens) {
        return error_response(StatusCode::UNAUTHORIZED, "missing or invalid root token");
    }
    if req.new_password != req.confirm_new_password {
        return error_response(StatusCode::BAD_REQUEST, "password confirmation mismatch");
    }

    state.change_password_calls.fetch_add(1, Ordering::Relaxed);
    *state.root_password.write().unwrap() = req.new_password;
    state
        .password_change_required
        .store(false, Ordering::Relaxed);

    Json(json!({ "data": {} })).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OnboardSocietyRequest {
    society_name: String,
    #[allow(dead_code)]
    society_address: String,
    #[allow(dead_code)]
    admin_name: String,
    admin_email: String,
    #[allow(dead_code)]
    admin_phone: String,
    admin_password: String,
}

async fn onboard_society(
    State(state): State<Arc<ShieldState>>,
    headers: HeaderMap,
    Json(req): Json<OnboardSocietyRequest>,
) -> Response {
    if !has_token(&headers, &state.root_tokens) {
        return error_response(StatusCode::UNAUTHORIZED, "missing or invalid root token");
    }

    let tenant_id = uuid::Uuid::new_v4().to_string();
    debug!(society = %req.society_name, %tenant_id, "society onboarded");
    state.admins.write().unwrap().insert(
        req.admin_email,
        AdminAccount {
            password: req.admin_password,
            tenant_id: tenant_id.clone(),
        },
    );

    Json(json!({ "data": { "tenantId": tenant_id } })).into_response()
}

#[derive(Deserialize)]
struct AdminLoginRequest {
    email: String,
    password: String,
}

async fn admin_login(
    State(state): State<Arc<ShieldState>>,
    Json(req): Json<AdminLoginRequest>,
) -> Response {
    let admins = state.admins.read().unwrap();
    match admins.get(&req.email) {
        Some(account) if account.password == req.password => {
            let token = uuid::Uuid::new_v4().to_string();
            state.admin_tokens.write().unwrap().insert(token.clone());
            Json(json!({
                "data": {
                    "accessToken": token,
                    "tenantId": account.tenant_id,
                }
            }))
            .into_response()
        }
        _ => error_response(StatusCode::UNAUTHORIZED, "invalid admin credentials"),
    }
}

#[derive(Deserialize)]
struct ConfigUpdateRequest {
    value: String,
    category: String,
}

async fn update_config(
    State(state): State<Arc<ShieldState>>,
    Path(key): Path<String>,
    headers: HeaderMap,
    Json(req): Json<ConfigUpdateRequest>,
) -> Response {
    if !has_token(&headers, &state.admin_tokens) {
        return error_response(StatusCode::UNAUTHORIZED, "missing or invalid admin token");
    }

    state.config_store.write().unwrap().insert(
        key.clone(),
        ConfigEntry {
            value: req.value,
            category: req.category,
        },
    );

    Json(json!({ "data": { "key": key } })).into_response()
}

async fn fetch_config(
    State(state): State<Arc<ShieldState>>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !has_token(&headers, &state.admin_tokens) {
        return error_response(StatusCode::UNAUTHORIZED, "missing or invalid admin token");
    }

    let store = state.config_store.read().unwrap();
    match store.get(&key) {
        Some(entry) => Json(json!({
            "data": {
                "key": key,
                "value": entry.value,
                "category": entry.category,
            }
        }))
        .into_response(),
        None => error_response(StatusCode::NOT_FOUND, "unknown config key"),
    }
}

async fn list_modules(State(state): State<Arc<ShieldState>>, headers: HeaderMap) -> Response {
    if !has_token(&headers, &state.admin_tokens) {
        return error_response(StatusCode::UNAUTHORIZED, "missing or invalid admin token");
    }

    Json(json!({
        "data": [
            { "name": "billing", "enabled": true },
            { "name": "visitors", "enabled": true },
            { "name": "maintenance", "enabled": false },
        ]
    }))
    .into_response()
}

async fn health() -> Response {
    Json(json!({ "status": "UP" })).into_response()
}

fn has_token(headers: &HeaderMap, tokens: &RwLock<HashSet<String>>) -> bool {
    bearer(headers)
        .map(|token| tokens.read().unwrap().contains(token))
        .unwrap_or(false)
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
