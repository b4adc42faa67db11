//! Thin typed client over the Shield platform HTTP API.
//!
//! Every method maps to exactly one endpoint and performs a single
//! attempt; any non-2xx status is surfaced as [`ApiError`] with no retry.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} failed with status {status}")]
    UnexpectedStatus {
        endpoint: &'static str,
        status: StatusCode,
    },

    #[error("{endpoint} response is missing {field}")]
    MissingField {
        endpoint: &'static str,
        field: &'static str,
    },
}

/// Root login result. The token is an opaque bearer string with no expiry
/// handling; refresh is deliberately not implemented.
#[derive(Debug, Clone)]
pub struct RootSession {
    pub access_token: String,
    pub password_change_required: bool,
}

/// Payload for `POST /platform/societies`. Field names are serialized in
/// the API's camelCase form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocietyOnboarding {
    pub society_name: String,
    pub society_address: String,
    pub admin_name: String,
    pub admin_email: String,
    pub admin_phone: String,
    pub admin_password: String,
}

impl SocietyOnboarding {
    /// Build an onboarding payload embedding `suffix` verbatim in the
    /// society name, admin name and admin email so repeated runs never
    /// collide.
    pub fn with_suffix(suffix: u64, admin_password: &str) -> Self {
        Self {
            society_name: format!("Perf Society {suffix}"),
            society_address: "Performance Test Address".to_string(),
            admin_name: format!("Perf Admin {suffix}"),
            admin_email: format!("perf.admin.{suffix}@shield.dev"),
            admin_phone: "9000000000".to_string(),
            admin_password: admin_password.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RootLoginData {
    access_token: Option<String>,
    #[serde(default)]
    password_change_required: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminLoginData {
    access_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OnboardingData {
    tenant_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RootLoginRequest<'a> {
    login_id: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordRequest<'a> {
    email: &'a str,
    mobile: &'a str,
    new_password: &'a str,
    confirm_new_password: &'a str,
}

#[derive(Serialize)]
struct AdminLoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ConfigUpdateRequest<'a> {
    value: &'a str,
    category: &'a str,
}

pub struct PlatformClient {
    http: reqwest::Client,
    base_url: String,
}

impl PlatformClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn root_login(
        &self,
        login_id: &str,
        password: &str,
    ) -> Result<RootSession, ApiError> {
        const ENDPOINT: &str = "root login";

        let response = self
            .http
            .post(self.url("/platform/root/login"))
            .json(&RootLoginRequest { login_id, password })
            .send()
            .await?;
        ensure_success(ENDPOINT, &response)?;

        let body: Envelope<RootLoginData> = response.json().await?;
        let access_token = body.data.access_token.ok_or(ApiError::MissingField {
            endpoint: ENDPOINT,
            field: "data.accessToken",
        })?;

        debug!(
            password_change_required = body.data.password_change_required,
            "root login succeeded"
        );
        Ok(RootSession {
            access_token,
            password_change_required: body.data.password_change_required,
        })
    }

    pub async fn change_root_password(
        &self,
        access_token: &str,
        email: &str,
        mobile: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.url("/platform/root/change-password"))
            .bearer_auth(access_token)
            .json(&ChangePasswordRequest {
                email,
                mobile,
                new_password,
                confirm_new_password: new_password,
            })
            .send()
            .await?;
        ensure_success("root password change", &response)
    }

    /// Onboard a new society as root; returns the tenant identifier.
    pub async fn onboard_society(
        &self,
        access_token: &str,
        payload: &SocietyOnboarding,
    ) -> Result<String, ApiError> {
        const ENDPOINT: &str = "society onboarding";

        let response = self
            .http
            .post(self.url("/platform/societies"))
            .bearer_auth(access_token)
            .json(payload)
            .send()
            .await?;
        ensure_success(ENDPOINT, &response)?;

        let body: Envelope<OnboardingData> = response.json().await?;
        body.data.tenant_id.ok_or(ApiError::MissingField {
            endpoint: ENDPOINT,
            field: "data.tenantId",
        })
    }

    pub async fn admin_login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        const ENDPOINT: &str = "admin login";

        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&AdminLoginRequest { email, password })
            .send()
            .await?;
        ensure_success(ENDPOINT, &response)?;

        let body: Envelope<AdminLoginData> = response.json().await?;
        body.data.access_token.ok_or(ApiError::MissingField {
            endpoint: ENDPOINT,
            field: "data.accessToken",
        })
    }

    pub async fn update_config(
        &self,
        access_token: &str,
        key: &str,
        value: &str,
        category: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .http
            .put(self.url(&format!("/config/{key}")))
            .bearer_auth(access_token)
            .json(&ConfigUpdateRequest { value, category })
            .send()
            .await?;
        ensure_success("config update", &response)
    }

    pub async fn fetch_config(&self, access_token: &str, key: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .get(self.url(&format!("/config/{key}")))
            .bearer_auth(access_token)
            .send()
            .await?;
        ensure_success("config fetch", &response)
    }

    pub async fn list_settings_modules(&self, access_token: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .get(self.url("/settings/modules"))
            .bearer_auth(access_token)
            .send()
            .await?;
        ensure_success("settings module listing", &response)
    }

    pub async fn health(&self) -> Result<(), ApiError> {
        let response = self.http.get(self.url("/actuator/health")).send().await?;
        ensure_success("health check", &response)
    }
}

fn ensure_success(endpoint: &'static str, response: &reqwest::Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ApiError::UnexpectedStatus { endpoint, status })
    }
}
