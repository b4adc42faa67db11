//! Target environment for a run, mirrored from the deployment's
//! environment variables (see the binaries for the variable names).

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";
pub const DEFAULT_BOOTSTRAP_FILE: &str = "./root-bootstrap-credential.txt";
pub const DEFAULT_ROOT_PASSWORD: &str = "RootPerf#2026!Secure";
pub const DEFAULT_ROOT_EMAIL: &str = "root.perf@shield.dev";
pub const DEFAULT_ROOT_MOBILE: &str = "9999999999";
pub const DEFAULT_ADMIN_PASSWORD: &str = "AdminPerf#2026!";

/// Credentials and contact details used during the setup phase.
#[derive(Clone, Debug)]
pub struct TargetConfig {
    /// Password the root account is rotated to when the platform forces a
    /// change on first login.
    pub root_password: String,
    pub root_email: String,
    pub root_mobile: String,
    /// Password assigned to the onboarded tenant admin.
    pub admin_password: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            root_password: DEFAULT_ROOT_PASSWORD.to_string(),
            root_email: DEFAULT_ROOT_EMAIL.to_string(),
            root_mobile: DEFAULT_ROOT_MOBILE.to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}
