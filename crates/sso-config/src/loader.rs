//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "application.toml",
    "sso.toml",
    "./config/config.toml",
    "/etc/sso/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        self.load_with(|key| env::var(key).ok())
    }

    /// Same as [`load`](Self::load), reading overrides through `lookup`.
    pub fn load_with<F>(&self, lookup: F) -> Result<AppConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file(&lookup) {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        apply_overrides(&mut config, &lookup);

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file<F>(&self, lookup: &F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
            warn!(?path, "Configured config file does not exist");
        }

        if let Some(path) = lookup("SSO_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Apply environment variable overrides
fn apply_overrides<F>(config: &mut AppConfig, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    // HTTP
    if let Some(val) = lookup("SSO_HTTP_HOST") {
        config.http.host = val;
    }
    if let Some(val) = lookup("SSO_HTTP_PORT") {
        if let Ok(port) = val.parse() {
            config.http.port = port;
        }
    }

    // OIDC
    if let Some(val) = lookup("SSO_OIDC_REGISTRATION_ID") {
        config.oidc.registration_id = val;
    }
    if let Some(val) = lookup("SSO_OIDC_ISSUER_URL") {
        config.oidc.issuer_url = val;
    }
    if let Some(val) = lookup("SSO_AZURE_TENANT_ID") {
        config.oidc.azure_tenant_id = val;
    }
    if let Some(val) = lookup("SSO_OIDC_CLIENT_ID") {
        config.oidc.client_id = val;
    }
    if let Some(val) = lookup("SSO_OIDC_CLIENT_SECRET") {
        config.oidc.client_secret = val;
    }
    if let Some(val) = lookup("SSO_OIDC_SCOPES") {
        config.oidc.scopes = val;
    }
    if let Some(val) = lookup("SSO_OIDC_USER_NAME_ATTRIBUTE") {
        config.oidc.user_name_attribute = val;
    }
    if let Some(val) = lookup("SSO_OIDC_EXTERNAL_BASE_URL") {
        config.oidc.external_base_url = val;
    }

    // Session
    if let Some(val) = lookup("SSO_SESSION_COOKIE_NAME") {
        config.session.cookie_name = val;
    }
    if let Some(val) = lookup("SSO_SESSION_SECURE") {
        if let Some(secure) = parse_bool(&val) {
            config.session.secure = secure;
        }
    }
    if let Some(val) = lookup("SSO_SESSION_SAME_SITE") {
        config.session.same_site = val;
    }
    if let Some(val) = lookup("SSO_SESSION_TIMEOUT_SECS") {
        if let Ok(timeout) = val.parse() {
            config.session.timeout_secs = timeout;
        }
    }
    if let Some(val) = lookup("SSO_SESSION_LOGIN_STATE_TTL_SECS") {
        if let Ok(ttl) = val.parse() {
            config.session.login_state_ttl_secs = ttl;
        }
    }
    if let Some(val) = lookup("SSO_SESSION_MAX_PENDING_LOGINS") {
        if let Ok(max) = val.parse() {
            config.session.max_pending_logins = max;
        }
    }
}
