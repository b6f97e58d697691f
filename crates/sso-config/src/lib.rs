//! SSO Demo Configuration
//!
//! TOML-based configuration with environment variable override support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Longest accepted session or login state lifetime: one year
pub const MAX_LIFETIME_SECS: u64 = 365 * 24 * 60 * 60;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub oidc: OidcConfig,
    pub session: SessionConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Identity provider (OIDC client registration) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OidcConfig {
    /// Registration id used in the login and callback paths
    pub registration_id: String,
    /// Issuer URL; discovery is read from `{issuer}/.well-known/openid-configuration`
    pub issuer_url: String,
    /// Azure AD tenant, used to derive `issuer_url` when it is empty
    pub azure_tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    /// Space separated scopes requested at authorization
    pub scopes: String,
    /// Claim used as the principal's authentication name
    pub user_name_attribute: String,
    /// Public base URL for the callback (falls back to the request Host)
    pub external_base_url: String,
    pub http_timeout_secs: u64,
    /// How long discovery metadata and JWKS stay cached
    pub metadata_cache_secs: u64,
}

impl Default for OidcConfig {
    fn default() -> Self {
        Self {
            registration_id: "azure".to_string(),
            issuer_url: String::new(),
            azure_tenant_id: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            scopes: "openid profile email".to_string(),
            user_name_attribute: "sub".to_string(),
            external_base_url: String::new(),
            http_timeout_secs: 10,
            metadata_cache_secs: 3600,
        }
    }
}

impl OidcConfig {
    /// Issuer to use, deriving the Azure AD v2.0 issuer from the tenant id
    /// when no explicit issuer is configured.
    pub fn effective_issuer(&self) -> Option<String> {
        let issuer = self.issuer_url.trim();
        if !issuer.is_empty() {
            return Some(issuer.trim_end_matches('/').to_string());
        }
        let tenant = self.azure_tenant_id.trim();
        if !tenant.is_empty() {
            return Some(format!("https://login.microsoftonline.com/{}/v2.0", tenant));
        }
        None
    }

    pub fn scope_list(&self) -> Vec<String> {
        self.scopes
            .split(|c: char| c == ' ' || c == ',')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Session and cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub secure: bool,
    pub same_site: String,
    /// Absolute session lifetime
    pub timeout_secs: u64,
    /// Lifetime of a pending authorization request
    pub login_state_ttl_secs: u64,
    /// Interval of the expired session/login state purge
    pub cleanup_interval_secs: u64,
    /// Upper bound on pending authorization requests held in memory
    pub max_pending_logins: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "SSO_SESSION".to_string(),
            secure: false,
            same_site: "Lax".to_string(),
            timeout_secs: 1800,        // 30 minutes
            login_state_ttl_secs: 600, // 10 minutes
            cleanup_interval_secs: 60,
            max_pending_logins: 10_000,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    /// Check the settings the identity provider registration cannot work without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.oidc.effective_issuer().is_none() {
            return Err(ConfigError::ValidationError(
                "oidc.issuer_url or oidc.azure_tenant_id must be set".to_string(),
            ));
        }
        if self.oidc.client_id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "oidc.client_id must be set".to_string(),
            ));
        }
        if self.oidc.registration_id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "oidc.registration_id must not be empty".to_string(),
            ));
        }
        if !self.oidc.scope_list().iter().any(|s| s == "openid") {
            return Err(ConfigError::ValidationError(
                "oidc.scopes must include openid".to_string(),
            ));
        }
        if self.session.cookie_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "session.cookie_name must not be empty".to_string(),
            ));
        }
        if self.session.timeout_secs == 0 || self.session.timeout_secs > MAX_LIFETIME_SECS {
            return Err(ConfigError::ValidationError(format!(
                "session.timeout_secs must be between 1 and {}",
                MAX_LIFETIME_SECS
            )));
        }
        if self.session.login_state_ttl_secs == 0
            || self.session.login_state_ttl_secs > MAX_LIFETIME_SECS
        {
            return Err(ConfigError::ValidationError(format!(
                "session.login_state_ttl_secs must be between 1 and {}",
                MAX_LIFETIME_SECS
            )));
        }
        if self.session.max_pending_logins == 0 {
            return Err(ConfigError::ValidationError(
                "session.max_pending_logins must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# SSO Demo Configuration
# Environment variables override these settings

[http]
host = "0.0.0.0"
port = 8080

[oidc]
registration_id = "azure"
# Either an explicit issuer or an Azure AD tenant id
issuer_url = ""
azure_tenant_id = "00000000-0000-0000-0000-000000000000"
client_id = ""
client_secret = ""
scopes = "openid profile email"
user_name_attribute = "sub"
external_base_url = "http://localhost:8080"
http_timeout_secs = 10
metadata_cache_secs = 3600

[session]
cookie_name = "SSO_SESSION"
secure = false
same_site = "Lax"
timeout_secs = 1800
login_state_ttl_secs = 600
cleanup_interval_secs = 60
max_pending_logins = 10000
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.oidc.issuer_url = "https://idp.example.com".to_string();
        config.oidc.client_id = "client-id".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.oidc.registration_id, "azure");
        assert_eq!(config.oidc.user_name_attribute, "sub");
        assert_eq!(config.session.cookie_name, "SSO_SESSION");
        assert_eq!(config.session.same_site, "Lax");
    }

    #[test]
    fn test_example_toml_parses() {
        let config: AppConfig = toml::from_str(&AppConfig::example_toml()).unwrap();
        assert_eq!(config.oidc.scope_list(), vec!["openid", "profile", "email"]);
        assert!(config.validate().is_err()); // client_id is empty in the example
    }

    #[test]
    fn test_from_file_with_partial_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[oidc]\nissuer_url = \"https://idp.example.com/\"\nclient_id = \"abc\"\n\n[http]\nport = 9000"
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.oidc.effective_issuer().as_deref(), Some("https://idp.example.com"));
        assert_eq!(config.session.timeout_secs, 1800);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_issuer_derived_from_azure_tenant() {
        let mut config = AppConfig::default();
        config.oidc.azure_tenant_id = "tenant-1".to_string();
        assert_eq!(
            config.oidc.effective_issuer().as_deref(),
            Some("https://login.microsoftonline.com/tenant-1/v2.0")
        );
    }

    #[test]
    fn test_validation_errors() {
        assert!(valid_config().validate().is_ok());

        let mut missing_issuer = valid_config();
        missing_issuer.oidc.issuer_url.clear();
        assert!(matches!(
            missing_issuer.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        let mut missing_client = valid_config();
        missing_client.oidc.client_id = "  ".to_string();
        assert!(missing_client.validate().is_err());

        let mut no_openid = valid_config();
        no_openid.oidc.scopes = "profile email".to_string();
        assert!(no_openid.validate().is_err());
    }

    #[test]
    fn test_lifetimes_are_bounded() {
        let mut huge_timeout = valid_config();
        huge_timeout.session.timeout_secs = u64::MAX;
        assert!(huge_timeout.validate().is_err());

        let mut huge_state_ttl = valid_config();
        huge_state_ttl.session.login_state_ttl_secs = i64::MAX as u64 + 1;
        assert!(huge_state_ttl.validate().is_err());

        let mut no_state_ttl = valid_config();
        no_state_ttl.session.login_state_ttl_secs = 0;
        assert!(no_state_ttl.validate().is_err());

        let mut no_pending = valid_config();
        no_pending.session.max_pending_logins = 0;
        assert!(no_pending.validate().is_err());

        let mut longest = valid_config();
        longest.session.timeout_secs = MAX_LIFETIME_SECS;
        longest.session.login_state_ttl_secs = MAX_LIFETIME_SECS;
        assert!(longest.validate().is_ok());
    }

    #[test]
    fn test_scope_list_accepts_commas() {
        let mut config = OidcConfig::default();
        config.scopes = "openid,profile  email".to_string();
        assert_eq!(config.scope_list(), vec!["openid", "profile", "email"]);
    }
}
