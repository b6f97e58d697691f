//! Identity Provider Client
//!
//! OIDC relying-party side of the authorization code flow:
//! - Discovery document from `{issuer}/.well-known/openid-configuration`
//! - Authorization URL construction (state, nonce, PKCE S256)
//! - Code exchange at the token endpoint
//! - Userinfo lookup
//!
//! ID token validation lives in `id_token.rs`.

use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::{Map, Value};
use sso_common::{ClaimSet, Principal};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::id_token::Jwks;
use super::login_state::{DEFAULT_MAX_PENDING_LOGINS, DEFAULT_STATE_TTL_SECONDS};
use crate::shared::error::{Result, SsoError};

/// Client registration for the configured identity provider
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Registration id used in `/oauth2/authorization/{id}` and the callback path
    pub registration_id: String,
    pub issuer_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
    /// Claim used as the principal's authentication name
    pub user_name_attribute: String,
    /// Public base URL for building the callback URL
    pub external_base_url: Option<String>,
    pub http_timeout: Duration,
    /// TTL of cached discovery metadata and JWKS
    pub metadata_cache_ttl: Duration,
    pub login_state_ttl: chrono::Duration,
    /// Cap on pending authorization requests
    pub max_pending_logins: usize,
}

impl GatewayConfig {
    pub fn new(
        registration_id: impl Into<String>,
        issuer_url: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            registration_id: registration_id.into(),
            issuer_url: issuer_url.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            client_secret: String::new(),
            scopes: vec!["openid".to_string(), "profile".to_string(), "email".to_string()],
            user_name_attribute: "sub".to_string(),
            external_base_url: None,
            http_timeout: Duration::from_secs(10),
            metadata_cache_ttl: Duration::from_secs(3600),
            login_state_ttl: chrono::Duration::seconds(DEFAULT_STATE_TTL_SECONDS),
            max_pending_logins: DEFAULT_MAX_PENDING_LOGINS,
        }
    }

    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = secret.into();
        self
    }

    pub fn with_external_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.external_base_url = if url.is_empty() {
            None
        } else {
            Some(url.trim_end_matches('/').to_string())
        };
        self
    }

    /// Path the provider redirects back to after authentication.
    pub fn callback_path(&self) -> String {
        format!("/login/oauth2/code/{}", self.registration_id)
    }
}

/// OIDC discovery document (the fields this client uses)
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMetadata {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub jwks_uri: String,
    #[serde(default)]
    pub userinfo_endpoint: Option<String>,
}

/// Token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
}

pub(crate) struct Cached<T> {
    pub value: T,
    pub fetched_at: Instant,
}

pub struct IdentityProviderClient {
    pub(crate) config: GatewayConfig,
    pub(crate) http_client: reqwest::Client,
    metadata_cache: RwLock<Option<Cached<ProviderMetadata>>>,
    pub(crate) jwks_cache: RwLock<Option<Cached<Jwks>>>,
}

impl IdentityProviderClient {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            config,
            http_client,
            metadata_cache: RwLock::new(None),
            jwks_cache: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn fetch_metadata(&self) -> Result<ProviderMetadata> {
        let discovery_url = format!("{}/.well-known/openid-configuration", self.config.issuer_url);

        debug!(url = %discovery_url, "Fetching OIDC discovery document");

        let response = self.http_client.get(&discovery_url).send().await?;

        if !response.status().is_success() {
            return Err(SsoError::provider(format!(
                "OIDC discovery returned status: {}",
                response.status()
            )));
        }

        Ok(response.json::<ProviderMetadata>().await?)
    }

    /// Discovery metadata, using the cache while it is fresh
    pub async fn metadata(&self) -> Result<ProviderMetadata> {
        {
            let cache = self.metadata_cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.fetched_at.elapsed() < self.config.metadata_cache_ttl {
                    return Ok(cached.value.clone());
                }
            }
        }

        let metadata = self.fetch_metadata().await?;

        {
            let mut cache = self.metadata_cache.write().await;
            *cache = Some(Cached {
                value: metadata.clone(),
                fetched_at: Instant::now(),
            });
        }

        info!(issuer = %metadata.issuer, "OIDC provider metadata loaded");
        Ok(metadata)
    }

    pub async fn authorization_url(
        &self,
        state: &str,
        nonce: &str,
        code_challenge: &str,
        redirect_uri: &str,
    ) -> Result<String> {
        let metadata = self.metadata().await?;
        let separator = if metadata.authorization_endpoint.contains('?') { '&' } else { '?' };

        Ok(format!(
            "{}{}response_type=code&client_id={}&redirect_uri={}&scope={}&state={}&nonce={}&code_challenge={}&code_challenge_method=S256",
            metadata.authorization_endpoint,
            separator,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&self.config.scopes.join(" ")),
            urlencoding::encode(state),
            urlencoding::encode(nonce),
            urlencoding::encode(code_challenge),
        ))
    }

    /// Exchange an authorization code for tokens
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse> {
        let metadata = self.metadata().await?;

        let mut params = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", self.config.client_id.as_str()),
            ("code_verifier", code_verifier),
        ];
        if !self.config.client_secret.is_empty() {
            params.push(("client_secret", self.config.client_secret.as_str()));
        }

        let response = self
            .http_client
            .post(&metadata.token_endpoint)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SsoError::token_exchange(format!(
                "Token endpoint returned {}: {}",
                status, body
            )));
        }

        Ok(response.json::<TokenResponse>().await?)
    }

    pub async fn fetch_userinfo(&self, endpoint: &str, access_token: &str) -> Result<Map<String, Value>> {
        let response = self
            .http_client
            .get(endpoint)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SsoError::provider(format!(
                "Userinfo endpoint returned status: {}",
                response.status()
            )));
        }

        Ok(response.json::<Map<String, Value>>().await?)
    }

    /// Complete a login: exchange the code, validate the ID token and build
    /// the principal from its claims, merged with userinfo when available.
    pub async fn authenticate(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
        expected_nonce: &str,
    ) -> Result<Principal> {
        let tokens = self.exchange_code(code, code_verifier, redirect_uri).await?;

        let id_token = tokens
            .id_token
            .as_deref()
            .ok_or_else(|| SsoError::token_exchange("No ID token in response"))?;

        let mut claims = self.validate_id_token(id_token, expected_nonce).await?;

        let metadata = self.metadata().await?;
        if let Some(endpoint) = metadata.userinfo_endpoint.as_deref() {
            if !tokens.access_token.is_empty() {
                let userinfo = self.fetch_userinfo(endpoint, &tokens.access_token).await?;
                merge_userinfo(&mut claims, userinfo)?;
            }
        }

        Ok(Principal::from_claims(
            ClaimSet::new(claims),
            &self.config.user_name_attribute,
        ))
    }
}

/// Add userinfo claims not already asserted by the ID token.
///
/// Rejected when the userinfo subject differs from the ID token subject.
fn merge_userinfo(claims: &mut Map<String, Value>, userinfo: Map<String, Value>) -> Result<()> {
    if userinfo.get("sub") != claims.get("sub") {
        warn!("Userinfo subject does not match ID token subject");
        return Err(SsoError::invalid_token("Userinfo subject mismatch"));
    }
    for (name, value) in userinfo {
        claims.entry(name).or_insert(value);
    }
    Ok(())
}
