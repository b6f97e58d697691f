//! ID token validation
//!
//! Signature (provider JWKS, or the client secret for HS* tokens), issuer,
//! audience, expiry and nonce. The JWKS is cached and refreshed once when a
//! token names a key id the cache does not know (key rotation).

use std::time::Instant;

use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::provider::{Cached, IdentityProviderClient};
use crate::shared::error::{Result, SsoError};

/// Allowed clock skew for `exp`/`nbf`
const CLOCK_SKEW_SECONDS: u64 = 60;

/// JWKS (JSON Web Key Set)
#[derive(Debug, Clone, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

/// Individual JWK (JSON Web Key)
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub kid: Option<String>,
    pub n: Option<String>, // RSA modulus
    pub e: Option<String>, // RSA exponent
    pub x: Option<String>, // EC x coordinate
    pub y: Option<String>, // EC y coordinate
}

impl Jwks {
    /// Find a key by kid; tokens without a kid use the first key.
    pub fn find_key(&self, kid: Option<&str>) -> Option<&Jwk> {
        match kid {
            Some(kid) => self.keys.iter().find(|k| k.kid.as_deref() == Some(kid)),
            None => self.keys.first(),
        }
    }
}

pub fn jwk_to_decoding_key(jwk: &Jwk) -> Result<DecodingKey> {
    match jwk.kty.as_str() {
        "RSA" => {
            let n = jwk.n.as_deref().ok_or_else(|| SsoError::invalid_token("RSA key missing 'n' component"))?;
            let e = jwk.e.as_deref().ok_or_else(|| SsoError::invalid_token("RSA key missing 'e' component"))?;
            DecodingKey::from_rsa_components(n, e)
                .map_err(|e| SsoError::invalid_token(format!("Failed to create RSA decoding key: {}", e)))
        }
        "EC" => {
            let x = jwk.x.as_deref().ok_or_else(|| SsoError::invalid_token("EC key missing 'x' component"))?;
            let y = jwk.y.as_deref().ok_or_else(|| SsoError::invalid_token("EC key missing 'y' component"))?;
            DecodingKey::from_ec_components(x, y)
                .map_err(|e| SsoError::invalid_token(format!("Failed to create EC decoding key: {}", e)))
        }
        other => Err(SsoError::invalid_token(format!("Unsupported key type: {}", other))),
    }
}

fn is_hmac(algorithm: Algorithm) -> bool {
    matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

/// Check the `nonce` claim against the value stored with the login state.
pub fn verify_nonce(claims: &Map<String, Value>, expected: &str) -> Result<()> {
    match claims.get("nonce").and_then(Value::as_str) {
        Some(nonce) if nonce == expected => Ok(()),
        _ => Err(SsoError::invalid_token("Nonce mismatch")),
    }
}

impl IdentityProviderClient {
    async fn fetch_jwks(&self) -> Result<Jwks> {
        let metadata = self.metadata().await?;

        debug!(jwks_uri = %metadata.jwks_uri, "Fetching JWKS");

        let response = self.http_client.get(&metadata.jwks_uri).send().await?;

        if !response.status().is_success() {
            return Err(SsoError::provider(format!(
                "JWKS fetch returned status: {}",
                response.status()
            )));
        }

        Ok(response.json::<Jwks>().await?)
    }

    /// JWKS, from cache unless stale or `force_refresh` is set
    async fn jwks(&self, force_refresh: bool) -> Result<Jwks> {
        if !force_refresh {
            let cache = self.jwks_cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.fetched_at.elapsed() < self.config.metadata_cache_ttl {
                    return Ok(cached.value.clone());
                }
            }
        }

        let jwks = self.fetch_jwks().await?;

        {
            let mut cache = self.jwks_cache.write().await;
            *cache = Some(Cached {
                value: jwks.clone(),
                fetched_at: Instant::now(),
            });
        }

        info!("JWKS cache refreshed with {} keys", jwks.keys.len());
        Ok(jwks)
    }

    async fn decoding_key(&self, algorithm: Algorithm, kid: Option<&str>) -> Result<DecodingKey> {
        if is_hmac(algorithm) {
            if self.config.client_secret.is_empty() {
                return Err(SsoError::invalid_token(
                    "HMAC signed ID token but no client secret configured",
                ));
            }
            return Ok(DecodingKey::from_secret(self.config.client_secret.as_bytes()));
        }

        let jwks = self.jwks(false).await?;
        if let Some(jwk) = jwks.find_key(kid) {
            return jwk_to_decoding_key(jwk);
        }

        debug!(kid = ?kid, "Unknown key id, refreshing JWKS");
        let jwks = self.jwks(true).await?;
        let jwk = jwks
            .find_key(kid)
            .ok_or_else(|| SsoError::invalid_token(format!("No matching key found for kid: {:?}", kid)))?;
        jwk_to_decoding_key(jwk)
    }

    /// Validate an ID token and return its claims.
    pub async fn validate_id_token(&self, token: &str, expected_nonce: &str) -> Result<Map<String, Value>> {
        let header = decode_header(token)
            .map_err(|e| SsoError::invalid_token(format!("Failed to decode token header: {}", e)))?;

        let key = self.decoding_key(header.alg, header.kid.as_deref()).await?;
        let metadata = self.metadata().await?;

        let mut validation = Validation::new(header.alg);
        validation.set_issuer(&[metadata.issuer.as_str()]);
        validation.set_audience(&[self.config.client_id.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = CLOCK_SKEW_SECONDS;

        let token_data = decode::<Map<String, Value>>(token, &key, &validation)
            .map_err(|e| SsoError::invalid_token(format!("Token validation failed: {}", e)))?;

        verify_nonce(&token_data.claims, expected_nonce)?;

        debug!(
            sub = ?token_data.claims.get("sub"),
            "ID token validated successfully"
        );

        Ok(token_data.claims)
    }
}
