//! SSO Demo Server
//!
//! Browser single sign-on against an external OIDC identity provider:
//! - Pages: `/`, `/login`, `/home`, `/error`
//! - User API: `/api/user/me`, `/api/user/attributes`
//! - Login flow: `/oauth2/authorization/{id}`, `/login/oauth2/code/{id}`, `/logout`
//! - Health: `/actuator/health`
//!
//! ## Configuration
//!
//! Read from `config.toml` (or `SSO_CONFIG`), overridden by `SSO_*`
//! environment variables. Run with `--example-config` to print a template.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SSO_HTTP_PORT` | `8080` | HTTP port |
//! | `SSO_OIDC_ISSUER_URL` | - | Identity provider issuer |
//! | `SSO_AZURE_TENANT_ID` | - | Azure AD tenant (derives the issuer) |
//! | `SSO_OIDC_CLIENT_ID` | - | Client id |
//! | `SSO_OIDC_CLIENT_SECRET` | - | Client secret |
//! | `LOG_FORMAT` | `text` | `text` or `json` |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;

use sso_config::{AppConfig, ConfigLoader};
use sso_platform::{
    app_router, GatewayConfig, GatewayState, IdentityProviderClient, InMemorySessionStore,
    RoutePolicy, SessionSettings, Views,
};

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args().any(|arg| arg == "--example-config") {
        println!("{}", AppConfig::example_toml());
        return Ok(());
    }

    sso_common::logging::init_logging("sso-server");

    info!("Starting SSO demo server");

    let config = ConfigLoader::new().load()?;
    config.validate()?;

    let issuer = config.oidc.effective_issuer().unwrap_or_default();
    let mut gateway_config = GatewayConfig::new(
        config.oidc.registration_id.clone(),
        issuer,
        config.oidc.client_id.clone(),
    )
    .with_client_secret(config.oidc.client_secret.clone())
    .with_external_base_url(config.oidc.external_base_url.clone());
    gateway_config.scopes = config.oidc.scope_list();
    gateway_config.user_name_attribute = config.oidc.user_name_attribute.clone();
    gateway_config.http_timeout = Duration::from_secs(config.oidc.http_timeout_secs);
    gateway_config.metadata_cache_ttl = Duration::from_secs(config.oidc.metadata_cache_secs);
    gateway_config.login_state_ttl =
        chrono::Duration::try_seconds(i64::try_from(config.session.login_state_ttl_secs)?)
            .context("session.login_state_ttl_secs out of range")?;
    gateway_config.max_pending_logins = config.session.max_pending_logins;

    info!(
        issuer = %gateway_config.issuer_url,
        registration_id = %gateway_config.registration_id,
        "Identity provider configured"
    );

    let timeout_secs = i64::try_from(config.session.timeout_secs)?;
    let session_ttl = chrono::Duration::try_seconds(timeout_secs)
        .context("session.timeout_secs out of range")?;
    let provider = Arc::new(IdentityProviderClient::new(gateway_config)?);
    let sessions = Arc::new(InMemorySessionStore::new(session_ttl));
    let settings = SessionSettings::new(
        config.session.cookie_name.clone(),
        config.session.secure,
        &config.session.same_site,
        timeout_secs,
    );

    let gateway = GatewayState::new(provider, sessions, settings, Arc::new(RoutePolicy::default()));
    let cleanup_task =
        gateway.spawn_cleanup(Duration::from_secs(config.session.cleanup_interval_secs.max(1)));

    let views = Arc::new(Views::load()?);
    let app = app_router(gateway, views);

    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on http://{}", addr);
    info!("Application started successfully");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cleanup_task.abort();
    info!("SSO demo server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received...");
}
