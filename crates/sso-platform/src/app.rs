//! Router assembly

use std::sync::Arc;

use axum::{middleware, routing::get, Json, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::gateway::{enforce_route_policy, gateway_router, GatewayState};
use crate::shared::error::ErrorResponse;
use crate::shared::health_api::{self, health_router, HealthStatus, SimpleHealthResponse};
use crate::web::{pages_router, static_router, user_router, CurrentUserResponse, Views, WebState};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SSO Demo API",
        version = "0.1.0",
        description = "Identity of the signed-in user and service health"
    ),
    paths(health_api::get_health),
    components(schemas(
        SimpleHealthResponse,
        HealthStatus,
        CurrentUserResponse,
        ErrorResponse,
    )),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "user", description = "Signed-in user endpoints"),
    )
)]
pub struct ApiDoc;

/// Build the complete application router.
///
/// Every route sits behind the route policy layer, which resolves the
/// session cookie and redirects unauthenticated browser requests for
/// protected pages to the login page.
pub fn app_router(gateway: GatewayState, views: Arc<Views>) -> Router {
    let web = WebState::new(views, &gateway.provider.config().registration_id);

    let (api_router, openapi) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api/user", user_router())
        .split_for_parts();

    Router::new()
        .merge(pages_router(web))
        .merge(api_router)
        .route(
            "/api/openapi.json",
            get(move || {
                let doc = openapi.clone();
                async move { Json(doc) }
            }),
        )
        .merge(gateway_router(gateway.clone()))
        .merge(static_router())
        .merge(health_router())
        .layer(middleware::from_fn_with_state(
            gateway.session_context(),
            enforce_route_policy,
        ))
        .layer(TraceLayer::new_for_http())
}
