//! HTTP API Integration Tests
//!
//! The full router is exercised in-process. Authenticated requests carry a
//! session created directly in the session store.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use sso_platform::{
    app_router, ClaimSet, GatewayConfig, GatewayState, IdentityProviderClient,
    InMemorySessionStore, Principal, RoutePolicy, SessionSettings, SessionStore, Views,
};

struct TestApp {
    router: Router,
    sessions: Arc<InMemorySessionStore>,
}

impl TestApp {
    fn new() -> Self {
        // Nothing in these tests reaches the identity provider
        let config = GatewayConfig::new("azure", "http://127.0.0.1:9", "client-id");
        let provider = Arc::new(IdentityProviderClient::new(config).unwrap());
        let sessions = Arc::new(InMemorySessionStore::new(chrono::Duration::minutes(30)));
        let gateway = GatewayState::new(
            provider,
            sessions.clone(),
            SessionSettings::default(),
            Arc::new(RoutePolicy::default()),
        );
        let views = Arc::new(Views::load().unwrap());

        Self {
            router: app_router(gateway, views),
            sessions,
        }
    }

    async fn login(&self, claims: Value) -> String {
        let claims = ClaimSet::new(claims.as_object().cloned().unwrap());
        let session = self.sessions.create(Principal::from_claims(claims, "sub")).await;
        format!("SSO_SESSION={}", session.id)
    }

    async fn send(&self, method: &str, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        self.send("GET", uri, cookie).await
    }
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

fn ann() -> Value {
    json!({
        "sub": "user-1",
        "preferred_username": "a@x.com",
        "name": "Ann",
        "email": "a@x.com",
        "groups": ["staff", "admins"]
    })
}

mod public_routes {
    use super::*;

    #[tokio::test]
    async fn test_landing_page() {
        let app = TestApp::new();
        let response = app.get("/", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        assert!(body.contains("/oauth2/authorization/azure"));
    }

    #[tokio::test]
    async fn test_landing_page_when_signed_in() {
        let app = TestApp::new();
        let cookie = app.login(ann()).await;

        let body = body_text(app.get("/", Some(&cookie)).await).await;
        assert!(body.contains("a@x.com"));
    }

    #[tokio::test]
    async fn test_login_page_notices() {
        let app = TestApp::new();

        let response = app.get("/login", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(!body.contains("Authentication failed"));

        let body = body_text(app.get("/login?error=true", None).await).await;
        assert!(body.contains("Authentication failed"));

        let body = body_text(app.get("/login?logout", None).await).await;
        assert!(body.contains("You have been logged out"));
    }

    #[tokio::test]
    async fn test_error_page() {
        let app = TestApp::new();
        let response = app.get("/error", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new();
        let response = app.get("/actuator/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"status": "UP"}));
    }

    #[tokio::test]
    async fn test_static_assets() {
        let app = TestApp::new();

        let response = app.get("/css/app.css", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");

        let response = app.get("/js/app.js", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.get("/css/missing.css", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

mod protected_routes {
    use super::*;

    #[tokio::test]
    async fn test_home_redirects_to_login() {
        let app = TestApp::new();
        let response = app.get("/home", None).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn test_unknown_path_redirects_to_login() {
        let app = TestApp::new();
        let response = app.get("/admin/settings", None).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn test_unknown_path_when_signed_in_is_404() {
        let app = TestApp::new();
        let cookie = app.login(ann()).await;

        let response = app.get("/admin/settings", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("/admin/settings"));
    }

    #[tokio::test]
    async fn test_home_with_session() {
        let app = TestApp::new();
        let cookie = app.login(ann()).await;

        let response = app.get("/home", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        assert!(body.contains("Welcome, Ann"));
        assert!(body.contains("a@x.com"));
        assert!(body.contains("groups"));
    }

    #[tokio::test]
    async fn test_home_with_sparse_claims_shows_sentinels() {
        let app = TestApp::new();
        let cookie = app.login(json!({"sub": "user-2"})).await;

        let body = body_text(app.get("/home", Some(&cookie)).await).await;
        assert!(body.contains("Unknown User"));
        assert!(body.contains("No email"));
    }

    #[tokio::test]
    async fn test_unknown_session_cookie_is_anonymous() {
        let app = TestApp::new();
        let response = app.get("/home", Some("SSO_SESSION=forged")).await;
        assert_eq!(response.status(), StatusCode::FOUND);
    }
}

mod user_api {
    use super::*;

    #[tokio::test]
    async fn test_me_without_principal() {
        let app = TestApp::new();
        let response = app.get("/api/user/me", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"authenticated": false}));
    }

    #[tokio::test]
    async fn test_me_with_principal() {
        let app = TestApp::new();
        let cookie = app
            .login(json!({"sub": "user-1", "preferred_username": "a@x.com", "name": "Ann", "email": "a@x.com"}))
            .await;

        let response = app.get("/api/user/me", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"username": "a@x.com", "name": "Ann", "email": "a@x.com", "authenticated": true})
        );
    }

    #[tokio::test]
    async fn test_attributes_without_principal() {
        let app = TestApp::new();
        let response = app.get("/api/user/attributes", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({}));
    }

    #[tokio::test]
    async fn test_attributes_with_principal() {
        let app = TestApp::new();
        let cookie = app.login(ann()).await;

        let response = app.get("/api/user/attributes", Some(&cookie)).await;
        assert_eq!(body_json(response).await, ann());
    }

    #[tokio::test]
    async fn test_openapi_document() {
        let app = TestApp::new();
        let response = app.get("/api/openapi.json", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let doc = body_json(response).await;
        assert!(doc["paths"].get("/api/user/me").is_some());
        assert!(doc["paths"].get("/api/user/attributes").is_some());
        assert!(doc["paths"].get("/actuator/health").is_some());
    }
}

mod logout {
    use super::*;

    #[tokio::test]
    async fn test_logout_clears_session() {
        let app = TestApp::new();
        let cookie = app.login(ann()).await;

        let me = body_json(app.get("/api/user/me", Some(&cookie)).await).await;
        assert_eq!(me["authenticated"], json!(true));

        let response = app.send("POST", "/logout", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");

        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.starts_with("SSO_SESSION="));
        assert!(set_cookie.contains("Max-Age=0"));

        let me = body_json(app.get("/api/user/me", Some(&cookie)).await).await;
        assert_eq!(me, json!({"authenticated": false}));
        assert!(app.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_logout_via_get() {
        let app = TestApp::new();
        let cookie = app.login(ann()).await;

        let response = app.get("/logout", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        assert!(app.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_logout_requires_session() {
        let app = TestApp::new();
        let response = app.send("POST", "/logout", None).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn test_store_invalidate_matches_logout() {
        let app = TestApp::new();
        let cookie = app.login(ann()).await;
        let id = cookie.trim_start_matches("SSO_SESSION=");

        assert!(app.sessions.invalidate(id).await.is_some());
        let me = body_json(app.get("/api/user/me", Some(&cookie)).await).await;
        assert_eq!(me, json!({"authenticated": false}));
    }
}
