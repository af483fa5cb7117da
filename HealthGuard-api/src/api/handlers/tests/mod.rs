// Handler tests run the full router against in-memory services and fake models

mod auth_test;
mod history_test;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use health_guard_domain::analysis::ModelProvider;
use health_guard_domain::auth::{TokenConfig, TokenService};
use health_guard_domain::testing::{fake_model_provider, in_memory_services, MockHealthService};

use crate::api::create_app;
use crate::api::state::{AppState, HealthServiceRef};

pub(super) const BOUNDARY: &str = "healthguard-test-boundary";
pub(super) const PASSWORD: &str = "secret123";

/// Router plus the token service it trusts
pub(super) struct TestApp {
    pub router: Router,
    pub tokens: Arc<TokenService>,
}

pub(super) fn test_app() -> TestApp {
    test_app_with(Arc::new(fake_model_provider(95.3)), Arc::new(MockHealthService::new()))
}

pub(super) fn test_app_with(models: Arc<dyn ModelProvider>, health: HealthServiceRef) -> TestApp {
    let (users, history) = in_memory_services();
    let tokens = TokenService::new(&TokenConfig::new("handler-test-secret")).unwrap();
    let state = AppState::new(users, history, models, tokens, health);
    let tokens = Arc::clone(&state.tokens);

    TestApp {
        router: create_app(state, 1024 * 1024),
        tokens,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, body)
    }

    pub async fn json(&self, method: Method, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(request.body(Body::from(body.to_string())).unwrap()).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.without_body(Method::GET, uri, token).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.without_body(Method::DELETE, uri, token).await
    }

    async fn without_body(&self, method: Method, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    pub async fn signup(&self, email: &str, sex: &str) -> (StatusCode, Value) {
        self.json(
            Method::POST,
            "/auth/signup",
            None,
            json!({
                "email": email,
                "password": PASSWORD,
                "firstname": "Awa",
                "lastname": "Diallo",
                "sex": sex,
            }),
        )
        .await
    }

    /// Sign up and log in, returning the access token
    pub async fn register(&self, email: &str, sex: &str) -> String {
        let (status, _) = self.signup(email, sex).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .json(Method::POST, "/auth/login", None, json!({ "email": email, "password": PASSWORD }))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn predict(&self, token: &str, analysis_type: Option<&str>, image: Option<Vec<u8>>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/predict")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(multipart_body(analysis_type, image.as_deref())))
            .unwrap();
        self.send(request).await
    }
}

pub(super) fn multipart_body(analysis_type: Option<&str>, image: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(analysis_type) = analysis_type {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"type\"\r\n\r\n{}\r\n",
                BOUNDARY, analysis_type
            )
            .as_bytes(),
        );
    }
    if let Some(image) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"scan.png\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY
            )
            .as_bytes(),
        );
        body.extend_from_slice(image);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}
