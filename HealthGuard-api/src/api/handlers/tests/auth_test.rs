use axum::http::{Method, StatusCode};
use serde_json::json;

use super::{test_app, PASSWORD};

#[tokio::test]
async fn test_signup_creates_account() {
    let app = test_app();
    let (status, body) = app.signup("awa@example.com", "F").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User created successfully");
}

#[tokio::test]
async fn test_signup_rejects_duplicate_email() {
    let app = test_app();
    app.signup("awa@example.com", "F").await;

    let (status, body) = app.signup("AWA@example.com", "F").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_signup_rejects_bad_input() {
    let app = test_app();

    let (status, body) = app.signup("awa@example.com", "X").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Invalid sex"));

    let (status, _) = app
        .json(Method::POST, "/auth/signup", None, json!({ "email": "awa@example.com", "password": PASSWORD }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::POST,
            "/auth/signup",
            None,
            json!({
                "email": "awa@example.com",
                "password": "123",
                "firstname": "Awa",
                "lastname": "Diallo",
                "sex": "F",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_issues_bearer_token() {
    let app = test_app();
    app.signup("awa@example.com", "F").await;

    let (status, body) = app
        .json(Method::POST, "/auth/login", None, json!({ "email": "awa@example.com", "password": PASSWORD }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 24 * 3600);

    let claims = app.tokens.validate(body["token"].as_str().unwrap()).unwrap();
    let (_, users) = app.get("/api/v1/users", body["token"].as_str()).await;
    assert_eq!(users[0]["id"], claims.sub);
}

#[tokio::test]
async fn test_login_failures() {
    let app = test_app();
    app.signup("awa@example.com", "F").await;

    let (status, body) = app
        .json(Method::POST, "/auth/login", None, json!({ "email": "awa@example.com", "password": "wrong-pass" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = app
        .json(Method::POST, "/auth/login", None, json!({ "email": "nobody@example.com", "password": PASSWORD }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .json(Method::POST, "/auth/login", None, json!({ "email": "awa@example.com" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_reissues_token() {
    let app = test_app();
    let token = app.register("awa@example.com", "F").await;

    let (status, body) = app.json(Method::POST, "/auth/refresh", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let refreshed = body["token"].as_str().unwrap();
    let old_claims = app.tokens.validate(&token).unwrap();
    let new_claims = app.tokens.validate(refreshed).unwrap();
    assert_eq!(old_claims.sub, new_claims.sub);
}

#[tokio::test]
async fn test_refresh_rejects_bad_tokens() {
    let app = test_app();

    let (status, _) = app.json(Method::POST, "/auth/refresh", None, json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.json(Method::POST, "/auth/refresh", Some("not.a.jwt"), json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Well-formed token for an account that does not exist
    let orphan = app.tokens.issue("missing-user").unwrap().token;
    let (status, _) = app.json(Method::POST, "/auth/refresh", Some(&orphan), json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = test_app();

    for uri in ["/api/v1/profile", "/api/v1/history", "/api/v1/users"] {
        let (status, body) = app.get(uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["error"], "unauthorized");
    }
}

#[tokio::test]
async fn test_signup_normalizes_padded_email() {
    let app = test_app();

    let (status, _) = app.signup("  Padded@Example.com ", "M").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .json(
            Method::POST,
            "/auth/login",
            None,
            json!({ "email": "padded@example.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
async fn test_signup_validation_lists_field_errors() {
    let app = test_app();

    let (status, body) = app
        .json(
            Method::POST,
            "/auth/signup",
            None,
            json!({
                "email": "awa@example.com",
                "password": "123",
                "firstname": "",
                "lastname": "Diallo",
                "sex": "F",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"]["firstname"][0], "First name is required");
    assert_eq!(body["details"]["password"][0], "Password must be at least 6 characters");
    assert!(body["details"].get("lastname").is_none());
}
