use std::time::Duration;

use axum::http::StatusCode;

use health_guard_domain::testing::sample_png;

use super::test_app;

#[tokio::test]
async fn test_history_is_newest_first_and_deletable() {
    let app = test_app();
    let token = app.register("awa@example.com", "F").await;

    let (status, body) = app.get("/api/v1/history", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    app.predict(&token, Some("nail"), Some(sample_png())).await;
    tokio::time::sleep(Duration::from_millis(2)).await;
    app.predict(&token, Some("skin"), Some(sample_png())).await;

    let (_, body) = app.get("/api/v1/history", Some(&token)).await;
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["analysis_type"], "skin");
    assert_eq!(entries[1]["analysis_type"], "nail");

    let (status, body) = app.delete("/api/v1/history", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 2);

    let (_, body) = app.get("/api/v1/history", Some(&token)).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_export_contains_profile_and_history() {
    let app = test_app();
    let token = app.register("awa@example.com", "F").await;
    app.predict(&token, Some("eye"), Some(sample_png())).await;

    let (status, body) = app.get("/api/v1/history/export", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "awa@example.com");
    assert_eq!(body["history"].as_array().unwrap().len(), 1);
    assert!(body["exported_at"].is_string());
}

#[tokio::test]
async fn test_users_listing_and_per_user_history() {
    let app = test_app();
    let awa = app.register("awa@example.com", "F").await;
    let moussa = app.register("moussa@example.com", "M").await;
    app.predict(&awa, Some("nail"), Some(sample_png())).await;

    let (status, body) = app.get("/api/v1/users", Some(&moussa)).await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));

    let awa_id = app.tokens.validate(&awa).unwrap().sub;
    let (status, body) = app
        .get(&format!("/api/v1/users/{}/history", awa_id), Some(&moussa))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = app.get("/api/v1/users/nobody/history", Some(&moussa)).await;
    assert!(body.as_array().unwrap().is_empty());
}
