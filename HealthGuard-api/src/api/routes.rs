use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Extension, Router,
};
use tower_http::trace::TraceLayer;
use tracing::debug;

use health_guard_domain::auth::{auth_middleware, configure_security};

use crate::api::handlers::{auth, health, history, predict, profile, users};
use crate::api::state::AppState;
use crate::openapi::configure_swagger_routes;

/// Create the application router
pub fn create_app(state: AppState, max_upload_bytes: usize) -> Router {
    debug!("Creating application router");

    // Set up API routes that require authentication
    let api_routes = Router::new()
        .route("/predict", post(predict::predict))
        .route("/profile", get(profile::get_profile).put(profile::update_profile))
        .route("/profile/password", put(profile::change_password))
        .route("/history/export", get(history::export_history))
        .route("/history", get(history::get_history).delete(history::delete_history))
        .route("/users", get(users::list_users))
        .route("/users/:user_id/history", get(users::get_user_history))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(middleware::from_fn_with_state(state.tokens.clone(), auth_middleware));

    debug!("API routes configured");

    // Set up public routes that don't require authentication
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh_token))
        .layer(Extension(state.health.clone()));

    debug!("Public routes configured");

    let app = Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .with_state(state);

    // Configure the Swagger UI using the helper function
    let app = add_swagger_ui(app);
    debug!("Swagger UI merged");

    // Apply security configuration
    let app = configure_security(app).layer(TraceLayer::new_for_http());
    debug!("Security configuration applied");

    // Initialize health check service startup time
    health::initialize_server_start_time();

    app
}

/// Add Swagger UI to the router
pub fn add_swagger_ui(app: Router) -> Router {
    app.merge(configure_swagger_routes())
}
