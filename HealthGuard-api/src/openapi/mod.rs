use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Auth endpoints
        crate::api::handlers::auth::signup,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::refresh_token,

        // Analysis endpoints
        crate::api::handlers::predict::predict,

        // Profile endpoints
        crate::api::handlers::profile::get_profile,
        crate::api::handlers::profile::update_profile,
        crate::api::handlers::profile::change_password,

        // History endpoints
        crate::api::handlers::history::get_history,
        crate::api::handlers::history::delete_history,
        crate::api::handlers::history::export_history,

        // User endpoints
        crate::api::handlers::users::list_users,
        crate::api::handlers::users::get_user_history
    ),
    components(
        schemas(
            // Entities
            crate::entities::common::PublicErrorResponse,
            crate::entities::common::PublicMessageResponse,
            crate::entities::auth::PublicSignupRequest,
            crate::entities::auth::PublicLoginRequest,
            crate::entities::auth::PublicTokenResponse,
            crate::entities::user::PublicUser,
            crate::entities::user::PublicProfileResponse,
            crate::entities::user::PublicUpdateProfileRequest,
            crate::entities::user::PublicChangePasswordRequest,
            crate::entities::history::PublicHistoryEntry,
            crate::entities::history::PublicDeleteHistoryResponse,
            crate::entities::history::PublicDataExport,
            crate::entities::analysis::PublicPredictForm,
            crate::entities::analysis::PublicAnemiaPrediction,
            crate::entities::analysis::PublicSkinPrediction,
            crate::entities::analysis::PublicPredictionResponse,

            // Domain types exposed in responses
            health_guard_domain::analysis::AnalysisType,
            health_guard_domain::analysis::Sex,
            health_guard_domain::analysis::SeverityBand,
            health_guard_domain::analysis::AnemiaStatus,
            health_guard_domain::analysis::SkinPrediction,

            // Health handlers
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentStatus,
            crate::api::handlers::health::ComponentHealthStatus
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "Authentication", description = "Signup, login and token refresh"),
        (name = "analysis", description = "Image analysis"),
        (name = "profile", description = "The caller's account"),
        (name = "history", description = "The caller's analysis history"),
        (name = "users", description = "Registered users and their history")
    ),
    info(
        title = "HealthGuard Vision API",
        version = "0.1.0",
        description = "Anemia and skin condition screening from photographs",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;
