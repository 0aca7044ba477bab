pub mod rest;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiError;
use crate::web::state::AppState;

// Re-export the handlers to make them easily accessible to the binary.
pub use rest::{download_handler, generate_handler, ApiDoc};

/// Builds the complete application router: API routes, CORS, request tracing
/// and the Swagger UI.
pub fn router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let mut api_router = Router::new()
        .route("/generate", post(generate_handler))
        .route("/download/{email}/{unique_id}", get(download_handler))
        .layer(DefaultBodyLimit::max(app_state.config.max_body_bytes));

    if let Some(origin) = &app_state.config.cors_allow_origin {
        let origin = origin.parse::<HeaderValue>().map_err(|e| {
            ApiError::Internal(format!("Invalid CORS origin '{}': {}", origin, e))
        })?;
        let cors = CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE]);
        api_router = api_router.layer(cors);
    }

    let app = Router::new()
        .merge(api_router.with_state(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http());

    Ok(app)
}
