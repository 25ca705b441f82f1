//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application: the
//! session REST surface, the WebSocket relay endpoint and the OpenAPI
//! documentation.

use crate::{
    handlers,
    models::{ErrorResponse, SessionInfo},
    state::AppState,
    ws::ws_handler,
};

use axum::{Router, routing::get};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::list_sessions, handlers::get_session),
    components(schemas(SessionInfo, ErrorResponse)),
    tags(
        (name = "Healthbridge API", description = "Streaming relay between clients and the health agent")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Group all routes that require AppState into their own router.
    let api_router = Router::new()
        .route("/sessions", get(handlers::list_sessions))
        .route("/sessions/{id}", get(handlers::get_session))
        .route("/ws/{session_id}", get(ws_handler))
        // Apply the state ONLY to this group of routes.
        .with_state(app_state);

    // Merge the stateful routes with the stateless Swagger UI routes.
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
