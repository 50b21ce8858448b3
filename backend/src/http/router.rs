//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Device options
        .route(
            "/config/zwave/device_config/{entity_id}",
            get(handlers::get_device_config).post(handlers::update_device_config),
        )
        // Network views
        .route("/zwave/values/{node_id}", get(handlers::get_node_values))
        .route("/zwave/groups/{node_id}", get(handlers::get_node_groups))
        .route("/zwave/config/{node_id}", get(handlers::get_node_config))
        .route("/zwave/usercodes/{node_id}", get(handlers::get_node_user_codes))
        .route("/zwave/saveconfig", post(handlers::save_network_config))
        // Weather
        .route("/weather/sensors", get(handlers::list_weather_sensors));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
