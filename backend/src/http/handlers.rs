//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! `zwave` and `weather` modules for the actual work.

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use super::dto::{
    ConfigResponse, GroupsResponse, HealthResponse, MessageResponse, ResultResponse,
    SensorListResponse, UserCodesResponse, ValuesResponse,
};
use super::error::{AppError, NO_NETWORK};
use super::state::AppState;
use crate::zwave::{value_summaries, ZWaveNode};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        zwave_network: state.network.is_some(),
        weather_sensors: state.sensors.len(),
    }))
}

// =============================================================================
// Device Config
// =============================================================================

/// GET /api/config/zwave/device_config/{entity_id}
pub async fn get_device_config(
    State(state): State<AppState>,
    Path(entity_id): Path<String>,
) -> HandlerResult<Value> {
    let options = state.device_config.get(&entity_id).await?;
    Ok(Json(options))
}

/// POST /api/config/zwave/device_config/{entity_id}
///
/// Takes the raw body so that "not JSON" can be told apart from the other
/// validation failures.
pub async fn update_device_config(
    State(state): State<AppState>,
    Path(entity_id): Path<String>,
    body: Bytes,
) -> HandlerResult<ResultResponse> {
    state.device_config.update(&entity_id, &body).await?;
    Ok(Json(ResultResponse::ok()))
}

// =============================================================================
// Z-Wave Views
// =============================================================================

fn parse_node_id(raw: &str) -> Result<u8, AppError> {
    raw.parse().map_err(|_| AppError::node_not_found())
}

fn find_node(state: &AppState, raw_node_id: &str) -> Result<ZWaveNode, AppError> {
    let node_id = parse_node_id(raw_node_id)?;
    state
        .network
        .as_ref()
        .and_then(|network| network.node(node_id))
        .ok_or_else(AppError::node_not_found)
}

/// GET /api/zwave/values/{node_id}
pub async fn get_node_values(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
) -> HandlerResult<ValuesResponse> {
    let node_id = parse_node_id(&node_id)?;
    let values = match &state.network {
        Some(network) => value_summaries(&network.entity_values(), node_id),
        None => ValuesResponse::new(),
    };
    Ok(Json(values))
}

/// GET /api/zwave/groups/{node_id}
pub async fn get_node_groups(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
) -> HandlerResult<GroupsResponse> {
    let node = find_node(&state, &node_id)?;
    Ok(Json(node.group_summaries()))
}

/// GET /api/zwave/config/{node_id}
pub async fn get_node_config(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
) -> HandlerResult<ConfigResponse> {
    let node = find_node(&state, &node_id)?;
    Ok(Json(node.config_parameters()))
}

/// GET /api/zwave/usercodes/{node_id}
pub async fn get_node_user_codes(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
) -> HandlerResult<UserCodesResponse> {
    let node = find_node(&state, &node_id)?;
    Ok(Json(node.user_codes()))
}

/// POST /api/zwave/saveconfig
pub async fn save_network_config(State(state): State<AppState>) -> HandlerResult<MessageResponse> {
    let network = state
        .network
        .as_ref()
        .ok_or_else(|| AppError::NotFound(NO_NETWORK.to_string()))?;

    network.write_config().await?;
    Ok(Json(MessageResponse::new(
        "Z-Wave configuration saved to file.",
    )))
}

// =============================================================================
// Weather
// =============================================================================

/// GET /api/weather/sensors
pub async fn list_weather_sensors(
    State(state): State<AppState>,
) -> HandlerResult<SensorListResponse> {
    let sensors = state.sensors.all();
    let total = sensors.len();
    Ok(Json(SensorListResponse { sensors, total }))
}
