//! Data Transfer Objects for the HTTP API.
//!
//! Z-Wave view shapes and sensor updates already derive Serialize and are
//! re-exported from their modules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use crate::weather::SensorUpdate;
pub use crate::zwave::{ConfigParameter, GroupSummary, UserCode, ValueSummary};

pub type ValuesResponse = BTreeMap<u64, ValueSummary>;
pub type GroupsResponse = BTreeMap<u8, GroupSummary>;
pub type ConfigResponse = BTreeMap<u32, ConfigParameter>;
pub type UserCodesResponse = BTreeMap<u32, UserCode>;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Crate version
    pub version: String,
    /// Whether a Z-Wave network is attached
    pub zwave_network: bool,
    /// Number of weather sensors that have published a state
    pub weather_sensors: usize,
}

/// `{"result": ...}` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultResponse {
    pub result: String,
}

impl ResultResponse {
    pub fn ok() -> Self {
        Self {
            result: "ok".to_string(),
        }
    }
}

/// `{"message": ...}` body, used for confirmations and errors alike.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Weather sensor listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorListResponse {
    pub sensors: Vec<SensorUpdate>,
    pub total: usize,
}
