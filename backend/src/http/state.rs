//! Application state for the HTTP server.

use std::sync::Arc;

use crate::weather::SensorStateRegistry;
use crate::zwave::{DeviceConfigEditor, DeviceConfigStore, ZWaveNetwork};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Per-entity Z-Wave options
    pub device_config: Arc<DeviceConfigEditor>,
    /// The Z-Wave network, when one is attached
    pub network: Option<Arc<dyn ZWaveNetwork>>,
    /// Latest published weather sensor states
    pub sensors: Arc<SensorStateRegistry>,
}

impl AppState {
    pub fn new(store: Arc<dyn DeviceConfigStore>) -> Self {
        Self {
            device_config: Arc::new(DeviceConfigEditor::new(store)),
            network: None,
            sensors: Arc::new(SensorStateRegistry::new()),
        }
    }

    pub fn with_network(mut self, network: Arc<dyn ZWaveNetwork>) -> Self {
        self.network = Some(network);
        self
    }

    pub fn with_sensors(mut self, sensors: Arc<SensorStateRegistry>) -> Self {
        self.sensors = sensors;
        self
    }
}
