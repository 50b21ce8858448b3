//! Where sensor state changes go.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use super::sensor::SensorUpdate;

/// Receives a sensor's new state whenever it changes.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; the refresher publishes all changed
/// sensors concurrently.
#[async_trait]
pub trait EntityUpdateSink: Send + Sync {
    async fn publish(&self, update: SensorUpdate);
}

/// In-memory sink holding the latest state of every sensor, keyed by entity id.
#[derive(Debug, Default)]
pub struct SensorStateRegistry {
    states: RwLock<BTreeMap<String, SensorUpdate>>,
}

impl SensorStateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, entity_id: &str) -> Option<SensorUpdate> {
        self.states.read().get(entity_id).cloned()
    }

    pub fn all(&self) -> Vec<SensorUpdate> {
        self.states.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.states.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.read().is_empty()
    }
}

#[async_trait]
impl EntityUpdateSink for SensorStateRegistry {
    async fn publish(&self, update: SensorUpdate) {
        debug!(entity_id = %update.entity_id, state = ?update.state, "Sensor state changed");
        self.states.write().insert(update.entity_id.clone(), update);
    }
}
