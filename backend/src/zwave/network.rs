//! Access to the running Z-Wave network.
//!
//! The HTTP layer only needs read access to nodes and entity values plus the
//! ability to persist the driver configuration, so that is all
//! [`ZWaveNetwork`] exposes. [`SnapshotNetwork`] serves a network captured to
//! a JSON file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::model::{ZWaveNode, ZWaveValue};

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("network I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("network data is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type NetworkResult<T> = Result<T, NetworkError>;

#[async_trait]
pub trait ZWaveNetwork: Send + Sync {
    fn node(&self, node_id: u8) -> Option<ZWaveNode>;

    /// Primary values of every Z-Wave entity, across all nodes.
    fn entity_values(&self) -> Vec<ZWaveValue>;

    /// Persist the network configuration.
    async fn write_config(&self) -> NetworkResult<()>;
}

/// Serialized form of a network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    #[serde(default)]
    pub nodes: Vec<ZWaveNode>,
    #[serde(default)]
    pub entity_values: Vec<ZWaveValue>,
}

/// A network backed by an in-memory snapshot.
pub struct SnapshotNetwork {
    snapshot: RwLock<NetworkSnapshot>,
    config_path: PathBuf,
}

impl SnapshotNetwork {
    /// `config_path` is where [`ZWaveNetwork::write_config`] writes.
    pub fn new(snapshot: NetworkSnapshot, config_path: impl Into<PathBuf>) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            config_path: config_path.into(),
        }
    }

    pub async fn load(path: &Path, config_path: impl Into<PathBuf>) -> NetworkResult<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        let snapshot: NetworkSnapshot = serde_json::from_str(&text)?;
        info!(
            path = %path.display(),
            nodes = snapshot.nodes.len(),
            "Loaded Z-Wave network snapshot"
        );
        Ok(Self::new(snapshot, config_path))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

#[async_trait]
impl ZWaveNetwork for SnapshotNetwork {
    fn node(&self, node_id: u8) -> Option<ZWaveNode> {
        self.snapshot
            .read()
            .nodes
            .iter()
            .find(|node| node.node_id == node_id)
            .cloned()
    }

    fn entity_values(&self) -> Vec<ZWaveValue> {
        self.snapshot.read().entity_values.clone()
    }

    async fn write_config(&self) -> NetworkResult<()> {
        let body = {
            let snapshot = self.snapshot.read();
            serde_json::to_string_pretty(&*snapshot)?
        };
        tokio::fs::write(&self.config_path, body).await?;
        info!(path = %self.config_path.display(), "Z-Wave configuration written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot() -> NetworkSnapshot {
        serde_json::from_value(json!({
            "nodes": [
                {"node_id": 2, "command_classes": [112]},
                {"node_id": 5}
            ],
            "entity_values": [
                {"value_id": 77, "node_id": 2, "command_class": 37, "label": "Switch"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_node_lookup() {
        let network = SnapshotNetwork::new(snapshot(), "unused.json");
        assert_eq!(network.node(2).map(|n| n.node_id), Some(2));
        assert!(network.node(3).is_none());
        assert_eq!(network.entity_values().len(), 1);
    }

    #[tokio::test]
    async fn test_write_config_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("zwcfg.json");
        let network = SnapshotNetwork::new(snapshot(), &config_path);

        network.write_config().await.unwrap();

        let reloaded = SnapshotNetwork::load(&config_path, dir.path().join("other.json"))
            .await
            .unwrap();
        assert_eq!(reloaded.node(2), network.node(2));
        assert_eq!(reloaded.entity_values(), network.entity_values());
    }

    #[tokio::test]
    async fn test_load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, "not json").unwrap();

        let err = SnapshotNetwork::load(&path, dir.path().join("out.json"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, NetworkError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SnapshotNetwork::load(&dir.path().join("absent.json"), "out.json")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, NetworkError::Io(_)));
    }
}
