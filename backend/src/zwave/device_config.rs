//! Per-entity Z-Wave device options.
//!
//! Options live in one JSON object keyed by entity id:
//!
//! ```json
//! { "light.kitchen": { "polling_intensity": 2, "ignored": false } }
//! ```
//!
//! Writes go through [`DeviceConfigEditor`], which serializes the
//! read-merge-write cycle so concurrent updates cannot drop each other.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub type DeviceConfigMap = Map<String, Value>;

pub const OPTION_IGNORED: &str = "ignored";
pub const OPTION_POLLING_INTENSITY: &str = "polling_intensity";

#[derive(Debug, Error)]
pub enum DeviceConfigError {
    #[error("Invalid JSON specified")]
    InvalidJson,

    #[error("Key malformed: {0}")]
    InvalidKey(String),

    #[error("Message malformed: {0}")]
    InvalidData(String),

    #[error("device config I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("device config is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DeviceConfigError {
    /// Whether the caller sent something wrong, as opposed to a storage fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DeviceConfigError::InvalidJson
                | DeviceConfigError::InvalidKey(_)
                | DeviceConfigError::InvalidData(_)
        )
    }
}

pub type DeviceConfigResult<T> = Result<T, DeviceConfigError>;

#[async_trait]
pub trait DeviceConfigStore: Send + Sync {
    async fn read(&self) -> DeviceConfigResult<DeviceConfigMap>;
    async fn write(&self, config: &DeviceConfigMap) -> DeviceConfigResult<()>;
}

/// Stores the map as pretty-printed JSON. A missing or empty file reads as
/// an empty map.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DeviceConfigStore for JsonFileStore {
    async fn read(&self) -> DeviceConfigResult<DeviceConfigMap> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No device config file yet");
                return Ok(Map::new());
            }
            Err(err) => return Err(err.into()),
        };

        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn write(&self, config: &DeviceConfigMap) -> DeviceConfigResult<()> {
        let body = serde_json::to_string_pretty(config)?;
        tokio::fs::write(&self.path, body).await?;
        Ok(())
    }
}

/// Checks `domain.object_id`, both parts non-empty `[a-z0-9_]`.
pub fn validate_entity_id(entity_id: &str) -> DeviceConfigResult<()> {
    let valid_part =
        |part: &str| !part.is_empty() && part.bytes().all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_'));

    match entity_id.split_once('.') {
        Some((domain, object_id)) if valid_part(domain) && valid_part(object_id) => Ok(()),
        _ => Err(DeviceConfigError::InvalidKey(format!(
            "invalid entity id {}",
            entity_id
        ))),
    }
}

fn is_boolean_like(value: &Value) -> bool {
    match value {
        Value::Bool(_) | Value::Number(_) => true,
        Value::String(s) => matches!(
            s.to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enable" | "0" | "false" | "no" | "off" | "disable"
        ),
        _ => false,
    }
}

fn is_non_negative_int(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::Number(n) => {
            n.as_u64().is_some() || n.as_f64().is_some_and(|f| f.is_finite() && f.trunc() >= 0.0)
        }
        Value::String(s) => s.trim().parse::<i64>().is_ok_and(|n| n >= 0),
        _ => false,
    }
}

/// Checks an options body: an object holding only known options with
/// acceptable values.
pub fn validate_options(data: &Value) -> DeviceConfigResult<&DeviceConfigMap> {
    let Value::Object(options) = data else {
        return Err(DeviceConfigError::InvalidData(
            "expected a dictionary".to_string(),
        ));
    };

    for (key, value) in options {
        let valid = match key.as_str() {
            OPTION_IGNORED => is_boolean_like(value),
            OPTION_POLLING_INTENSITY => is_non_negative_int(value),
            other => {
                return Err(DeviceConfigError::InvalidData(format!(
                    "extra keys not allowed @ data['{}']",
                    other
                )))
            }
        };
        if !valid {
            return Err(DeviceConfigError::InvalidData(format!(
                "invalid value for data['{}']: {}",
                key, value
            )));
        }
    }

    Ok(options)
}

/// Merge `options` into the entity's object, creating it if needed. Keys not
/// in `options` are kept.
pub fn merge_entity(config: &mut DeviceConfigMap, entity_id: &str, options: &DeviceConfigMap) {
    let entry = config
        .entry(entity_id.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(existing) = entry {
        for (key, value) in options {
            existing.insert(key.clone(), value.clone());
        }
    }
}

/// Reads and updates device options through a [`DeviceConfigStore`].
pub struct DeviceConfigEditor {
    store: Arc<dyn DeviceConfigStore>,
    write_lock: Mutex<()>,
}

impl DeviceConfigEditor {
    pub fn new(store: Arc<dyn DeviceConfigStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Options stored for `entity_id`, `{}` when none are.
    pub async fn get(&self, entity_id: &str) -> DeviceConfigResult<Value> {
        validate_entity_id(entity_id)?;
        let mut config = self.store.read().await?;
        Ok(config
            .remove(entity_id)
            .unwrap_or_else(|| Value::Object(Map::new())))
    }

    /// Validate a raw request body and merge it into the entity's options.
    ///
    /// Checks run in order: body is JSON, entity id is well formed, options
    /// are valid. Nothing is written unless all pass.
    pub async fn update(&self, entity_id: &str, body: &[u8]) -> DeviceConfigResult<()> {
        let data: Value =
            serde_json::from_slice(body).map_err(|_| DeviceConfigError::InvalidJson)?;
        validate_entity_id(entity_id)?;
        let options = validate_options(&data)?;

        let _guard = self.write_lock.lock().await;
        let mut config = self.store.read().await?;
        merge_entity(&mut config, entity_id, options);
        self.store.write(&config).await?;

        info!(entity_id, "Device config updated");
        Ok(())
    }
}

#[cfg(test)]
#[path = "device_config_tests.rs"]
mod device_config_tests;
