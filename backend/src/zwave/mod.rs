//! Z-Wave configuration panel backend: device options storage and read-only
//! views over the network.

pub mod device_config;
pub mod model;
pub mod network;

pub use device_config::{
    DeviceConfigEditor, DeviceConfigError, DeviceConfigMap, DeviceConfigStore, JsonFileStore,
};
pub use model::{
    value_summaries, ConfigParameter, Genre, GroupSummary, UserCode, ValueSummary, ZWaveGroup,
    ZWaveNode, ZWaveValue, COMMAND_CLASS_CONFIGURATION, COMMAND_CLASS_USER_CODE,
};
pub use network::{NetworkError, NetworkSnapshot, SnapshotNetwork, ZWaveNetwork};
