//! Z-Wave node data as exposed by the network driver, and the shapes the
//! config panel reads.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub const COMMAND_CLASS_USER_CODE: u8 = 99;
pub const COMMAND_CLASS_CONFIGURATION: u8 = 112;

/// Value genre as reported by OpenZWave.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    Basic,
    #[default]
    User,
    Config,
    System,
}

/// One value on a node.
///
/// `data`, `data_items`, `min` and `max` are passed through untouched; their
/// type depends on the value type (bool, byte, list, string, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZWaveValue {
    pub value_id: u64,
    pub node_id: u8,
    pub command_class: u8,
    #[serde(default)]
    pub genre: Genre,
    #[serde(default)]
    pub instance: u32,
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub help: String,
    #[serde(rename = "type", default)]
    pub value_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub data_items: serde_json::Value,
    #[serde(default)]
    pub min: serde_json::Value,
    #[serde(default)]
    pub max: serde_json::Value,
    #[serde(default)]
    pub poll_intensity: u32,
}

/// An association group on a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZWaveGroup {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub associations: Vec<u8>,
    /// `[node_id, instance]` pairs.
    #[serde(default)]
    pub associations_instances: Vec<[u8; 2]>,
    #[serde(default)]
    pub max_associations: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZWaveNode {
    pub node_id: u8,
    #[serde(default)]
    pub command_classes: BTreeSet<u8>,
    #[serde(default)]
    pub values: Vec<ZWaveValue>,
    /// Keyed by group index.
    #[serde(default)]
    pub groups: BTreeMap<u8, ZWaveGroup>,
}

/// `GET /api/zwave/values/{node_id}` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSummary {
    pub label: String,
    pub index: u32,
    pub instance: u32,
    pub poll_intensity: u32,
}

/// `GET /api/zwave/groups/{node_id}` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub associations: Vec<u8>,
    pub association_instances: Vec<[u8; 2]>,
    pub label: String,
    pub max_associations: u32,
}

/// `GET /api/zwave/config/{node_id}` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigParameter {
    pub label: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub help: String,
    pub data_items: serde_json::Value,
    pub data: serde_json::Value,
    pub max: serde_json::Value,
    pub min: serde_json::Value,
}

/// `GET /api/zwave/usercodes/{node_id}` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCode {
    pub code: String,
    pub label: String,
    pub length: usize,
}

impl ZWaveNode {
    pub fn has_command_class(&self, class_id: u8) -> bool {
        self.command_classes.contains(&class_id)
    }

    pub fn values_for_class(&self, class_id: u8) -> impl Iterator<Item = &ZWaveValue> {
        self.values
            .iter()
            .filter(move |value| value.command_class == class_id)
    }

    pub fn group_summaries(&self) -> BTreeMap<u8, GroupSummary> {
        self.groups
            .iter()
            .map(|(index, group)| {
                (
                    *index,
                    GroupSummary {
                        associations: group.associations.clone(),
                        association_instances: group.associations_instances.clone(),
                        label: group.label.clone(),
                        max_associations: group.max_associations,
                    },
                )
            })
            .collect()
    }

    /// Configuration-class values keyed by parameter index.
    pub fn config_parameters(&self) -> BTreeMap<u32, ConfigParameter> {
        self.values_for_class(COMMAND_CLASS_CONFIGURATION)
            .map(|value| {
                (
                    value.index,
                    ConfigParameter {
                        label: value.label.clone(),
                        value_type: value.value_type.clone(),
                        help: value.help.clone(),
                        data_items: value.data_items.clone(),
                        data: value.data.clone(),
                        max: value.max.clone(),
                        min: value.min.clone(),
                    },
                )
            })
            .collect()
    }

    /// User-genre codes keyed by slot index. Empty unless the node supports
    /// the user-code command class.
    pub fn user_codes(&self) -> BTreeMap<u32, UserCode> {
        if !self.has_command_class(COMMAND_CLASS_USER_CODE) {
            return BTreeMap::new();
        }

        self.values_for_class(COMMAND_CLASS_USER_CODE)
            .filter(|value| value.genre == Genre::User)
            .map(|value| {
                let code = match &value.data {
                    serde_json::Value::String(code) => code.clone(),
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                };
                let length = code.chars().count();
                (
                    value.index,
                    UserCode {
                        code,
                        label: value.label.clone(),
                        length,
                    },
                )
            })
            .collect()
    }
}

/// Entity primary values belonging to `node_id`, keyed by value id.
pub fn value_summaries(values: &[ZWaveValue], node_id: u8) -> BTreeMap<u64, ValueSummary> {
    values
        .iter()
        .filter(|value| value.node_id == node_id)
        .map(|value| {
            (
                value.value_id,
                ValueSummary {
                    label: value.label.clone(),
                    index: value.index,
                    instance: value.instance,
                    poll_intensity: value.poll_intensity,
                },
            )
        })
        .collect()
}
