//! Forecast-backed sensor entities.

use serde::{Deserialize, Serialize};

use crate::models::{ScalarValue, SensorType};

pub const ATTRIBUTION: &str = "Weather forecast from yr.no, delivered by the Norwegian \
                               Meteorological Institute and the NRK.";

const ICON_URL: &str = "https://api.met.no/weatherapi/weathericon/1.1/";

/// A sensor subscribed to one forecast variable.
///
/// The state is only ever written by the refresher after a selection.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSensor {
    client_name: String,
    sensor_type: SensorType,
    state: Option<ScalarValue>,
}

impl WeatherSensor {
    pub fn new(client_name: impl Into<String>, sensor_type: SensorType) -> Self {
        Self {
            client_name: client_name.into(),
            sensor_type,
            state: None,
        }
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    pub fn name(&self) -> String {
        format!("{} {}", self.client_name, self.sensor_type.display_name())
    }

    /// `sensor.<slugified name>`, e.g. `sensor.yr_wind_speed`.
    pub fn entity_id(&self) -> String {
        let mut slug = String::new();
        for c in self.name().chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.ends_with('_') {
                slug.push('_');
            }
        }
        format!("sensor.{}", slug.trim_matches('_'))
    }

    pub fn state(&self) -> Option<&ScalarValue> {
        self.state.as_ref()
    }

    pub fn unit_of_measurement(&self) -> Option<&'static str> {
        self.sensor_type.unit()
    }

    /// Icon for the current weather symbol; only symbol sensors have one.
    pub fn entity_picture(&self) -> Option<String> {
        if self.sensor_type != SensorType::Symbol {
            return None;
        }
        let symbol = self
            .state
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "None".to_string());
        Some(format!("{}?symbol={};content_type=image/png", ICON_URL, symbol))
    }

    /// Replace the state. Returns whether it changed.
    pub(crate) fn set_state(&mut self, state: Option<ScalarValue>) -> bool {
        if self.state == state {
            return false;
        }
        self.state = state;
        true
    }

    pub fn snapshot(&self) -> SensorUpdate {
        SensorUpdate {
            entity_id: self.entity_id(),
            name: self.name(),
            sensor_type: self.sensor_type,
            state: self.state.clone(),
            unit_of_measurement: self.unit_of_measurement().map(str::to_string),
            entity_picture: self.entity_picture(),
            attribution: ATTRIBUTION.to_string(),
        }
    }
}

/// What gets published when a sensor's state changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorUpdate {
    pub entity_id: String,
    pub name: String,
    pub sensor_type: SensorType,
    pub state: Option<ScalarValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_picture: Option<String>,
    pub attribution: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naming() {
        let sensor = WeatherSensor::new("yr", SensorType::WindSpeed);
        assert_eq!(sensor.name(), "yr Wind speed");
        assert_eq!(sensor.entity_id(), "sensor.yr_wind_speed");
        assert_eq!(sensor.unit_of_measurement(), Some("m/s"));
        assert_eq!(sensor.state(), None);
    }

    #[test]
    fn test_set_state_reports_change() {
        let mut sensor = WeatherSensor::new("yr", SensorType::Temperature);
        assert!(sensor.set_state(Some(ScalarValue::Text("5".into()))));
        assert!(!sensor.set_state(Some(ScalarValue::Text("5".into()))));
        // Raw comparison: "5.0" is a different state than "5".
        assert!(sensor.set_state(Some(ScalarValue::Text("5.0".into()))));
        assert!(sensor.set_state(None));
        assert!(!sensor.set_state(None));
    }

    #[test]
    fn test_symbol_picture() {
        let mut sensor = WeatherSensor::new("yr", SensorType::Symbol);
        sensor.set_state(Some(ScalarValue::Text("3".into())));
        assert_eq!(
            sensor.entity_picture().as_deref(),
            Some("https://api.met.no/weatherapi/weathericon/1.1/?symbol=3;content_type=image/png")
        );

        let other = WeatherSensor::new("yr", SensorType::Fog);
        assert_eq!(other.entity_picture(), None);
    }

    #[test]
    fn test_snapshot() {
        let mut sensor = WeatherSensor::new("home", SensorType::WindDirection);
        sensor.set_state(Some(ScalarValue::Float(194.0)));
        let update = sensor.snapshot();

        assert_eq!(update.entity_id, "sensor.home_wind_direction");
        assert_eq!(update.state, Some(ScalarValue::Float(194.0)));
        assert_eq!(update.unit_of_measurement.as_deref(), Some("°"));
        assert!(update.attribution.contains("yr.no"));

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["sensor_type"], "windDirection");
        assert_eq!(json["state"], 194.0);
        assert!(json.get("entity_picture").is_none());
    }
}
