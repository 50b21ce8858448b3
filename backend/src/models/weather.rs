//! Forecast data model.
//!
//! A [`ForecastDocument`] is the parsed form of one locationforecast response.
//! It is immutable once built and is replaced wholesale on each successful
//! fetch. Sensor types form a closed table: each [`SensorType`] knows its
//! display name, unit, and how its state is extracted from a [`Variable`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A sensor state as extracted from the forecast.
///
/// Everything except wind direction keeps the attribute text exactly as the
/// document provided it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Text(String),
    Float(f64),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Text(text) => f.write_str(text),
            ScalarValue::Float(value) => write!(f, "{}", value),
        }
    }
}

/// How a sensor's state is read out of a variable's attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// Take the attribute text unchanged.
    Raw(&'static str),
    /// Parse the attribute as a float.
    Float(&'static str),
}

impl Extraction {
    pub fn attribute(&self) -> &'static str {
        match self {
            Extraction::Raw(attr) | Extraction::Float(attr) => *attr,
        }
    }
}

macro_rules! sensor_types {
    ($( $variant:ident => $key:literal, $name:literal, $unit:expr, $extraction:expr; )+) => {
        /// Weather quantities a sensor can subscribe to.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum SensorType {
            $( $variant, )+
        }

        impl SensorType {
            pub const ALL: &'static [SensorType] = &[ $( SensorType::$variant, )+ ];

            /// Element name of this variable in the forecast document.
            pub fn key(&self) -> &'static str {
                match self {
                    $( SensorType::$variant => $key, )+
                }
            }

            pub fn display_name(&self) -> &'static str {
                match self {
                    $( SensorType::$variant => $name, )+
                }
            }

            pub fn unit(&self) -> Option<&'static str> {
                match self {
                    $( SensorType::$variant => $unit, )+
                }
            }

            pub fn extraction(&self) -> Extraction {
                match self {
                    $( SensorType::$variant => $extraction, )+
                }
            }
        }

        impl FromStr for SensorType {
            type Err = UnknownSensorType;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $key => Ok(SensorType::$variant), )+
                    other => Err(UnknownSensorType(other.to_string())),
                }
            }
        }
    };
}

sensor_types! {
    Symbol => "symbol", "Symbol", None, Extraction::Raw("number");
    Precipitation => "precipitation", "Precipitation", Some("mm"), Extraction::Raw("value");
    Temperature => "temperature", "Temperature", Some("°C"), Extraction::Raw("value");
    WindSpeed => "windSpeed", "Wind speed", Some("m/s"), Extraction::Raw("mps");
    WindGust => "windGust", "Wind gust", Some("m/s"), Extraction::Raw("mps");
    Pressure => "pressure", "Pressure", Some("hPa"), Extraction::Raw("value");
    WindDirection => "windDirection", "Wind direction", Some("°"), Extraction::Float("deg");
    Humidity => "humidity", "Humidity", Some("%"), Extraction::Raw("value");
    Fog => "fog", "Fog", Some("%"), Extraction::Raw("percent");
    Cloudiness => "cloudiness", "Cloudiness", Some("%"), Extraction::Raw("percent");
    LowClouds => "lowClouds", "Low clouds", Some("%"), Extraction::Raw("percent");
    MediumClouds => "mediumClouds", "Medium clouds", Some("%"), Extraction::Raw("percent");
    HighClouds => "highClouds", "High clouds", Some("%"), Extraction::Raw("percent");
    DewpointTemperature => "dewpointTemperature", "Dewpoint temperature", Some("°C"), Extraction::Raw("value");
}

impl SensorType {
    /// Read this sensor's state out of a variable.
    ///
    /// Returns `None` when the attribute is missing or, for float
    /// extraction, not a number.
    pub fn extract(&self, variable: &Variable) -> Option<ScalarValue> {
        let extraction = self.extraction();
        let text = variable.attribute(extraction.attribute())?;
        match extraction {
            Extraction::Raw(_) => Some(ScalarValue::Text(text.to_string())),
            Extraction::Float(_) => text.trim().parse::<f64>().ok().map(ScalarValue::Float),
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for SensorType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for SensorType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Returned when a configured sensor type is not in the table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sensor type '{0}'")]
pub struct UnknownSensorType(pub String);

/// One weather variable inside a time entry, e.g. `<temperature value="5.1"/>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variable {
    attributes: BTreeMap<String, String>,
}

impl Variable {
    pub fn new(attributes: BTreeMap<String, String>) -> Self {
        Self { attributes }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// A forecast window `[valid_from, valid_to)` with its variables.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeEntry {
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    variables: BTreeMap<String, Variable>,
}

impl TimeEntry {
    pub fn new(
        valid_from: DateTime<Utc>,
        valid_to: DateTime<Utc>,
        variables: BTreeMap<String, Variable>,
    ) -> Self {
        Self {
            valid_from,
            valid_to,
            variables,
        }
    }

    pub fn variable(&self, key: &str) -> Option<&Variable> {
        self.variables.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }
}

/// A parsed forecast response.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDocument {
    /// When the producing model runs next; refetching earlier is pointless.
    pub next_run: DateTime<Utc>,
    pub entries: Vec<TimeEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(pairs: &[(&str, &str)]) -> Variable {
        Variable::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_sensor_type_round_trips_through_key() {
        for sensor_type in SensorType::ALL {
            assert_eq!(sensor_type.key().parse::<SensorType>().unwrap(), *sensor_type);
        }
    }

    #[test]
    fn test_unknown_sensor_type_rejected() {
        let err = "sunshine".parse::<SensorType>().unwrap_err();
        assert_eq!(err, UnknownSensorType("sunshine".to_string()));
        assert!(err.to_string().contains("sunshine"));
    }

    #[test]
    fn test_table_units() {
        assert_eq!(SensorType::Symbol.unit(), None);
        assert_eq!(SensorType::Pressure.unit(), Some("hPa"));
        assert_eq!(SensorType::WindGust.unit(), Some("m/s"));
        assert_eq!(SensorType::DewpointTemperature.display_name(), "Dewpoint temperature");
    }

    #[test]
    fn test_extract_keeps_source_text() {
        let temp = variable(&[("id", "TTT"), ("unit", "celsius"), ("value", "5.10")]);
        assert_eq!(
            SensorType::Temperature.extract(&temp),
            Some(ScalarValue::Text("5.10".to_string()))
        );

        let wind = variable(&[("mps", "3.0"), ("beaufort", "2")]);
        assert_eq!(
            SensorType::WindSpeed.extract(&wind),
            Some(ScalarValue::Text("3.0".to_string()))
        );

        let symbol = variable(&[("id", "PartlyCloud"), ("number", "3")]);
        assert_eq!(
            SensorType::Symbol.extract(&symbol),
            Some(ScalarValue::Text("3".to_string()))
        );
    }

    #[test]
    fn test_wind_direction_is_float() {
        let dir = variable(&[("deg", "194"), ("name", "S")]);
        assert_eq!(
            SensorType::WindDirection.extract(&dir),
            Some(ScalarValue::Float(194.0))
        );

        let bad = variable(&[("deg", "south")]);
        assert_eq!(SensorType::WindDirection.extract(&bad), None);
    }

    #[test]
    fn test_extract_missing_attribute() {
        let fog = variable(&[("id", "FOG")]);
        assert_eq!(SensorType::Fog.extract(&fog), None);
    }

    #[test]
    fn test_scalar_value_serializes_untagged() {
        assert_eq!(
            serde_json::to_value(ScalarValue::Text("7".into())).unwrap(),
            serde_json::json!("7")
        );
        assert_eq!(
            serde_json::to_value(ScalarValue::Float(12.5)).unwrap(),
            serde_json::json!(12.5)
        );
    }

    #[test]
    fn test_sensor_type_serde() {
        let parsed: Vec<SensorType> =
            serde_json::from_str(r#"["windSpeed", "lowClouds"]"#).unwrap();
        assert_eq!(parsed, vec![SensorType::WindSpeed, SensorType::LowClouds]);
        assert!(serde_json::from_str::<SensorType>(r#""nope""#).is_err());
    }
}
