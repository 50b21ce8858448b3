//! yr.no forecast sensors.
//!
//! ```text
//!  YrClient ──fetch──▶ parser ──▶ ForecastDocument (active, swapped whole)
//!                                        │
//!                               ForecastSelector (rank + extract)
//!                                        │
//!                     WeatherSensor states ──changed──▶ EntityUpdateSink
//! ```
//!
//! [`ForecastLoop`] drives [`ForecastRefresher::update`] hourly at a random
//! minute, plus one-shot retries after failures.

pub mod client;
pub mod error;
pub mod parser;
pub mod refresher;
pub mod schedule;
pub mod selector;
pub mod sensor;
pub mod sink;

pub use client::{Coordinates, ForecastSource, YrClient, DEFAULT_API_URL};
pub use error::{WeatherError, WeatherResult};
pub use parser::parse_forecast;
pub use refresher::{ForecastRefresher, RefreshOutcome};
pub use schedule::{ForecastLoop, HourlySchedule};
pub use selector::ForecastSelector;
pub use sensor::{SensorUpdate, WeatherSensor};
pub use sink::{EntityUpdateSink, SensorStateRegistry};
