//! # Hearth
//!
//! Home automation backend: yr.no forecast sensors and the Z-Wave
//! configuration panel API.
//!
//! ## Features
//!
//! - **Forecast**: Fetch the yr.no location forecast, pick the reading closest
//!   to a target instant for each monitored condition, and publish changes
//! - **Refresh Scheduling**: Hourly refresh at a random minute, with one-shot
//!   retries after failures
//! - **Z-Wave Device Options**: Per-entity `ignored` / `polling_intensity`
//!   settings persisted to JSON
//! - **Z-Wave Views**: Values, association groups, configuration parameters
//!   and user codes of network nodes
//! - **HTTP API**: RESTful endpoints for the config panel
//!
//! ## Architecture
//!
//! - [`models`]: Forecast document and sensor type definitions
//! - [`weather`]: Fetching, parsing, selection and the refresh loop
//! - [`zwave`]: Device config storage and network views
//! - [`config`]: TOML configuration
//! - [`http`]: Axum-based HTTP server and request handlers

pub mod config;
pub mod models;
pub mod weather;
pub mod zwave;

#[cfg(feature = "http-server")]
pub mod http;
