//! HTTP server module.
//!
//! An axum router over the Z-Wave config panel endpoints and the current
//! weather sensor states.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Path parsing, status codes, {"message": ...} errors    │
//! │  - CORS, compression, request tracing                     │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  zwave                          weather                   │
//! │  - DeviceConfigEditor           - SensorStateRegistry     │
//! │  - ZWaveNetwork views             (fed by ForecastLoop)   │
//! └──────────────────────────────────────────────────────────┘
//! ```

#[cfg(feature = "http-server")]
pub mod handlers;

#[cfg(feature = "http-server")]
pub mod router;

#[cfg(feature = "http-server")]
pub mod state;

#[cfg(feature = "http-server")]
pub mod error;

#[cfg(feature = "http-server")]
pub mod dto;

#[cfg(feature = "http-server")]
pub use router::create_router;

#[cfg(feature = "http-server")]
pub use state::AppState;
