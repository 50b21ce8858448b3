//! Domain types shared by the weather sensors and the HTTP layer.

pub mod weather;

pub use weather::*;
