//! Error types for forecast fetching and parsing.

/// Result type for forecast operations
pub type WeatherResult<T> = Result<T, WeatherError>;

/// Anything that sends a refresh down the retry path.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// Transport-level failure (DNS, TLS, connection reset, ...).
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// No response within the fetch timeout.
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// The API answered with something other than 200.
    #[error("{url} returned {status}")]
    Status { url: String, status: u16 },

    /// The body was not a usable forecast document.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl WeatherError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}

impl From<quick_xml::Error> for WeatherError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for WeatherError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<chrono::ParseError> for WeatherError {
    fn from(err: chrono::ParseError) -> Self {
        Self::Parse(format!("invalid timestamp: {}", err))
    }
}
