use std::error::Error as StdError;

use thiserror::Error;

/// Failure to turn a user query into a request URL.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("Location query is empty")]
    EmptyQuery,

    #[error("Could not encode request URL: {0}")]
    EncodingFailed(String),

    #[error("Invalid coordinates ({lat}, {lon}): latitude must be -90..=90, longitude -180..=180")]
    InvalidCoordinates { lat: f64, lon: f64 },
}

/// Failure to decode a provider response body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Response is not valid JSON: {0}")]
    MalformedJson(String),

    /// Dotted path of the required field that is absent or has the wrong type.
    #[error("Response is missing required field `{0}`")]
    MissingField(&'static str),
}

/// The transport could not complete the request (DNS, TLS, connection reset, timeout...).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), source: None }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self { message: message.into(), source: Some(source.into()) }
    }
}

/// Everything that can go wrong during a single weather lookup.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Network request failed: {0}")]
    NetworkFailure(#[source] TransportError),

    /// Non-2xx status, or a 2xx status with nothing in the body.
    #[error("{}", empty_response_message(.status, .message))]
    EmptyResponse { status: u16, message: Option<String> },

    #[error("Could not decode weather data: {0}")]
    DecodingFailed(#[from] DecodeError),

    #[error("Weather request was cancelled")]
    Cancelled,
}

fn empty_response_message(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(msg) => format!("Weather service returned status {status}: {msg}"),
        None => format!("Weather service returned no data (status {status})"),
    }
}
