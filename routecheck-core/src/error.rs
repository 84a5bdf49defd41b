//! Error types for every stage of the evaluation pipeline.
//!
//! Each stage returns its own error enum. The orchestrator wraps whichever
//! stage failed in [`EvaluationError`], tagged with the route endpoint and
//! place name, and [`EvaluationError::kind`] flattens that into [`ErrorKind`].

use std::time::Duration;

use thiserror::Error;

use crate::model::Endpoint;

/// Geocoder failures.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Place name was empty or whitespace.
    #[error("place name must not be empty")]
    InvalidInput,

    #[error("place '{0}' was not found")]
    NotFound(String),

    /// Transport failure, timeout or non-success status.
    #[error("geocoding service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("unexpected geocoding response: {0}")]
    InvalidProviderResponse(String),
}

/// Local call quota has been used up for the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("rate limit exceeded: at most {max_calls} weather requests per {}s", .window.as_secs())]
pub struct RateLimitExceeded {
    pub max_calls: usize,
    pub window: Duration,
}

/// Weather provider failures.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error(transparent)]
    RateLimitExceeded(#[from] RateLimitExceeded),

    /// Transport failure, timeout or non-success status.
    #[error("weather service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("unexpected weather provider response: {0}")]
    InvalidProviderResponse(String),

    #[error("weather provider returned no current conditions")]
    NoData,
}

/// Failures projecting a raw conditions payload into [`crate::WeatherParams`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("weather data is missing field '{0}'")]
    MissingField(&'static str),

    #[error("weather field '{field}' is not numeric: {value}")]
    NotNumeric {
        field: &'static str,
        value: String,
    },
}

/// Failures validating parameters before classification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("weather parameter '{field}' is not a finite number: {value}")]
    InvalidParameters {
        field: &'static str,
        value: f64,
    },
}

/// Flat error taxonomy shared with the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    UpstreamUnavailable,
    InvalidProviderResponse,
    MissingField,
    NoData,
    RateLimitExceeded,
    InvalidParameters,
}

/// Error returned by the evaluation orchestrator.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("{0} must not be empty")]
    InvalidInput(Endpoint),

    #[error("could not locate {endpoint} '{place}'")]
    Geocode {
        endpoint: Endpoint,
        place: String,
        #[source]
        source: GeocodeError,
    },

    #[error("could not fetch weather for {endpoint} '{place}'")]
    Weather {
        endpoint: Endpoint,
        place: String,
        #[source]
        source: WeatherError,
    },

    #[error("could not read weather data for {endpoint} '{place}'")]
    Extraction {
        endpoint: Endpoint,
        place: String,
        #[source]
        source: ExtractionError,
    },

    #[error("invalid weather parameters for {endpoint} '{place}'")]
    Classification {
        endpoint: Endpoint,
        place: String,
        #[source]
        source: ValidationError,
    },
}

impl EvaluationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvaluationError::InvalidInput(_) => ErrorKind::InvalidInput,
            EvaluationError::Geocode { source, .. } => match source {
                GeocodeError::InvalidInput => ErrorKind::InvalidInput,
                GeocodeError::NotFound(_) => ErrorKind::NotFound,
                GeocodeError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
                GeocodeError::InvalidProviderResponse(_) => ErrorKind::InvalidProviderResponse,
            },
            EvaluationError::Weather { source, .. } => match source {
                WeatherError::RateLimitExceeded(_) => ErrorKind::RateLimitExceeded,
                WeatherError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
                WeatherError::InvalidProviderResponse(_) => ErrorKind::InvalidProviderResponse,
                WeatherError::NoData => ErrorKind::NoData,
            },
            EvaluationError::Extraction { source, .. } => match source {
                ExtractionError::MissingField(_) => ErrorKind::MissingField,
                ExtractionError::NotNumeric { .. } => ErrorKind::InvalidParameters,
            },
            EvaluationError::Classification { .. } => ErrorKind::InvalidParameters,
        }
    }

    /// Which route endpoint failed.
    pub fn endpoint(&self) -> Endpoint {
        match self {
            EvaluationError::InvalidInput(endpoint)
            | EvaluationError::Geocode { endpoint, .. }
            | EvaluationError::Weather { endpoint, .. }
            | EvaluationError::Extraction { endpoint, .. }
            | EvaluationError::Classification { endpoint, .. } => *endpoint,
        }
    }

    /// Everything except bad input may succeed if retried later.
    pub fn is_retryable(&self) -> bool {
        self.kind() != ErrorKind::InvalidInput
    }

    /// Message suitable for an end user.
    ///
    /// Input errors are shown verbatim since the user can act on them. For
    /// everything else the details belong in the logs, so only a generic
    /// message per kind is returned.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::InvalidInput => match self {
                EvaluationError::Geocode { endpoint, .. } => {
                    format!("{endpoint} must not be empty")
                }
                other => other.to_string(),
            },
            ErrorKind::NotFound => match self {
                EvaluationError::Geocode { endpoint, place, .. } => {
                    format!(
                        "Could not find the {endpoint} '{place}'. Check the spelling."
                    )
                }
                _ => "Location not found.".to_string(),
            },
            ErrorKind::RateLimitExceeded => {
                "Too many weather requests. Please try again later.".to_string()
            }
            ErrorKind::UpstreamUnavailable => {
                "The weather service is currently unavailable. Please try again later."
                    .to_string()
            }
            ErrorKind::InvalidProviderResponse
            | ErrorKind::MissingField
            | ErrorKind::NoData
            | ErrorKind::InvalidParameters => {
                "Weather data for this location is currently unavailable. Please try again later."
                    .to_string()
            }
        }
    }
}
