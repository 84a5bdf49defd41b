//! Core library for the `routecheck` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Geocoding and weather provider clients, with a shared call quota
//! - Extraction of the weather parameters and the adverse-weather rule
//! - The route evaluator that ties the pipeline together for two places
//!
//! It is used by `routecheck-cli`, but can also be reused by other binaries or services.

pub mod classify;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod extract;
pub mod geocode;
mod http;
pub mod model;
pub mod provider;
pub mod rate_limit;

pub use classify::{AdverseCondition, adverse_conditions, classify};
pub use config::Config;
pub use error::{
    ErrorKind, EvaluationError, ExtractionError, GeocodeError, RateLimitExceeded,
    ValidationError, WeatherError,
};
pub use evaluate::RouteEvaluator;
pub use extract::extract;
pub use geocode::{Geocoder, NominatimGeocoder};
pub use model::{
    Coordinates, Endpoint, LocationHandle, LocationReport, RawConditions, RouteEvaluation,
    Verdict, WeatherParams,
};
pub use provider::{WeatherProvider, accuweather::AccuWeatherProvider};
pub use rate_limit::RateLimiter;
