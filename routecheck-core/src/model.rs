use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::AdverseCondition;

/// Which leg of the route a location belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Start,
    End,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Start => "start point",
            Endpoint::End => "end point",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved geographic position. Only produced by a successful geocode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Provider-issued identifier for a location in the weather provider's database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationHandle(pub String);

impl LocationHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Current-conditions object exactly as the weather provider returned it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawConditions(pub serde_json::Value);

impl RawConditions {
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// The four fields the adverse-weather rule looks at, in metric units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherParams {
    /// °C
    pub temperature: f64,
    /// km/h
    pub wind_speed: f64,
    /// 0..=100
    pub precipitation_probability: f64,
    /// 0..=100
    pub humidity: f64,
}

/// `true` means the location currently has adverse weather.
pub type Verdict = bool;

/// Outcome of the pipeline for one named location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationReport {
    pub endpoint: Endpoint,
    pub place: String,
    pub coordinates: Coordinates,
    pub params: WeatherParams,
    pub adverse: Verdict,
    pub reasons: Vec<AdverseCondition>,
}

/// Outcome of evaluating both ends of a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEvaluation {
    pub start: LocationReport,
    pub end: LocationReport,
    pub evaluated_at: DateTime<Utc>,
}

impl RouteEvaluation {
    pub fn start_verdict(&self) -> Verdict {
        self.start.adverse
    }

    pub fn end_verdict(&self) -> Verdict {
        self.end.adverse
    }

    pub fn start_params(&self) -> &WeatherParams {
        &self.start.params
    }

    pub fn end_params(&self) -> &WeatherParams {
        &self.end.params
    }

    /// True if either end of the route has adverse weather.
    pub fn any_adverse(&self) -> bool {
        self.start.adverse || self.end.adverse
    }
}
