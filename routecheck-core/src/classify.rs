//! Adverse-weather rule.
//!
//! A location is adverse when any one of these holds (all bounds strict):
//! - temperature below 0 °C or above 35 °C
//! - wind speed above 50 km/h
//! - precipitation probability above 70 %
//! - relative humidity above 80 %

use serde::{Deserialize, Serialize};

use crate::{
    error::ValidationError,
    model::{Verdict, WeatherParams},
};

pub const MIN_TEMPERATURE_C: f64 = 0.0;
pub const MAX_TEMPERATURE_C: f64 = 35.0;
pub const MAX_WIND_SPEED_KMH: f64 = 50.0;
pub const MAX_PRECIPITATION_PROBABILITY: f64 = 70.0;
pub const MAX_HUMIDITY: f64 = 80.0;

/// A single rule that made a location adverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdverseCondition {
    Freezing,
    Heat,
    StrongWind,
    LikelyPrecipitation,
    HighHumidity,
}

impl AdverseCondition {
    pub fn description(&self) -> &'static str {
        match self {
            AdverseCondition::Freezing => "temperature below 0 °C",
            AdverseCondition::Heat => "temperature above 35 °C",
            AdverseCondition::StrongWind => "wind above 50 km/h",
            AdverseCondition::LikelyPrecipitation => "precipitation probability above 70%",
            AdverseCondition::HighHumidity => "humidity above 80%",
        }
    }
}

impl std::fmt::Display for AdverseCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// `true` if the parameters describe adverse weather.
pub fn classify(params: &WeatherParams) -> Result<Verdict, ValidationError> {
    Ok(!adverse_conditions(params)?.is_empty())
}

/// Every rule that fires for `params`, in a fixed order.
pub fn adverse_conditions(
    params: &WeatherParams,
) -> Result<Vec<AdverseCondition>, ValidationError> {
    validate(params)?;

    let mut reasons = Vec::new();
    if params.temperature < MIN_TEMPERATURE_C {
        reasons.push(AdverseCondition::Freezing);
    }
    if params.temperature > MAX_TEMPERATURE_C {
        reasons.push(AdverseCondition::Heat);
    }
    if params.wind_speed > MAX_WIND_SPEED_KMH {
        reasons.push(AdverseCondition::StrongWind);
    }
    if params.precipitation_probability > MAX_PRECIPITATION_PROBABILITY {
        reasons.push(AdverseCondition::LikelyPrecipitation);
    }
    if params.humidity > MAX_HUMIDITY {
        reasons.push(AdverseCondition::HighHumidity);
    }

    Ok(reasons)
}

fn validate(params: &WeatherParams) -> Result<(), ValidationError> {
    let fields = [
        ("temperature", params.temperature),
        ("wind_speed", params.wind_speed),
        (
            "precipitation_probability",
            params.precipitation_probability,
        ),
        ("humidity", params.humidity),
    ];

    match fields.into_iter().find(|(_, value)| !value.is_finite()) {
        Some((field, value)) => {
            Err(ValidationError::InvalidParameters { field, value })
        }
        None => Ok(()),
    }
}
