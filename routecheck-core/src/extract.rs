//! Projection of a raw current-conditions payload onto [`WeatherParams`].

use serde_json::Value;

use crate::{
    error::ExtractionError,
    model::{RawConditions, WeatherParams},
};

const TEMPERATURE: &str = "Temperature.Metric.Value";
const WIND_SPEED: &str = "Wind.Speed.Metric.Value";
const HUMIDITY: &str = "RelativeHumidity";
const PRECIPITATION_PROBABILITY: &str = "PrecipitationProbability";

/// Read the four classifier inputs from `raw`.
///
/// Temperature, wind speed and humidity are required. Precipitation
/// probability is often omitted for current conditions and defaults to 0.
/// Values are taken as delivered (°C, km/h, %).
pub fn extract(raw: &RawConditions) -> Result<WeatherParams, ExtractionError> {
    let doc = raw.as_value();

    let temperature = required(doc, TEMPERATURE)?;
    let wind_speed = required(doc, WIND_SPEED)?;
    let humidity = required(doc, HUMIDITY)?;
    let precipitation_probability = match lookup(doc, PRECIPITATION_PROBABILITY) {
        None | Some(Value::Null) => 0.0,
        Some(value) => number(PRECIPITATION_PROBABILITY, value)?,
    };

    Ok(WeatherParams {
        temperature,
        wind_speed,
        precipitation_probability,
        humidity,
    })
}

fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(doc, |node, segment| node.as_object()?.get(segment))
}

fn required(doc: &Value, field: &'static str) -> Result<f64, ExtractionError> {
    match lookup(doc, field) {
        None | Some(Value::Null) => Err(ExtractionError::MissingField(field)),
        // An object or list where a scalar belongs is a broken path, not a bad value.
        Some(Value::Object(_) | Value::Array(_)) => Err(ExtractionError::MissingField(field)),
        Some(value) => number(field, value),
    }
}

fn number(field: &'static str, value: &Value) -> Result<f64, ExtractionError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| ExtractionError::NotNumeric {
            field,
            value: value.to_string(),
        })
}
