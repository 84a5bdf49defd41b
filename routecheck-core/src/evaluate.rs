//! Route evaluation: geocode, fetch, extract and classify each endpoint.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::{
    Config,
    classify::adverse_conditions,
    error::EvaluationError,
    extract::extract,
    geocode::{Geocoder, NominatimGeocoder},
    model::{Endpoint, LocationReport, RouteEvaluation},
    provider::{WeatherProvider, provider_from_config},
};

#[derive(Debug, Clone)]
pub struct RouteEvaluator {
    geocoder: Arc<dyn Geocoder>,
    weather: Arc<dyn WeatherProvider>,
}

impl RouteEvaluator {
    pub fn new(geocoder: Arc<dyn Geocoder>, weather: Arc<dyn WeatherProvider>) -> Self {
        Self { geocoder, weather }
    }

    /// Wire up Nominatim and AccuWeather from config.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let geocoder = NominatimGeocoder::from_config(config)?;
        let weather = provider_from_config(config)?;
        Ok(Self::new(Arc::new(geocoder), Arc::new(weather)))
    }

    /// Evaluate both ends of a route.
    ///
    /// Both names are validated before any request is made. The start is
    /// evaluated first; the first failure aborts the evaluation.
    pub async fn evaluate(
        &self,
        start: &str,
        end: &str,
    ) -> Result<RouteEvaluation, EvaluationError> {
        ensure_named(Endpoint::Start, start)?;
        ensure_named(Endpoint::End, end)?;

        let start = self.evaluate_location(Endpoint::Start, start).await?;
        let end = self.evaluate_location(Endpoint::End, end).await?;

        info!(
            start = %start.place,
            start_adverse = start.adverse,
            end = %end.place,
            end_adverse = end.adverse,
            "Route evaluated"
        );

        Ok(RouteEvaluation {
            start,
            end,
            evaluated_at: Utc::now(),
        })
    }

    /// Run the full pipeline for a single place.
    #[instrument(skip(self))]
    pub async fn evaluate_location(
        &self,
        endpoint: Endpoint,
        place: &str,
    ) -> Result<LocationReport, EvaluationError> {
        ensure_named(endpoint, place)?;
        let place = place.trim();

        let coordinates = self
            .geocoder
            .resolve(place)
            .await
            .map_err(|source| EvaluationError::Geocode {
                endpoint,
                place: place.to_string(),
                source,
            })?;

        let raw = self
            .weather
            .fetch_current(coordinates)
            .await
            .map_err(|source| EvaluationError::Weather {
                endpoint,
                place: place.to_string(),
                source,
            })?;

        let params = extract(&raw).map_err(|source| EvaluationError::Extraction {
            endpoint,
            place: place.to_string(),
            source,
        })?;

        let reasons =
            adverse_conditions(&params).map_err(|source| EvaluationError::Classification {
                endpoint,
                place: place.to_string(),
                source,
            })?;

        debug!(?params, ?reasons, "Location classified");

        Ok(LocationReport {
            endpoint,
            place: place.to_string(),
            coordinates,
            params,
            adverse: !reasons.is_empty(),
            reasons,
        })
    }
}

fn ensure_named(endpoint: Endpoint, place: &str) -> Result<(), EvaluationError> {
    if place.trim().is_empty() {
        return Err(EvaluationError::InvalidInput(endpoint));
    }
    Ok(())
}
