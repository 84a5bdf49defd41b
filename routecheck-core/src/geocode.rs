//! Forward geocoding: place name to coordinates.
//! Uses Nominatim (OpenStreetMap) search, which needs no API key but does
//! require an identifying User-Agent.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use tracing::{debug, warn};

use crate::{
    config::Config,
    error::GeocodeError,
    http::{build_client, describe_transport_error, truncate_body},
    model::Coordinates,
};

#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Resolve `place_name` to the coordinates of its first search match.
    async fn resolve(&self, place_name: &str) -> Result<Coordinates, GeocodeError>;
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    base_url: String,
    http: Client,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let http = build_client(config.timeout(), Some(&config.geocoder.user_agent))?;
        Ok(Self::new(config.geocoder.base_url.clone(), http))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, place_name: &str) -> Result<Coordinates, GeocodeError> {
        let query = place_name.trim();
        if query.is_empty() {
            return Err(GeocodeError::InvalidInput);
        }

        let url = format!("{}/search", self.base_url);
        debug!(place = query, "Geocoding place name");

        let res = self
            .http
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| {
                let reason = describe_transport_error(e);
                warn!(place = query, %reason, "Geocoding request failed");
                GeocodeError::UpstreamUnavailable(reason)
            })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| GeocodeError::UpstreamUnavailable(describe_transport_error(e)))?;

        if !status.is_success() {
            warn!(
                %status,
                body = %truncate_body(&body),
                "Geocoding service returned an error"
            );
            return Err(GeocodeError::UpstreamUnavailable(format!("HTTP {status}")));
        }

        let places: Vec<NominatimPlace> = serde_json::from_str(&body)
            .map_err(|e| GeocodeError::InvalidProviderResponse(e.to_string()))?;

        // First match only; ambiguous names are not disambiguated.
        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NotFound(query.to_string()))?;

        let coords = Coordinates {
            latitude: parse_degrees("lat", &place.lat)?,
            longitude: parse_degrees("lon", &place.lon)?,
        };

        debug!(
            place = query,
            lat = coords.latitude,
            lon = coords.longitude,
            "Geocoded"
        );
        Ok(coords)
    }
}

fn parse_degrees(field: &str, value: &str) -> Result<f64, GeocodeError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            GeocodeError::InvalidProviderResponse(format!("'{field}' is not a number: {value}"))
        })
}
