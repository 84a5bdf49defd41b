use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    Config, RateLimiter,
    error::WeatherError,
    http::{build_client, describe_transport_error, truncate_body},
    model::{Coordinates, LocationHandle, RawConditions},
};

use super::WeatherProvider;

#[derive(Debug, Clone)]
pub struct AccuWeatherProvider {
    api_key: String,
    base_url: String,
    language: String,
    limiter: Arc<RateLimiter>,
    http: Client,
}

impl AccuWeatherProvider {
    pub fn new(api_key: String, config: &Config, limiter: Arc<RateLimiter>) -> Result<Self> {
        let http = build_client(config.timeout(), None)?;
        Ok(Self::with_client(
            api_key,
            config.accuweather.base_url.clone(),
            config.accuweather.language.clone(),
            limiter,
            http,
        ))
    }

    pub fn with_client(
        api_key: String,
        base_url: String,
        language: String,
        limiter: Arc<RateLimiter>,
        http: Client,
    ) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            language,
            limiter,
            http,
        }
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    async fn get_json(
        &self,
        what: &str,
        url: &str,
        extra: &[(&str, &str)],
    ) -> Result<Value, WeatherError> {
        let auth = [
            ("apikey", self.api_key.as_str()),
            ("language", self.language.as_str()),
        ];
        let res = self
            .http
            .get(url)
            .query(&auth)
            .query(extra)
            .send()
            .await
            .map_err(|e| {
                let reason = describe_transport_error(e);
                warn!(request = what, %reason, "AccuWeather request failed");
                WeatherError::UpstreamUnavailable(reason)
            })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| WeatherError::UpstreamUnavailable(describe_transport_error(e)))?;

        if !status.is_success() {
            warn!(
                request = what,
                %status,
                body = %truncate_body(&body),
                "AccuWeather returned an error status"
            );
            return Err(WeatherError::UpstreamUnavailable(format!(
                "HTTP {status} from {what}"
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            WeatherError::InvalidProviderResponse(format!("{what} body is not JSON: {e}"))
        })
    }

    async fn location_key(&self, coords: Coordinates) -> Result<LocationHandle, WeatherError> {
        let url = format!("{}/locations/v1/cities/geoposition/search", self.base_url);
        let q = format!("{},{}", coords.latitude, coords.longitude);

        debug!(q = %q, "Looking up AccuWeather location key");
        let body = self
            .get_json("geoposition search", &url, &[("q", q.as_str())])
            .await?;

        match body.get("Key").and_then(Value::as_str) {
            Some(key) if !key.is_empty() => Ok(LocationHandle(key.to_string())),
            _ => Err(WeatherError::InvalidProviderResponse(
                "geoposition search response has no location 'Key'".to_string(),
            )),
        }
    }

    async fn current_conditions(
        &self,
        handle: &LocationHandle,
    ) -> Result<RawConditions, WeatherError> {
        let url = format!("{}/currentconditions/v1/{}", self.base_url, handle.as_str());

        debug!(
            key = handle.as_str(),
            "Fetching AccuWeather current conditions"
        );
        let body = self
            .get_json("current conditions", &url, &[("details", "true")])
            .await?;

        let Value::Array(items) = body else {
            return Err(WeatherError::InvalidProviderResponse(
                "current conditions response is not a list".to_string(),
            ));
        };

        // Only the first entry describes "now".
        items
            .into_iter()
            .next()
            .map(RawConditions)
            .ok_or(WeatherError::NoData)
    }
}

#[async_trait]
impl WeatherProvider for AccuWeatherProvider {
    async fn fetch_current(&self, coords: Coordinates) -> Result<RawConditions, WeatherError> {
        self.limiter.check_and_record()?;

        let handle = self.location_key(coords).await?;
        self.current_conditions(&handle).await
    }
}
