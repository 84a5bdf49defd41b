use crate::{
    Config, RateLimiter,
    error::WeatherError,
    model::{Coordinates, RawConditions},
    provider::accuweather::AccuWeatherProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod accuweather;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch the current-conditions payload for a position.
    async fn fetch_current(&self, coords: Coordinates) -> Result<RawConditions, WeatherError>;
}

/// Construct the AccuWeather provider from config.
///
/// Every provider built this way draws from the process-wide limiter, so the
/// quota holds across evaluators. The `[rate_limit]` section of the first
/// config seen sizes it.
pub fn provider_from_config(config: &Config) -> anyhow::Result<AccuWeatherProvider> {
    let limiter =
        RateLimiter::process_wide(config.rate_limit.max_calls, config.rate_limit.window());
    provider_with_limiter(config, limiter)
}

/// Construct the AccuWeather provider sharing an existing limiter.
pub fn provider_with_limiter(
    config: &Config,
    limiter: Arc<RateLimiter>,
) -> anyhow::Result<AccuWeatherProvider> {
    let api_key = config.api_key()?;
    AccuWeatherProvider::new(api_key, config, limiter)
}
