//! Integration tests for the geocoder, the AccuWeather client and the route
//! evaluator against a mock HTTP server.

use std::{sync::Arc, time::Duration};

use routecheck_core::{
    AccuWeatherProvider, Config, Coordinates, Endpoint, ErrorKind, EvaluationError, GeocodeError,
    Geocoder, NominatimGeocoder, RateLimiter, RouteEvaluator, WeatherError, WeatherProvider,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
};

const LOCATION_KEY: &str = "623";

fn paris_search() -> serde_json::Value {
    serde_json::json!([{
        "place_id": 88066702,
        "lat": "48.85",
        "lon": "2.35",
        "display_name": "Paris, Île-de-France, France métropolitaine, France",
        "class": "boundary",
        "type": "administrative"
    }])
}

fn geoposition() -> serde_json::Value {
    serde_json::json!({
        "Version": 1,
        "Key": LOCATION_KEY,
        "Type": "City",
        "LocalizedName": "Paris",
        "GeoPosition": { "Latitude": 48.857, "Longitude": 2.353 }
    })
}

fn current_conditions(
    temperature: f64,
    wind: f64,
    precipitation: f64,
    humidity: f64,
) -> serde_json::Value {
    serde_json::json!([{
        "LocalObservationDateTime": "2024-07-01T14:05:00+02:00",
        "WeatherText": "Sunny",
        "HasPrecipitation": false,
        "Temperature": {
            "Metric": { "Value": temperature, "Unit": "C", "UnitType": 17 },
            "Imperial": { "Value": 104.0, "Unit": "F", "UnitType": 18 }
        },
        "RelativeHumidity": humidity,
        "PrecipitationProbability": precipitation,
        "Wind": {
            "Direction": { "Degrees": 180, "Localized": "S" },
            "Speed": { "Metric": { "Value": wind, "Unit": "km/h", "UnitType": 7 } }
        }
    }])
}

fn test_config(mock_server: &MockServer) -> Config {
    let mut config = Config::default();
    config.accuweather.base_url = mock_server.uri();
    config.accuweather.language = "en-us".to_string();
    config.geocoder.base_url = mock_server.uri();
    config.geocoder.user_agent = "routecheck-tests/1.0".to_string();
    config.set_api_key("TEST_KEY".to_string());
    config
}

fn short_timeout_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .expect("Failed to create client")
}

fn weather_client(mock_server: &MockServer, limiter: Arc<RateLimiter>) -> AccuWeatherProvider {
    weather_client_at(mock_server.uri(), limiter)
}

fn weather_client_at(base_url: String, limiter: Arc<RateLimiter>) -> AccuWeatherProvider {
    AccuWeatherProvider::with_client(
        "TEST_KEY".to_string(),
        base_url,
        "en-us".to_string(),
        limiter,
        short_timeout_client(),
    )
}

async fn mount_geoposition(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/locations/v1/cities/geoposition/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geoposition()))
        .mount(mock_server)
        .await;
}

async fn mount_geocoder(mock_server: &MockServer, place: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", place))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(mock_server)
        .await;
}

async fn mount_weather(mock_server: &MockServer, conditions: serde_json::Value) {
    mount_geoposition(mock_server).await;

    Mock::given(method("GET"))
        .and(path(format!("/currentconditions/v1/{LOCATION_KEY}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(conditions))
        .mount(mock_server)
        .await;
}

const PARIS: Coordinates = Coordinates {
    latitude: 48.85,
    longitude: 2.35,
};

// ============================================================================
// Geocoder
// ============================================================================

#[tokio::test]
async fn geocoder_sends_search_query_and_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Paris"))
        .and(query_param("format", "json"))
        .and(query_param("limit", "1"))
        .and(header("user-agent", "routecheck-tests/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paris_search()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let geocoder = NominatimGeocoder::from_config(&test_config(&mock_server)).unwrap();
    let coords = geocoder.resolve("  Paris ").await.unwrap();

    assert_eq!(coords, PARIS);
}

#[tokio::test]
async fn geocoder_empty_result_is_not_found() {
    let mock_server = MockServer::start().await;
    mount_geocoder(&mock_server, "Nowhereville", serde_json::json!([])).await;

    let geocoder = NominatimGeocoder::from_config(&test_config(&mock_server)).unwrap();
    let result = geocoder.resolve("Nowhereville").await;

    assert!(
        matches!(result, Err(GeocodeError::NotFound(ref p)) if p == "Nowhereville"),
        "Expected NotFound, got: {result:?}"
    );
}

#[tokio::test]
async fn geocoder_server_error_is_upstream_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_string("Service Unavailable"),
        )
        .mount(&mock_server)
        .await;

    let geocoder = NominatimGeocoder::from_config(&test_config(&mock_server)).unwrap();
    let result = geocoder.resolve("Paris").await;

    assert!(
        matches!(result, Err(GeocodeError::UpstreamUnavailable(_))),
        "Expected UpstreamUnavailable, got: {result:?}"
    );
}

#[tokio::test]
async fn geocoder_timeout_is_upstream_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(paris_search())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let geocoder = NominatimGeocoder::new(mock_server.uri(), short_timeout_client());
    let result = geocoder.resolve("Paris").await;

    assert!(
        matches!(result, Err(GeocodeError::UpstreamUnavailable(_))),
        "Expected UpstreamUnavailable, got: {result:?}"
    );
}

#[tokio::test]
async fn geocoder_bad_coordinates_are_invalid_response() {
    let mock_server = MockServer::start().await;
    mount_geocoder(
        &mock_server,
        "Paris",
        serde_json::json!([{ "lat": "somewhere", "lon": "2.35" }]),
    )
    .await;

    let geocoder = NominatimGeocoder::from_config(&test_config(&mock_server)).unwrap();
    let result = geocoder.resolve("Paris").await;

    assert!(
        matches!(result, Err(GeocodeError::InvalidProviderResponse(_))),
        "Expected InvalidProviderResponse, got: {result:?}"
    );
}

// ============================================================================
// AccuWeather client
// ============================================================================

#[tokio::test]
async fn weather_client_resolves_key_then_fetches_conditions() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/locations/v1/cities/geoposition/search"))
        .and(query_param("apikey", "TEST_KEY"))
        .and(query_param("q", "48.85,2.35"))
        .and(query_param("language", "en-us"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geoposition()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/currentconditions/v1/{LOCATION_KEY}")))
        .and(query_param("apikey", "TEST_KEY"))
        .and(query_param("language", "en-us"))
        .and(query_param("details", "true"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_conditions(21.0, 9.0, 3.0, 55.0)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = weather_client(&mock_server, Arc::new(RateLimiter::default()));
    let raw = client.fetch_current(PARIS).await.unwrap();

    assert_eq!(raw.as_value()["WeatherText"], "Sunny");
    assert_eq!(client.limiter().remaining(), 49);
}

#[tokio::test]
async fn weather_client_missing_key_is_invalid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/locations/v1/cities/geoposition/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "Code": "x" })),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/currentconditions/v1/{LOCATION_KEY}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_conditions(1.0, 1.0, 1.0, 1.0)),
        )
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = weather_client(&mock_server, Arc::new(RateLimiter::default()));
    let result = client.fetch_current(PARIS).await;

    assert!(
        matches!(result, Err(WeatherError::InvalidProviderResponse(_))),
        "Expected InvalidProviderResponse, got: {result:?}"
    );
}

#[tokio::test]
async fn weather_client_empty_conditions_is_no_data() {
    let mock_server = MockServer::start().await;
    mount_weather(&mock_server, serde_json::json!([])).await;

    let client = weather_client(&mock_server, Arc::new(RateLimiter::default()));
    let result = client.fetch_current(PARIS).await;

    assert!(
        matches!(result, Err(WeatherError::NoData)),
        "Expected NoData, got: {result:?}"
    );
}

#[tokio::test]
async fn weather_client_unauthorized_is_upstream_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/locations/v1/cities/geoposition/search"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "Code": "Unauthorized",
            "Message": "Api Authorization failed"
        })))
        .mount(&mock_server)
        .await;

    let client = weather_client(&mock_server, Arc::new(RateLimiter::default()));
    let result = client.fetch_current(PARIS).await;

    match result {
        Err(WeatherError::UpstreamUnavailable(reason)) => {
            assert!(reason.contains("401"));
            assert!(!reason.contains("TEST_KEY"));
        }
        other => panic!("Expected UpstreamUnavailable, got: {other:?}"),
    }
}

#[tokio::test]
async fn weather_client_conditions_server_error_is_upstream_unavailable() {
    let mock_server = MockServer::start().await;
    mount_geoposition(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(format!("/currentconditions/v1/{LOCATION_KEY}")))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_string("Internal Server Error"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = weather_client(&mock_server, Arc::new(RateLimiter::default()));
    let result = client.fetch_current(PARIS).await;

    match result {
        Err(WeatherError::UpstreamUnavailable(reason)) => {
            assert!(reason.contains("500"));
            assert!(reason.contains("current conditions"));
        }
        other => panic!("Expected UpstreamUnavailable, got: {other:?}"),
    }
}

#[tokio::test]
async fn weather_client_timeout_is_upstream_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/locations/v1/cities/geoposition/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(geoposition())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let client = weather_client(&mock_server, Arc::new(RateLimiter::default()));
    let result = client.fetch_current(PARIS).await;

    match result {
        Err(WeatherError::UpstreamUnavailable(reason)) => {
            assert!(reason.contains("timed out"), "unexpected reason: {reason}");
            assert!(!reason.contains("TEST_KEY"));
        }
        other => panic!("Expected UpstreamUnavailable, got: {other:?}"),
    }
}

#[tokio::test]
async fn weather_client_refused_connection_is_upstream_unavailable() {
    // Nothing listens on the discard port locally.
    let client = weather_client_at(
        "http://127.0.0.1:9".to_string(),
        Arc::new(RateLimiter::default()),
    );
    let result = client.fetch_current(PARIS).await;

    match result {
        Err(WeatherError::UpstreamUnavailable(reason)) => {
            assert!(!reason.contains("TEST_KEY"));
        }
        other => panic!("Expected UpstreamUnavailable, got: {other:?}"),
    }
}

#[tokio::test]
async fn weather_client_invalid_json_is_invalid_response() {
    let mock_server = MockServer::start().await;
    mount_weather(&mock_server, serde_json::json!({ "not": "a list" })).await;

    let client = weather_client(&mock_server, Arc::new(RateLimiter::default()));
    let result = client.fetch_current(PARIS).await;

    assert!(
        matches!(result, Err(WeatherError::InvalidProviderResponse(_))),
        "Expected InvalidProviderResponse, got: {result:?}"
    );
}

#[tokio::test]
async fn weather_client_rejects_calls_over_quota_without_network() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/locations/v1/cities/geoposition/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geoposition()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/currentconditions/v1/{LOCATION_KEY}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_conditions(1.0, 1.0, 1.0, 1.0)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let limiter = Arc::new(RateLimiter::new(1, Duration::from_secs(3600)));
    let client = weather_client(&mock_server, limiter);

    assert!(client.fetch_current(PARIS).await.is_ok());

    let result = client.fetch_current(PARIS).await;
    assert!(
        matches!(result, Err(WeatherError::RateLimitExceeded(_))),
        "Expected RateLimitExceeded, got: {result:?}"
    );
}

// ============================================================================
// Route evaluation
// ============================================================================

#[tokio::test]
async fn evaluate_flags_heat_at_both_ends() {
    let mock_server = MockServer::start().await;
    mount_geocoder(&mock_server, "Paris", paris_search()).await;
    mount_weather(&mock_server, current_conditions(40.0, 10.0, 5.0, 30.0)).await;

    let evaluator = RouteEvaluator::from_config(&test_config(&mock_server)).unwrap();
    let result = evaluator.evaluate("Paris", "Paris").await.unwrap();

    assert!(result.start_verdict());
    assert!(result.end_verdict());
    assert_eq!(result.start_params().temperature, 40.0);
    assert_eq!(result.end_params().wind_speed, 10.0);
}

#[tokio::test]
async fn evaluate_mild_route_is_not_adverse() {
    let mock_server = MockServer::start().await;
    mount_geocoder(&mock_server, "Paris", paris_search()).await;
    mount_weather(&mock_server, current_conditions(22.0, 12.0, 10.0, 45.0)).await;

    let evaluator = RouteEvaluator::from_config(&test_config(&mock_server)).unwrap();
    let result = evaluator.evaluate("Paris", "Paris").await.unwrap();

    assert!(!result.any_adverse());
}

#[tokio::test]
async fn evaluate_unknown_start_skips_end_pipeline() {
    let mock_server = MockServer::start().await;
    mount_geocoder(&mock_server, "Nowhereville", serde_json::json!([])).await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paris_search()))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/locations/v1/cities/geoposition/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geoposition()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let evaluator = RouteEvaluator::from_config(&test_config(&mock_server)).unwrap();
    let err = evaluator
        .evaluate("Nowhereville", "Paris")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.endpoint(), Endpoint::Start);
    assert!(matches!(
        err,
        EvaluationError::Geocode {
            source: GeocodeError::NotFound(ref p),
            ..
        } if p == "Nowhereville"
    ));
}

#[tokio::test]
async fn evaluate_blank_name_makes_no_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let evaluator = RouteEvaluator::from_config(&test_config(&mock_server)).unwrap();
    let err = evaluator.evaluate("", "Paris").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(!err.is_retryable());
}
