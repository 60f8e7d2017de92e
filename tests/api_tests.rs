//! Integration tests driving the HTTP layer end to end.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use weather_dashboard::api::{self, AppState};
use weather_dashboard::config::WeatherConfig;
use weather_dashboard::{DashboardSession, OpenMeteoClient, StaticGeoProvider};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app_for(server: &MockServer) -> Router {
    let client = OpenMeteoClient::new(&WeatherConfig {
        base_url: format!("{}/v1", server.uri()),
        timeout_seconds: Some(5),
    })
    .unwrap();
    let session = Arc::new(DashboardSession::new(Arc::new(client)));
    let geo = Arc::new(StaticGeoProvider::builtin().unwrap());
    api::router(AppState::new(session, geo))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn forecast_body(max: f64) -> Value {
    json!({
        "timezone": "GMT",
        "hourly": {
            "time": ["2024-01-01T00:00", "2024-01-01T01:00"],
            "temperature_2m": [5, 6],
            "relativehumidity_2m": [70, 72]
        },
        "daily": {
            "time": ["2024-01-01"],
            "sunrise": ["2024-01-01T07:16"],
            "sunset": ["2024-01-01T15:02"],
            "apparent_temperature_max": [max],
            "apparent_temperature_min": [2],
            "winddirection_10m_dominant": [270]
        }
    })
}

#[tokio::test]
async fn test_countries_and_cities() {
    let server = MockServer::start().await;
    let app = app_for(&server);

    let (status, countries) = send(&app, "GET", "/countries", None).await;
    assert_eq!(status, StatusCode::OK);
    let countries = countries.as_array().unwrap();
    assert!(countries.iter().any(|c| c["iso_code"] == "DE"));

    let (status, cities) = send(&app, "GET", "/countries/DE/cities", None).await;
    assert_eq!(status, StatusCode::OK);
    let cities = cities.as_array().unwrap();
    assert!(!cities.is_empty());
    assert!(cities.iter().all(|c| c["country_code"] == "DE"));

    let (status, cities) = send(&app, "GET", "/countries/ZZ/cities", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cities, json!([]));
}

#[tokio::test]
async fn test_fetch_without_city_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(10.0)))
        .expect(0)
        .mount(&server)
        .await;
    let app = app_for(&server);

    let (status, view) = send(&app, "POST", "/forecast", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        view["error_message"],
        "Please select a city before fetching weather data."
    );
    assert_eq!(view["fetch_enabled"], false);
}

#[tokio::test]
async fn test_city_requires_country() {
    let server = MockServer::start().await;
    let app = app_for(&server);

    let (status, body) = send(&app, "POST", "/selection/city", Some(json!({"name": "Berlin"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_unknown_country_and_city() {
    let server = MockServer::start().await;
    let app = app_for(&server);

    let (status, _) = send(&app, "POST", "/selection/country", Some(json!({"iso_code": "ZZ"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", "/selection/country", Some(json!({"iso_code": "FR"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "POST", "/selection/city", Some(json!({"name": "Berlin"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_full_dashboard_flow() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(10.0)))
        .expect(1)
        .mount(&server)
        .await;
    let app = app_for(&server);

    let (status, _) = send(&app, "GET", "/forecast", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, view) = send(&app, "POST", "/selection/country", Some(json!({"iso_code": "de"}))).await;
    assert_eq!(view["country"], "Germany");
    assert_eq!(view["city_selection_enabled"], true);
    assert_eq!(view["fetch_enabled"], false);

    let (status, view) = send(&app, "POST", "/selection/city", Some(json!({"name": "Berlin"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["location_label"], "Germany | Berlin");
    assert!(view["coordinates_label"]
        .as_str()
        .unwrap()
        .starts_with("Latitude: "));
    assert_eq!(view["fetch_enabled"], true);

    let (status, view) = send(&app, "POST", "/forecast", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["error_message"], Value::Null);
    assert_eq!(view["metrics"]["max_temp"], 10.0);
    assert_eq!(view["metrics"]["min_temp"], 2.0);
    assert_eq!(view["metrics"]["wind_direction"], 270.0);
    assert_eq!(view["metrics"]["wind_cardinal"], "W");
    assert_eq!(view["sunrise"], "7:16 AM");
    assert_eq!(
        view["temperature_chart"]["data"],
        json!([{"Time": 0, "Temperature (C)": 5.0}, {"Time": 1, "Temperature (C)": 6.0}])
    );
    assert_eq!(view["humidity_chart"]["categories"], json!(["Humidity"]));

    let (status, document) = send(&app, "GET", "/forecast", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(document["hourly"]["time"][1], "2024-01-01T01:00");
    assert_eq!(document["hourly"]["relativehumidity_2m"], json!([70, 72]));

    // a new country resets the city but keeps the last forecast on screen
    let (_, view) = send(&app, "POST", "/selection/country", Some(json!({"iso_code": "FR"}))).await;
    assert_eq!(view["city"], Value::Null);
    assert_eq!(view["metrics"]["max_temp"], 10.0);
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_forecast() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(10.0)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let app = app_for(&server);

    send(&app, "POST", "/selection/country", Some(json!({"iso_code": "DE"}))).await;
    send(&app, "POST", "/selection/city", Some(json!({"name": "Berlin"}))).await;

    let (status, _) = send(&app, "POST", "/forecast", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, view) = send(&app, "POST", "/forecast", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(view["error_message"]
        .as_str()
        .unwrap()
        .contains("Unable to fetch weather data"));
    assert_eq!(view["metrics"]["max_temp"], 10.0);

    let (_, view) = send(&app, "GET", "/dashboard", None).await;
    assert_eq!(view["loading"], false);
    assert!(view["error_message"].is_string());
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start().await;
    let app = app_for(&server);

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_forecast_document_is_served_as_received() {
    let server = MockServer::start().await;
    let mut body = forecast_body(10.0);
    body["hourly"]["time"] = json!(["2024-01-01T00:00:00", "2024-01-01T01:00:00"]);
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .mount(&server)
        .await;
    let app = app_for(&server);

    send(&app, "POST", "/selection/country", Some(json!({"iso_code": "DE"}))).await;
    send(&app, "POST", "/selection/city", Some(json!({"name": "Berlin"}))).await;
    let (status, view) = send(&app, "POST", "/forecast", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["temperature_chart"]["data"][1]["Time"], 1);

    let (status, document) = send(&app, "GET", "/forecast", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(document, body);
}
