//! HTTP interaction layer
//!
//! JSON routes standing in for the dashboard page: country and city pickers,
//! the fetch button, and the rendered view.

use crate::dashboard::{CityRejection, DashboardSession};
use crate::locations::{self, GeoProvider};
use crate::models::{City, Country, ForecastDocument};
use crate::presentation::DashboardView;
use crate::{DashboardError, VERSION};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// Shared state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<DashboardSession>,
    pub geo: Arc<dyn GeoProvider>,
}

impl AppState {
    pub fn new(session: Arc<DashboardSession>, geo: Arc<dyn GeoProvider>) -> Self {
        Self { session, geo }
    }
}

/// API error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Errors returned by handlers that do not render the view
#[derive(Debug)]
pub enum ApiError {
    /// The request is valid but not allowed in the current state
    Conflict(String),
    Dashboard(DashboardError),
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        ApiError::Dashboard(err)
    }
}

/// Status code for a dashboard error
#[must_use]
pub fn status_for(err: &DashboardError) -> StatusCode {
    match err {
        DashboardError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DashboardError::NotFound { .. } => StatusCode::NOT_FOUND,
        DashboardError::Network { .. } | DashboardError::Parse { .. } => StatusCode::BAD_GATEWAY,
        DashboardError::Config { .. } | DashboardError::Io { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "CONFLICT", message),
            ApiError::Dashboard(err) => {
                let code = match err {
                    DashboardError::Validation { .. } => "VALIDATION",
                    DashboardError::NotFound { .. } => "NOT_FOUND",
                    DashboardError::Network { .. } => "NETWORK",
                    DashboardError::Parse { .. } => "PARSE",
                    DashboardError::Config { .. } | DashboardError::Io { .. } => "INTERNAL",
                };
                (status_for(&err), code, err.user_message())
            }
        };

        (
            status,
            Json(ErrorBody {
                code: code.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectCountryRequest {
    pub iso_code: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectCityRequest {
    pub name: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/countries", get(list_countries))
        .route("/countries/{iso_code}/cities", get(list_cities))
        .route("/dashboard", get(get_dashboard))
        .route("/selection/country", post(select_country))
        .route("/selection/city", post(select_city))
        .route("/forecast", get(get_forecast).post(fetch_forecast))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "version": VERSION }))
}

async fn list_countries(State(state): State<AppState>) -> Json<Vec<Country>> {
    Json(state.geo.countries().to_vec())
}

async fn list_cities(
    State(state): State<AppState>,
    Path(iso_code): Path<String>,
) -> Json<Vec<City>> {
    Json(state.geo.cities_of(&iso_code).to_vec())
}

async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardView> {
    let snapshot = state.session.snapshot().await;
    Json(DashboardView::from(&snapshot))
}

#[instrument(skip(state))]
async fn select_country(
    State(state): State<AppState>,
    Json(request): Json<SelectCountryRequest>,
) -> Result<Json<DashboardView>, ApiError> {
    let country = locations::find_country(state.geo.as_ref(), &request.iso_code).ok_or_else(
        || DashboardError::not_found(format!("Unknown country code '{}'", request.iso_code)),
    )?;

    info!("Selected country {}", country.name);
    let next = state.session.select_country(country).await;
    Ok(Json(DashboardView::from(&next)))
}

#[instrument(skip(state))]
async fn select_city(
    State(state): State<AppState>,
    Json(request): Json<SelectCityRequest>,
) -> Result<Json<DashboardView>, ApiError> {
    let next = state
        .session
        .select_city(state.geo.as_ref(), &request.name)
        .await
        .map_err(|rejection| match rejection {
            CityRejection::NoCountry => ApiError::Conflict(
                "Please select a country before choosing a city.".to_string(),
            ),
            CityRejection::UnknownCity { city, country } => ApiError::Dashboard(
                DashboardError::not_found(format!("Unknown city '{city}' in {country}")),
            ),
        })?;

    info!(
        "Selected city {}",
        next.selection.city.as_ref().map_or("", |c| c.name.as_str())
    );
    Ok(Json(DashboardView::from(&next)))
}

async fn fetch_forecast(State(state): State<AppState>) -> (StatusCode, Json<DashboardView>) {
    let outcome = state.session.fetch().await;
    let status = outcome.error.as_ref().map_or(StatusCode::OK, status_for);
    (status, Json(DashboardView::from(&outcome.state)))
}

async fn get_forecast(State(state): State<AppState>) -> Response {
    let snapshot = state.session.snapshot().await;
    match snapshot.forecast {
        Some(document) => match document.raw_json() {
            Some(body) => Json(body.clone()).into_response(),
            None => Json(ForecastDocument::clone(&document)).into_response(),
        },
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
