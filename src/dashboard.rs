//! Dashboard state and the reducer that drives it
//!
//! `DashboardState` is an immutable-update value: every user action or fetch
//! completion consumes the current state and yields the next one, plus an
//! optional effect for the caller to run. `DashboardSession` owns the current
//! state for the single interactive session and runs fetch effects against a
//! `ForecastSource`.
//!
//! Fetch ordering: every fetch gets a fresh request id and only the latest
//! issued id may complete. Changing the selection also supersedes the
//! outstanding request, since its response no longer matches what the user
//! picked.

use crate::error::NO_CITY_SELECTED;
use crate::locations::{self, GeoProvider};
use crate::models::{City, Coordinate, Country, ForecastDocument};
use crate::weather::ForecastSource;
use crate::DashboardError;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Sequence number of a forecast request
pub type RequestId = u64;

/// Current country and city choice
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Selection {
    pub country: Option<Country>,
    pub city: Option<City>,
}

impl Selection {
    /// Choose a country; the city always resets
    #[must_use]
    pub fn select_country(self, country: Country) -> Self {
        Self {
            country: Some(country),
            city: None,
        }
    }

    /// Choose a city. Allowed without a country; the interaction layer gates it.
    /// Ownership against the chosen country is checked by the reducer.
    #[must_use]
    pub fn select_city(self, city: City) -> Self {
        Self {
            city: Some(city),
            ..self
        }
    }
}

/// Everything the dashboard renders from
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub selection: Selection,
    pub forecast: Option<Arc<ForecastDocument>>,
    pub error_message: Option<String>,
    /// Request whose completion will be applied, if any
    pub in_flight: Option<RequestId>,
    next_request: RequestId,
}

/// Inputs to the reducer
#[derive(Debug)]
pub enum Action {
    SelectCountry(Country),
    SelectCity(City),
    FetchRequested,
    FetchSucceeded {
        request: RequestId,
        document: ForecastDocument,
    },
    FetchFailed {
        request: RequestId,
        message: String,
    },
}

/// Work the caller must perform after a transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    Fetch {
        request: RequestId,
        coordinate: Coordinate,
    },
}

impl DashboardState {
    /// Apply one action, returning the next state and any effect to run
    #[must_use]
    pub fn apply(self, action: Action) -> (Self, Option<Effect>) {
        match action {
            Action::SelectCountry(country) => {
                debug!(country = %country.iso_code, "Country selected");
                (
                    Self {
                        selection: self.selection.select_country(country),
                        in_flight: None,
                        ..self
                    },
                    None,
                )
            }
            Action::SelectCity(city) => {
                match self.selection.country.as_ref() {
                    None => debug!(city = %city.name, "City selected without a country"),
                    Some(country) if !city.belongs_to(country) => {
                        warn!(
                            city = %city.name,
                            country = %country.iso_code,
                            "Ignoring city outside the selected country"
                        );
                        return (self, None);
                    }
                    Some(_) => {}
                }
                (
                    Self {
                        selection: self.selection.select_city(city),
                        in_flight: None,
                        ..self
                    },
                    None,
                )
            }
            Action::FetchRequested => match self.selection.city.as_ref() {
                None => (
                    Self {
                        error_message: Some(NO_CITY_SELECTED.to_string()),
                        ..self
                    },
                    None,
                ),
                Some(city) => {
                    let request = self.next_request;
                    let effect = Effect::Fetch {
                        request,
                        coordinate: city.coordinate,
                    };
                    (
                        Self {
                            in_flight: Some(request),
                            next_request: request + 1,
                            ..self
                        },
                        Some(effect),
                    )
                }
            },
            Action::FetchSucceeded { request, document } => {
                if !self.is_current(request) {
                    debug!(request, "Discarding superseded forecast");
                    return (self, None);
                }
                (
                    Self {
                        forecast: Some(Arc::new(document)),
                        error_message: None,
                        in_flight: None,
                        ..self
                    },
                    None,
                )
            }
            Action::FetchFailed { request, message } => {
                if !self.is_current(request) {
                    debug!(request, "Discarding superseded fetch failure");
                    return (self, None);
                }
                (
                    Self {
                        error_message: Some(message),
                        in_flight: None,
                        ..self
                    },
                    None,
                )
            }
        }
    }

    /// Whether a city may be chosen
    #[must_use]
    pub fn city_selection_enabled(&self) -> bool {
        self.selection.country.is_some()
    }

    /// Whether the fetch action is available
    #[must_use]
    pub fn fetch_enabled(&self) -> bool {
        self.selection.city.is_some()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether a completion of `request` would be applied
    #[must_use]
    pub fn is_current(&self, request: RequestId) -> bool {
        self.in_flight == Some(request)
    }
}

/// Why a city could not be selected by name
#[derive(Debug, Clone, PartialEq)]
pub enum CityRejection {
    /// No country chosen yet
    NoCountry,
    /// The selected country has no city with that name
    UnknownCity { city: String, country: String },
}

/// Result of one fetch interaction
#[derive(Debug)]
pub struct FetchOutcome {
    /// State after the interaction finished
    pub state: DashboardState,
    /// Why this interaction failed, if it did. A superseded request never
    /// reports an error.
    pub error: Option<DashboardError>,
}

/// The single interactive session
pub struct DashboardSession {
    state: RwLock<DashboardState>,
    source: Arc<dyn ForecastSource>,
}

impl DashboardSession {
    pub fn new(source: Arc<dyn ForecastSource>) -> Self {
        Self {
            state: RwLock::new(DashboardState::default()),
            source,
        }
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    pub async fn select_country(&self, country: Country) -> DashboardState {
        self.dispatch(Action::SelectCountry(country)).await.0
    }

    /// Resolve `name` within the selected country and select it.
    ///
    /// The lookup and the update happen under one write guard, so a
    /// concurrent country change cannot pair the city with another country.
    pub async fn select_city(
        &self,
        geo: &dyn GeoProvider,
        name: &str,
    ) -> std::result::Result<DashboardState, CityRejection> {
        let mut guard = self.state.write().await;
        let Some(country) = guard.selection.country.as_ref() else {
            return Err(CityRejection::NoCountry);
        };
        let Some(city) = locations::find_city(geo, &country.iso_code, name) else {
            return Err(CityRejection::UnknownCity {
                city: name.to_string(),
                country: country.name.clone(),
            });
        };

        Ok(Self::transition(&mut guard, Action::SelectCity(city)).0)
    }

    /// Fetch the forecast for the selected city and apply the result.
    ///
    /// The state lock is released while the request is outstanding.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> FetchOutcome {
        let (state, effect) = self.dispatch(Action::FetchRequested).await;

        let Some(Effect::Fetch {
            request,
            coordinate,
        }) = effect
        else {
            info!("Fetch rejected: no city selected");
            return FetchOutcome {
                state,
                error: Some(DashboardError::validation(NO_CITY_SELECTED)),
            };
        };

        debug!(request, "Fetching forecast");
        match self.source.fetch_forecast(coordinate).await {
            Ok(document) => {
                let (state, _) = self
                    .complete(request, Action::FetchSucceeded { request, document })
                    .await;
                FetchOutcome { state, error: None }
            }
            Err(err) => {
                warn!(request, "Forecast fetch failed: {}", err);
                let action = Action::FetchFailed {
                    request,
                    message: err.user_message(),
                };
                let (state, applied) = self.complete(request, action).await;
                FetchOutcome {
                    state,
                    error: applied.then_some(err),
                }
            }
        }
    }

    async fn dispatch(&self, action: Action) -> (DashboardState, Option<Effect>) {
        let mut guard = self.state.write().await;
        Self::transition(&mut guard, action)
    }

    /// Apply a completion of `request`, reporting whether it was still current
    async fn complete(&self, request: RequestId, action: Action) -> (DashboardState, bool) {
        let mut guard = self.state.write().await;
        let applied = guard.is_current(request);
        let (next, _) = Self::transition(&mut guard, action);
        (next, applied)
    }

    fn transition(current: &mut DashboardState, action: Action) -> (DashboardState, Option<Effect>) {
        let (next, effect) = std::mem::take(current).apply(action);
        *current = next.clone();
        (next, effect)
    }
}
