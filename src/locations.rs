//! Location selector
//!
//! Countries and their cities come from a static reference dataset. The
//! built-in dataset is embedded at compile time; a replacement with the same
//! JSON shape can be loaded from disk.

use crate::models::{City, Coordinate, Country};
use crate::{DashboardError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, instrument};

const BUILTIN_DATASET: &str = include_str!("../data/locations.json");

/// Read-only source of countries and cities
pub trait GeoProvider: Send + Sync {
    /// All known countries in a stable order
    fn countries(&self) -> &[Country];

    /// Cities of the country with the given ISO code; empty when unknown
    fn cities_of(&self, iso_code: &str) -> &[City];
}

#[derive(Debug, Deserialize)]
struct DatasetCountry {
    name: String,
    iso_code: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    cities: Vec<DatasetCity>,
}

#[derive(Debug, Deserialize)]
struct DatasetCity {
    name: String,
    latitude: f64,
    longitude: f64,
}

/// In-memory provider over a parsed dataset
#[derive(Debug, Clone)]
pub struct StaticGeoProvider {
    countries: Vec<Country>,
    cities: HashMap<String, Vec<City>>,
}

impl StaticGeoProvider {
    /// Provider over the embedded dataset
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_DATASET)
    }

    /// Provider over a dataset file
    #[instrument]
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let provider = Self::from_json(&raw)?;
        info!(
            "Loaded {} countries from {}",
            provider.countries.len(),
            path.display()
        );
        Ok(provider)
    }

    /// Use `path` when given, the embedded dataset otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::builtin(),
        }
    }

    /// Parse a dataset document
    pub fn from_json(raw: &str) -> Result<Self> {
        let dataset: Vec<DatasetCountry> = serde_json::from_str(raw)?;

        let mut countries = Vec::with_capacity(dataset.len());
        let mut cities = HashMap::with_capacity(dataset.len());

        for entry in dataset {
            let iso_code = entry.iso_code.to_ascii_uppercase();
            let coordinate = Coordinate::new(entry.latitude, entry.longitude);
            if !coordinate.is_valid() {
                return Err(DashboardError::parse(format!(
                    "country '{}' has out-of-range coordinates",
                    entry.name
                )));
            }
            if cities.contains_key(&iso_code) {
                return Err(DashboardError::parse(format!(
                    "duplicate country code '{iso_code}' in location dataset"
                )));
            }

            let country_cities: Vec<City> = entry
                .cities
                .into_iter()
                .map(|city| City {
                    name: city.name,
                    country_code: iso_code.clone(),
                    coordinate: Coordinate::new(city.latitude, city.longitude),
                })
                .collect();

            if let Some(city) = country_cities.iter().find(|c| !c.coordinate.is_valid()) {
                return Err(DashboardError::parse(format!(
                    "city '{}' has out-of-range coordinates",
                    city.name
                )));
            }

            countries.push(Country {
                name: entry.name,
                iso_code: iso_code.clone(),
                coordinate,
            });
            cities.insert(iso_code, country_cities);
        }

        debug!("Parsed location dataset with {} countries", countries.len());
        Ok(Self { countries, cities })
    }

    /// All known countries
    #[must_use]
    pub fn list_countries(&self) -> &[Country] {
        &self.countries
    }

    /// Cities of a country; empty for an absent or unknown code
    #[must_use]
    pub fn list_cities(&self, iso_code: Option<&str>) -> &[City] {
        match iso_code {
            Some(code) => self.cities_of(code),
            None => &[],
        }
    }
}

impl GeoProvider for StaticGeoProvider {
    fn countries(&self) -> &[Country] {
        &self.countries
    }

    fn cities_of(&self, iso_code: &str) -> &[City] {
        self.cities
            .get(&iso_code.to_ascii_uppercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Look up a country by ISO code
pub fn find_country(provider: &dyn GeoProvider, iso_code: &str) -> Option<Country> {
    provider
        .countries()
        .iter()
        .find(|c| c.iso_code.eq_ignore_ascii_case(iso_code))
        .cloned()
}

/// Look up a city by name within a country
pub fn find_city(provider: &dyn GeoProvider, iso_code: &str, name: &str) -> Option<City> {
    provider
        .cities_of(iso_code)
        .iter()
        .find(|c| c.name == name)
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_builtin_dataset_loads() {
        let provider = StaticGeoProvider::builtin().unwrap();
        assert!(!provider.list_countries().is_empty());
    }

    #[test]
    fn test_cities_belong_to_their_country() {
        let provider = StaticGeoProvider::builtin().unwrap();
        for country in provider.countries() {
            let cities = provider.cities_of(&country.iso_code);
            assert!(!cities.is_empty(), "{} has no cities", country.name);
            assert!(cities.iter().all(|city| city.belongs_to(country)));
        }
    }

    #[test]
    fn test_country_order_is_stable() {
        let provider = StaticGeoProvider::builtin().unwrap();
        let first: Vec<_> = provider.countries().iter().map(|c| c.iso_code.clone()).collect();
        let second: Vec<_> = provider.countries().iter().map(|c| c.iso_code.clone()).collect();
        assert_eq!(first, second);
        assert_eq!(provider.countries()[0].name, "Argentina");
    }

    #[rstest]
    #[case(Some("XX"))]
    #[case(Some(""))]
    #[case(None)]
    fn test_unknown_or_absent_code_yields_no_cities(#[case] iso_code: Option<&str>) {
        let provider = StaticGeoProvider::builtin().unwrap();
        assert!(provider.list_cities(iso_code).is_empty());
    }

    #[rstest]
    #[case("de")]
    #[case("DE")]
    #[case("De")]
    fn test_lookup_is_case_insensitive(#[case] iso_code: &str) {
        let provider = StaticGeoProvider::builtin().unwrap();
        let country = find_country(&provider, iso_code).unwrap();
        assert_eq!(country.name, "Germany");
        assert!(find_city(&provider, iso_code, "Berlin").is_some());
    }

    #[test]
    fn test_find_city_is_scoped_to_country() {
        let provider = StaticGeoProvider::builtin().unwrap();
        assert!(find_city(&provider, "FR", "Berlin").is_none());
        let paris = find_city(&provider, "FR", "Paris").unwrap();
        assert_eq!(paris.country_code, "FR");
    }

    #[test]
    fn test_duplicate_codes_rejected() {
        let raw = r#"[
            {"name": "A", "iso_code": "AA", "latitude": 0.0, "longitude": 0.0},
            {"name": "B", "iso_code": "aa", "latitude": 0.0, "longitude": 0.0}
        ]"#;
        assert!(StaticGeoProvider::from_json(raw).is_err());
    }

    #[test]
    fn test_out_of_range_city_rejected() {
        let raw = r#"[
            {"name": "A", "iso_code": "AA", "latitude": 0.0, "longitude": 0.0,
             "cities": [{"name": "Nowhere", "latitude": 120.0, "longitude": 0.0}]}
        ]"#;
        assert!(StaticGeoProvider::from_json(raw).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locations.json");
        std::fs::write(
            &path,
            r#"[{"name": "Iceland", "iso_code": "IS", "latitude": 65.0, "longitude": -18.0,
                 "cities": [{"name": "Reykjavík", "latitude": 64.13548, "longitude": -21.89541}]}]"#,
        )
        .unwrap();

        let provider = StaticGeoProvider::load(Some(&path)).unwrap();
        assert_eq!(provider.countries().len(), 1);
        assert_eq!(provider.cities_of("IS")[0].name, "Reykjavík");
    }
}
