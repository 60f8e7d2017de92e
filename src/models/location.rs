//! Location models for geographic coordinates and reference entities

use serde::{Deserialize, Serialize};

/// Geographic query point
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components fall inside the valid degree ranges
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Format coordinates as a display string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("Latitude: {} | Longitude: {}", self.latitude, self.longitude)
    }
}

/// A selectable country
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Country {
    pub name: String,
    /// ISO 3166-1 alpha-2 code
    pub iso_code: String,
    pub coordinate: Coordinate,
}

/// A selectable city, scoped under a country
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct City {
    pub name: String,
    /// ISO code of the owning country
    pub country_code: String,
    pub coordinate: Coordinate,
}

impl City {
    /// Check whether this city belongs to the given country
    #[must_use]
    pub fn belongs_to(&self, country: &Country) -> bool {
        self.country_code.eq_ignore_ascii_case(&country.iso_code)
    }
}
