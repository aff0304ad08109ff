//! Lookup data model
//!
//! `AddrResult` is what the API serves for a single address, and
//! `DatabaseMetadata` identifies the GeoIP database that produced it.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Everything known about one address.
///
/// Immutable once built; the cache hands out shared `Arc<AddrResult>`
/// snapshots, so a hit and the original miss serialize identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddrResult {
    pub ip: IpAddr,
    pub summary: String,
    pub city: String,
    pub subdivision: String,
    pub country: String,
    pub country_abbr: String,
    pub continent: String,
    pub continent_abbr: String,
    #[serde(serialize_with = "serialize_coordinate")]
    pub latitude: f64,
    #[serde(serialize_with = "serialize_coordinate")]
    pub longitude: f64,
    pub accuracy_radius: u16,
    pub timezone: String,
    pub postal_code: String,
    pub map: String,
}

impl AddrResult {
    /// A result carrying only the address, with every enrichment field empty.
    pub fn bare(ip: IpAddr) -> Self {
        Self {
            ip,
            summary: String::new(),
            city: String::new(),
            subdivision: String::new(),
            country: String::new(),
            country_abbr: String::new(),
            continent: String::new(),
            continent_abbr: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            accuracy_radius: 0,
            timezone: String::new(),
            postal_code: String::new(),
            map: String::new(),
        }
    }

    /// Fill the derived `summary` and `map` fields from the others.
    pub fn with_derived_fields(mut self) -> Self {
        self.summary = [&self.city, &self.subdivision, &self.country]
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        self.map = if self.latitude == 0.0 && self.longitude == 0.0 {
            String::new()
        } else {
            map_url(self.latitude, self.longitude)
        };

        self
    }
}

/// Whole-number coordinates are written without a fraction (`0`, not `0.0`).
fn serialize_coordinate<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// OpenStreetMap link centred on the given coordinates.
pub fn map_url(latitude: f64, longitude: f64) -> String {
    format!(
        "https://www.openstreetmap.org/?mlat={lat}&mlon={lon}#map=10/{lat}/{lon}",
        lat = latitude,
        lon = longitude
    )
}

/// Identity of the loaded GeoIP database.
///
/// Replaced as a whole on reload, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseMetadata {
    pub ip_version: u16,
    pub build_epoch: u64,
    pub database_type: String,
}

impl DatabaseMetadata {
    /// Value of the `X-Maxmind-Build` header: `<ipVersion>-<buildEpoch>`.
    pub fn build_header(&self) -> String {
        format!("{}-{}", self.ip_version, self.build_epoch)
    }

    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.build_epoch)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}
