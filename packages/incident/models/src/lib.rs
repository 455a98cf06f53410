#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Incident record and geographic point types.
//!
//! This crate defines the shapes shared by every other crime watch crate:
//! the immutable [`Incident`] row loaded from the dataset, the [`GeoPoint`]
//! used for reference points and police stations, and the [`Geolocated`]
//! trait the proximity engine is generic over.
//!
//! Crime categories are an open set discovered from the loaded dataset, so
//! they are plain strings rather than an enum.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Heat weight used when an incident row carries no severity.
pub const DEFAULT_SEVERITY: f64 = 1.0;

/// A WGS-84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a point from a latitude/longitude pair.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns `true` when both components are finite numbers.
    ///
    /// No range check is applied: out-of-range coordinates still produce a
    /// (meaningless) distance rather than an error.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Returns `true` when the point lies within `-90..=90` latitude and
    /// `-180..=180` longitude.
    #[must_use]
    pub fn is_within_earth_bounds(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Anything that may have a usable position on the map.
///
/// Returning `None` means the record cannot take part in distance
/// computations (missing or non-finite coordinates). Callers skip such
/// records instead of failing.
pub trait Geolocated {
    /// The record's position, if it has a usable one.
    fn location(&self) -> Option<GeoPoint>;
}

impl<T: Geolocated + ?Sized> Geolocated for &T {
    fn location(&self) -> Option<GeoPoint> {
        (**self).location()
    }
}

impl Geolocated for GeoPoint {
    fn location(&self) -> Option<GeoPoint> {
        self.is_finite().then_some(*self)
    }
}

/// One row of the crime dataset.
///
/// Incidents are immutable once loaded. Coordinates are optional because
/// the dataset may contain partially-dirty rows; see [`Geolocated`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    /// When the incident was recorded (the dataset has no timezone).
    pub timestamp: NaiveDateTime,
    /// Latitude (WGS84), if present in the source row.
    pub latitude: Option<f64>,
    /// Longitude (WGS84), if present in the source row.
    pub longitude: Option<f64>,
    /// Crime type label (e.g. `"Roubo"`).
    pub category: String,
    /// Street label.
    pub street: String,
    /// Neighborhood label.
    pub neighborhood: String,
    /// Heat-map weight. Not used for alerting.
    pub severity: Option<f64>,
}

impl Incident {
    /// Returns the heat weight, falling back to [`DEFAULT_SEVERITY`].
    #[must_use]
    pub fn severity_weight(&self) -> f64 {
        self.severity
            .filter(|s| s.is_finite())
            .unwrap_or(DEFAULT_SEVERITY)
    }
}

impl Geolocated for Incident {
    fn location(&self) -> Option<GeoPoint> {
        let point = GeoPoint::new(self.latitude?, self.longitude?);
        point.is_finite().then_some(point)
    }
}

/// A simulated police base with a patrol circle drawn around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoliceStation {
    /// Display name (e.g. `"Base Gaibu"`).
    pub name: String,
    /// Station position.
    pub location: GeoPoint,
}

impl Geolocated for PoliceStation {
    fn location(&self) -> Option<GeoPoint> {
        self.location.location()
    }
}
