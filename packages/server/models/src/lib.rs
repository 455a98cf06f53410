#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the crime watch server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the in-memory incident and config types so the API contract can
//! evolve independently.

use chrono::NaiveDateTime;
use crime_watch_config::{DashboardConfig, Layers, MapSettings, Slider};
use crime_watch_incident_models::{GeoPoint, Incident, PoliceStation};
use crime_watch_proximity::coverage::{CoverageSummary, StationDistance};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Dashboard controls shared by every view endpoint.
///
/// Every field is optional; missing values fall back to the configured
/// defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewQueryParams {
    /// Number of newest incidents to consider.
    pub limit: Option<u32>,
    /// Look-back window in days.
    pub period_days: Option<u32>,
    /// Comma-separated categories; `*` selects all.
    pub categories: Option<String>,
    /// Reference latitude.
    pub lat: Option<f64>,
    /// Reference longitude.
    pub lon: Option<f64>,
    /// Alert radius in meters.
    pub radius: Option<f64>,
    /// Patrol radius in meters.
    pub patrol_radius: Option<f64>,
    /// Draw the alert circle.
    pub show_alert_circle: Option<bool>,
    /// Draw the patrol circles.
    pub show_coverage: Option<bool>,
}

/// An incident as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiIncident {
    /// When the incident was recorded.
    pub timestamp: NaiveDateTime,
    /// Crime type.
    pub category: String,
    /// Street label.
    pub street: String,
    /// Neighborhood label.
    pub neighborhood: String,
    /// Latitude, if known.
    pub latitude: Option<f64>,
    /// Longitude, if known.
    pub longitude: Option<f64>,
    /// Heat-map weight.
    pub severity: f64,
}

impl From<&Incident> for ApiIncident {
    fn from(incident: &Incident) -> Self {
        Self {
            timestamp: incident.timestamp,
            category: incident.category.clone(),
            street: incident.street.clone(),
            neighborhood: incident.neighborhood.clone(),
            latitude: incident.latitude,
            longitude: incident.longitude,
            severity: incident.severity_weight(),
        }
    }
}

/// Response of `GET /api/categories`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCategories {
    /// Categories present in the recent set, sorted.
    pub available: Vec<String>,
    /// Categories selected when none are requested.
    pub default_selection: Vec<String>,
}

/// Response of `GET /api/incidents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiIncidents {
    /// Look-back window in days.
    pub period_days: u32,
    /// Categories applied, if filtering.
    pub categories: Option<Vec<String>>,
    /// Selected incidents, newest first.
    pub incidents: Vec<ApiIncident>,
}

/// Slider bounds as exposed to clients.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSlider<T> {
    /// Minimum value.
    pub min: T,
    /// Maximum value.
    pub max: T,
    /// UI step.
    pub step: T,
    /// Default value.
    pub default: T,
}

impl<T: Copy> From<&Slider<T>> for ApiSlider<T> {
    fn from(slider: &Slider<T>) -> Self {
        Self {
            min: slider.min,
            max: slider.max,
            step: slider.step,
            default: slider.default,
        }
    }
}

/// Response of `GET /api/config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// Incident count slider.
    pub incident_count: ApiSlider<u32>,
    /// Alert radius slider.
    pub alert_radius_m: ApiSlider<f64>,
    /// Patrol radius slider.
    pub patrol_radius_m: ApiSlider<f64>,
    /// Selectable periods in days.
    pub periods: Vec<u32>,
    /// Default period in days.
    pub default_period_days: u32,
    /// Default reference point.
    pub reference: GeoPoint,
    /// Initial map center.
    pub map_center: GeoPoint,
    /// Initial map zoom.
    pub map_zoom: u8,
    /// Default layer toggles.
    pub layers: ApiLayers,
    /// Categories drawn as violent.
    pub violent_categories: Vec<String>,
    /// Simulated police bases.
    pub stations: Vec<PoliceStation>,
}

/// Layer toggles as exposed to clients.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLayers {
    /// Alert circle.
    pub alert_circle: bool,
    /// Patrol circles.
    pub coverage: bool,
    /// Mini-map.
    pub minimap: bool,
    /// Legend.
    pub legend: bool,
}

impl From<Layers> for ApiLayers {
    fn from(layers: Layers) -> Self {
        Self {
            alert_circle: layers.alert_circle,
            coverage: layers.coverage,
            minimap: layers.minimap,
            legend: layers.legend,
        }
    }
}

impl From<&DashboardConfig> for ApiConfig {
    fn from(config: &DashboardConfig) -> Self {
        let MapSettings { center, zoom } = config.map;
        Self {
            incident_count: (&config.controls.incident_count).into(),
            alert_radius_m: (&config.controls.alert_radius_m).into(),
            patrol_radius_m: (&config.controls.patrol_radius_m).into(),
            periods: config.periods.options.clone(),
            default_period_days: config.periods.default,
            reference: config.reference,
            map_center: center,
            map_zoom: zoom,
            layers: config.layers.into(),
            violent_categories: config.violent_categories.clone(),
            stations: config.stations.clone(),
        }
    }
}

/// Response of `GET /api/coverage`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCoverage {
    /// Point the covering stations were measured from.
    pub reference: GeoPoint,
    /// Stations whose patrol circle contains the reference point.
    pub covering_reference: Vec<StationDistance>,
    /// Incident counts per patrol circle.
    pub summary: CoverageSummary,
}
