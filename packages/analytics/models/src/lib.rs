#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dashboard analytics result types.
//!
//! Each type here is the data behind one dashboard widget: the KPI tiles,
//! the ranking tables, the legend, the header badges, the proximity alert
//! panel and the map layers. They serialize to camelCase JSON for the API.

use chrono::NaiveDateTime;
use crime_watch_incident_models::GeoPoint;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Headline numbers shown above the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    /// Incidents in the current selection.
    pub total_incidents: usize,
    /// Recent incidents from the last 7 days, ignoring the period and
    /// category filters.
    pub last_7_days: usize,
    /// Street with the most incidents in the selection (`"-"` if none).
    pub top_street: String,
    /// Incident count on [`Self::top_street`].
    pub top_street_count: usize,
}

/// Field a ranking groups by.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RankingDimension {
    /// Group by street.
    Street,
    /// Group by crime type.
    Category,
    /// Group by neighborhood.
    Neighborhood,
}

impl RankingDimension {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Street, Self::Category, Self::Neighborhood]
    }
}

/// One row of a ranking table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    /// Street, category or neighborhood name.
    pub label: String,
    /// Number of incidents.
    pub count: usize,
}

/// The three quick-ranking tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rankings {
    /// Top streets.
    pub streets: Vec<RankingEntry>,
    /// Top crime types.
    pub categories: Vec<RankingEntry>,
    /// Top neighborhoods.
    pub neighborhoods: Vec<RankingEntry>,
}

/// Incident counts shown in the map legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendCounts {
    /// Incidents in a violent category.
    pub violent: usize,
    /// All other incidents.
    pub other: usize,
}

/// Header badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badges {
    /// Look-back window in days.
    pub period_days: u32,
    /// Incidents currently shown.
    pub incidents_shown: usize,
    /// Alert radius in whole meters.
    pub alert_radius_m: u32,
}

/// Everything shown above the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// KPI tiles.
    pub kpis: Kpis,
    /// Header badges.
    pub badges: Badges,
    /// Legend counts.
    pub legend: LegendCounts,
}

/// Whether the alert panel has anything to report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertStatus {
    /// No incidents inside the radius.
    Clear,
    /// At least one incident inside the radius.
    Warning,
}

/// One incident listed in the alert panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRow {
    /// When the incident was recorded.
    pub timestamp: NaiveDateTime,
    /// Crime type.
    pub category: String,
    /// Street label.
    pub street: String,
    /// Neighborhood label.
    pub neighborhood: String,
    /// Distance from the reference point, rounded to 0.1 m.
    pub distance_m: f64,
}

/// The proximity alert panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPanel {
    /// Clear or warning.
    pub status: AlertStatus,
    /// Reference point the distances are measured from.
    pub reference: GeoPoint,
    /// Alert radius in meters.
    pub radius_m: f64,
    /// Number of incidents inside the radius.
    pub count: usize,
    /// Human-readable status line.
    pub message: String,
    /// Incidents inside the radius, nearest first.
    pub rows: Vec<AlertRow>,
    /// Incidents ignored for lacking coordinates.
    pub skipped: usize,
}

/// A `[latitude, longitude, weight]` heat-map sample.
pub type HeatPoint = [f64; 3];

/// A clustered incident pin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    /// Pin position.
    pub location: GeoPoint,
    /// Crime type.
    pub category: String,
    /// Street label.
    pub street: String,
    /// Neighborhood label.
    pub neighborhood: String,
    /// When the incident was recorded.
    pub timestamp: NaiveDateTime,
    /// Hex color.
    pub color: String,
    /// Hover text (`"<category> • <neighborhood>"`).
    pub tooltip: String,
}

/// A circle drawn on the map (alert radius or patrol coverage).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    /// Circle center.
    pub center: GeoPoint,
    /// Radius in meters.
    pub radius_m: f64,
    /// Stroke color.
    pub color: String,
    /// Hover text.
    pub tooltip: String,
}

/// A police station marker drawn with the patrol circles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationMarker {
    /// Station name.
    pub name: String,
    /// Station position.
    pub location: GeoPoint,
    /// Hex color.
    pub color: String,
}

/// All map layers for one dashboard state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLayers {
    /// Initial map center.
    pub center: GeoPoint,
    /// Initial zoom.
    pub zoom: u8,
    /// Heat-map samples.
    pub heat: Vec<HeatPoint>,
    /// Incident pins.
    pub pins: Vec<Pin>,
    /// Police patrol circles (empty when the layer is hidden).
    pub coverage: Vec<Circle>,
    /// Police station markers (empty when the coverage layer is hidden).
    pub stations: Vec<StationMarker>,
    /// Operator position.
    pub reference: GeoPoint,
    /// Operator alert circle, if drawn.
    pub alert_circle: Option<Circle>,
    /// Whether the mini-map is shown.
    pub minimap: bool,
    /// Legend counts, if the legend is shown.
    pub legend: Option<LegendCounts>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranking_dimension_parses_snake_case() {
        for dimension in RankingDimension::all() {
            let parsed: RankingDimension = dimension.as_ref().parse().unwrap();
            assert_eq!(parsed, *dimension);
        }
        assert_eq!(RankingDimension::Neighborhood.to_string(), "neighborhood");
        assert!("bairro".parse::<RankingDimension>().is_err());
    }

    #[test]
    fn alert_status_serializes_screaming_snake_case() {
        assert_eq!(
            serde_json::to_value(AlertStatus::Warning).unwrap(),
            serde_json::json!("WARNING")
        );
        assert_eq!(AlertStatus::Clear.to_string(), "CLEAR");
    }

    #[test]
    fn heat_point_serializes_as_triplet() {
        let point: HeatPoint = [-8.283, -35.03, 4.0];
        assert_eq!(
            serde_json::to_value(point).unwrap(),
            serde_json::json!([-8.283, -35.03, 4.0])
        );
    }
}
