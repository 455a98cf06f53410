//! Map layer payloads.

use crime_watch_analytics_models::{Circle, HeatPoint, MapLayers, Pin, StationMarker};
use crime_watch_config::{DashboardConfig, Layers};
use crime_watch_dataset::filter::DashboardView;
use crime_watch_incident_models::{GeoPoint, Geolocated as _, Incident};

use crate::legend_counts;

/// Pin color for violent categories.
pub const VIOLENT_COLOR: &str = "#33a1fd";
/// Pin color for every other category.
pub const OTHER_COLOR: &str = "#14f195";
/// Operator alert circle color.
pub const ALERT_CIRCLE_COLOR: &str = "#ffcc00";
/// Patrol circle and station marker color.
pub const COVERAGE_COLOR: &str = "#33a1fd";

/// Map state chosen by the operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerOptions {
    /// Operator position.
    pub reference: GeoPoint,
    /// Alert circle radius in meters.
    pub alert_radius_m: f64,
    /// Patrol circle radius in meters.
    pub patrol_radius_m: f64,
    /// Layer toggles.
    pub layers: Layers,
}

impl LayerOptions {
    /// Options with every value taken from `config`.
    #[must_use]
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            reference: config.reference,
            alert_radius_m: config.controls.alert_radius_m.default,
            patrol_radius_m: config.controls.patrol_radius_m.default,
            layers: config.layers,
        }
    }
}

/// Tooltip shown when hovering an incident pin.
#[must_use]
pub fn pin_tooltip(incident: &Incident) -> String {
    format!("{} • {}", incident.category, incident.neighborhood)
}

/// Heat-map samples for every located incident of the selection.
#[must_use]
pub fn heat_points(view: &DashboardView<'_>) -> Vec<HeatPoint> {
    view.selection
        .iter()
        .filter_map(|incident| {
            let location = incident.location()?;
            Some([
                location.latitude,
                location.longitude,
                incident.severity_weight(),
            ])
        })
        .collect()
}

/// Pins for every located incident of the selection.
#[must_use]
pub fn pins(view: &DashboardView<'_>, config: &DashboardConfig) -> Vec<Pin> {
    view.selection
        .iter()
        .filter_map(|incident| {
            let location = incident.location()?;
            let color = if config.is_violent(&incident.category) {
                VIOLENT_COLOR
            } else {
                OTHER_COLOR
            };
            Some(Pin {
                location,
                category: incident.category.clone(),
                street: incident.street.clone(),
                neighborhood: incident.neighborhood.clone(),
                timestamp: incident.timestamp,
                color: color.to_string(),
                tooltip: pin_tooltip(incident),
            })
        })
        .collect()
}

/// One patrol circle per police station.
#[must_use]
pub fn coverage_circles(config: &DashboardConfig, patrol_radius_m: f64) -> Vec<Circle> {
    config
        .stations
        .iter()
        .map(|station| Circle {
            center: station.location,
            radius_m: patrol_radius_m,
            color: COVERAGE_COLOR.to_string(),
            tooltip: format!("🚓 {} (raio {patrol_radius_m:.0} m)", station.name),
        })
        .collect()
}

/// One marker per police station.
#[must_use]
pub fn station_markers(config: &DashboardConfig) -> Vec<StationMarker> {
    config
        .stations
        .iter()
        .map(|station| StationMarker {
            name: station.name.clone(),
            location: station.location,
            color: COVERAGE_COLOR.to_string(),
        })
        .collect()
}

/// Builds every map layer for the view.
#[must_use]
pub fn map_layers(
    view: &DashboardView<'_>,
    config: &DashboardConfig,
    options: &LayerOptions,
) -> MapLayers {
    let layers = options.layers;

    let (coverage, stations) = if layers.coverage {
        (
            coverage_circles(config, options.patrol_radius_m),
            station_markers(config),
        )
    } else {
        (Vec::new(), Vec::new())
    };

    let alert_circle = layers.alert_circle.then(|| Circle {
        center: options.reference,
        radius_m: options.alert_radius_m,
        color: ALERT_CIRCLE_COLOR.to_string(),
        tooltip: format!("Alert radius {:.0} m", options.alert_radius_m),
    });

    MapLayers {
        center: config.map.center,
        zoom: config.map.zoom,
        heat: heat_points(view),
        pins: pins(view, config),
        coverage,
        stations,
        reference: options.reference,
        alert_circle,
        minimap: layers.minimap,
        legend: layers.legend.then(|| legend_counts(view, config)),
    }
}
