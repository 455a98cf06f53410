//! Simulated police patrol coverage.
//!
//! Every [`PoliceStation`] patrols a circle of the same radius. These
//! queries answer which stations cover a given point and how many incidents
//! each patrol circle contains, using the same haversine distance and
//! skip policy as [`crate::find_nearby`].

use crime_watch_incident_models::{GeoPoint, Geolocated, PoliceStation};
use serde::Serialize;

use crate::{ProximityError, find_nearby, haversine_distance, validate_inputs};

/// A station whose patrol circle contains the queried point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationDistance {
    /// Station name.
    pub name: String,
    /// Station position.
    pub location: GeoPoint,
    /// Distance from the queried point to the station, in meters.
    pub distance_m: f64,
}

/// Incident counts inside one station's patrol circle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationLoad {
    /// Station name.
    pub name: String,
    /// Incidents within the patrol radius.
    pub incidents: usize,
}

/// Coverage of an incident set by all stations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSummary {
    /// Patrol radius used, in meters.
    pub patrol_radius_m: f64,
    /// Per-station counts, in station order.
    pub stations: Vec<StationLoad>,
    /// Located incidents outside every patrol circle.
    pub uncovered: usize,
    /// Incidents skipped for lacking a usable location.
    pub skipped: usize,
}

/// Returns the stations whose patrol circle contains `point`, nearest
/// first.
///
/// # Errors
///
/// Returns [`ProximityError`] if `point` is non-finite or the radius is
/// negative.
pub fn stations_covering(
    point: GeoPoint,
    stations: &[PoliceStation],
    patrol_radius_m: f64,
) -> Result<Vec<StationDistance>, ProximityError> {
    Ok(find_nearby(point, patrol_radius_m, stations)?
        .into_iter()
        .map(|nearby| StationDistance {
            name: nearby.item.name.clone(),
            location: nearby.item.location,
            distance_m: nearby.distance_m,
        })
        .collect())
}

/// Counts the incidents each station covers, and the ones nobody covers.
///
/// An incident inside two overlapping patrol circles counts for both
/// stations. Stations with unusable coordinates cover nothing.
///
/// # Errors
///
/// Returns [`ProximityError::InvalidRadius`] if the radius is negative or
/// `NaN`.
pub fn coverage_summary<T: Geolocated>(
    stations: &[PoliceStation],
    incidents: &[T],
    patrol_radius_m: f64,
) -> Result<CoverageSummary, ProximityError> {
    // Radius check up front so an empty station list still rejects it.
    validate_inputs(GeoPoint::new(0.0, 0.0), patrol_radius_m)?;

    let station_points: Vec<Option<GeoPoint>> =
        stations.iter().map(Geolocated::location).collect();

    let mut counts = vec![0usize; stations.len()];
    let mut uncovered = 0;
    let mut skipped = 0;

    for incident in incidents {
        let Some(location) = incident.location() else {
            skipped += 1;
            continue;
        };

        let mut covered = false;
        for (count, station) in counts.iter_mut().zip(&station_points) {
            if let Some(station) = station
                && haversine_distance(*station, location) <= patrol_radius_m
            {
                *count += 1;
                covered = true;
            }
        }

        if !covered {
            uncovered += 1;
        }
    }

    log::debug!(
        "Coverage at {patrol_radius_m} m: {uncovered} uncovered, {skipped} skipped across {} stations",
        stations.len()
    );

    Ok(CoverageSummary {
        patrol_radius_m,
        stations: stations
            .iter()
            .zip(counts)
            .map(|(station, incidents)| StationLoad {
                name: station.name.clone(),
                incidents,
            })
            .collect(),
        uncovered,
        skipped,
    })
}
