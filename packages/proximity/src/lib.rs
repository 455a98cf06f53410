#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Proximity alerts over geolocated incidents.
//!
//! Computes the great-circle (haversine) distance from a reference point to
//! every incident and returns the ones inside an alert radius, nearest
//! first. The Earth is treated as a sphere of radius [`EARTH_RADIUS_M`];
//! there is no ellipsoidal correction, which is fine at the scale of a
//! city-level alert radius.
//!
//! Everything here is a pure function of its inputs. Nothing is cached and
//! no input is mutated, so the functions can be called from any thread.
//!
//! The [`coverage`] module builds police patrol coverage queries on top of
//! the same distance computation.

pub mod coverage;

use crime_watch_incident_models::{GeoPoint, Geolocated};
use thiserror::Error;

/// Mean Earth radius used by the haversine formula, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Errors returned for invalid alert inputs.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ProximityError {
    /// The radius was negative or `NaN`.
    #[error("Invalid radius {radius_m} m: expected a non-negative number")]
    InvalidRadius {
        /// The rejected radius.
        radius_m: f64,
    },

    /// A reference coordinate was `NaN` or infinite.
    #[error("Invalid coordinate ({latitude}, {longitude}): components must be finite")]
    InvalidCoordinate {
        /// Rejected latitude.
        latitude: f64,
        /// Rejected longitude.
        longitude: f64,
    },
}

/// An incident found inside the alert radius, with its distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearby<'a, T> {
    /// The matched record.
    pub item: &'a T,
    /// Great-circle distance from the reference point, in meters (full
    /// precision).
    pub distance_m: f64,
}

/// Result of a proximity scan, including how many records were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityScan<'a, T> {
    /// Matches inside the radius, nearest first.
    pub matches: Vec<Nearby<'a, T>>,
    /// Records ignored because they had no usable location.
    pub skipped: usize,
}

/// Great-circle distance between two points, in meters.
///
/// The intermediate haversine term is clamped to `[0, 1]` so rounding at
/// coincident or antipodal points never yields `NaN`.
#[must_use]
pub fn haversine_distance(from: GeoPoint, to: GeoPoint) -> f64 {
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let delta_phi = (to.latitude - from.latitude).to_radians();
    let delta_lambda = (to.longitude - from.longitude).to_radians();

    let sin_half_phi = (delta_phi / 2.0).sin();
    let sin_half_lambda = (delta_lambda / 2.0).sin();

    let a = sin_half_phi
        .mul_add(
            sin_half_phi,
            phi1.cos() * phi2.cos() * sin_half_lambda.powi(2),
        )
        .clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Checks the reference point and radius shared by every alert query.
///
/// # Errors
///
/// * [`ProximityError::InvalidCoordinate`] if either component of
///   `reference` is non-finite.
/// * [`ProximityError::InvalidRadius`] if `radius_m` is negative or `NaN`.
pub fn validate_inputs(reference: GeoPoint, radius_m: f64) -> Result<(), ProximityError> {
    if !reference.is_finite() {
        return Err(ProximityError::InvalidCoordinate {
            latitude: reference.latitude,
            longitude: reference.longitude,
        });
    }
    if radius_m.is_nan() || radius_m < 0.0 {
        return Err(ProximityError::InvalidRadius { radius_m });
    }
    Ok(())
}

/// Finds every record within `radius_m` meters of `reference`, and counts
/// the records that could not be located.
///
/// Matches are sorted by ascending distance. The sort is stable, so records
/// at equal distance keep their input order.
///
/// # Errors
///
/// See [`validate_inputs`].
pub fn scan_nearby<T: Geolocated>(
    reference: GeoPoint,
    radius_m: f64,
    records: &[T],
) -> Result<ProximityScan<'_, T>, ProximityError> {
    validate_inputs(reference, radius_m)?;

    let mut skipped = 0;
    let mut matches: Vec<Nearby<'_, T>> = records
        .iter()
        .filter_map(|item| {
            let Some(location) = item.location() else {
                skipped += 1;
                return None;
            };
            let distance_m = haversine_distance(reference, location);
            (distance_m <= radius_m).then_some(Nearby { item, distance_m })
        })
        .collect();

    matches.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));

    if skipped > 0 {
        log::debug!(
            "Proximity scan around {reference} skipped {skipped} record(s) without a usable location"
        );
    }

    Ok(ProximityScan { matches, skipped })
}

/// Finds every record within `radius_m` meters of `reference`, nearest
/// first.
///
/// Records without a usable location are skipped silently; use
/// [`scan_nearby`] to learn how many were skipped.
///
/// # Errors
///
/// See [`validate_inputs`].
pub fn find_nearby<T: Geolocated>(
    reference: GeoPoint,
    radius_m: f64,
    records: &[T],
) -> Result<Vec<Nearby<'_, T>>, ProximityError> {
    scan_nearby(reference, radius_m, records).map(|scan| scan.matches)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use crime_watch_incident_models::Incident;

    use super::*;

    const REFERENCE: GeoPoint = GeoPoint::new(-8.283, -35.030);

    fn incident(latitude: Option<f64>, longitude: Option<f64>, street: &str) -> Incident {
        Incident {
            timestamp: NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            latitude,
            longitude,
            category: "Roubo".to_string(),
            street: street.to_string(),
            neighborhood: "Centro".to_string(),
            severity: None,
        }
    }

    fn at(latitude: f64, longitude: f64, street: &str) -> Incident {
        incident(Some(latitude), Some(longitude), street)
    }

    fn sample_points() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(-8.283, -35.030),
            GeoPoint::new(-8.246, -35.063),
            GeoPoint::new(-8.336, -34.944),
            GeoPoint::new(51.5074, -0.1278),
            GeoPoint::new(90.0, 0.0),
            GeoPoint::new(-90.0, 180.0),
            GeoPoint::new(0.0, -180.0),
        ]
    }

    #[test]
    fn distance_to_self_is_zero() {
        for point in sample_points() {
            let d = haversine_distance(point, point);
            assert!(d.abs() < 1e-9, "{point}: {d}");
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let points = sample_points();
        for a in &points {
            for b in &points {
                let ab = haversine_distance(*a, *b);
                let ba = haversine_distance(*b, *a);
                assert!((ab - ba).abs() < 1e-6, "{a} <-> {b}: {ab} vs {ba}");
            }
        }
    }

    #[test]
    fn antipodal_points_do_not_produce_nan() {
        let d = haversine_distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 180.0));
        assert!(!d.is_nan());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_M).abs() < 1.0);
    }

    #[test]
    fn one_degree_of_latitude_matches_sphere_arc() {
        let d = haversine_distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        let expected = EARTH_RADIUS_M * 1f64.to_radians();
        assert!((d - expected).abs() < 1e-6, "{d} vs {expected}");
    }

    #[test]
    fn coincident_incident_is_included_at_zero_distance() {
        let incidents = vec![at(-8.283, -35.030, "Rua A")];
        let result = find_nearby(REFERENCE, 1000.0, &incidents).unwrap();
        assert_eq!(result.len(), 1);
        assert!(result[0].distance_m.abs() < 1e-9);
    }

    #[test]
    fn boundary_incident_respects_radius_edge() {
        let incidents = vec![at(-8.292, -35.030, "Rua B")];
        let distance = haversine_distance(REFERENCE, GeoPoint::new(-8.292, -35.030));
        assert!((distance - 1000.75).abs() < 0.05, "distance {distance}");

        assert!(find_nearby(REFERENCE, 1000.0, &incidents).unwrap().is_empty());

        let included = find_nearby(REFERENCE, 1001.0, &incidents).unwrap();
        assert_eq!(included.len(), 1);
        assert!((included[0].distance_m - distance).abs() < f64::EPSILON);
    }

    #[test]
    fn radius_equal_to_distance_is_inclusive() {
        let incidents = vec![at(-8.292, -35.030, "Rua B")];
        let distance = haversine_distance(REFERENCE, GeoPoint::new(-8.292, -35.030));
        assert_eq!(find_nearby(REFERENCE, distance, &incidents).unwrap().len(), 1);
    }

    #[test]
    fn results_are_sorted_by_distance() {
        let incidents = vec![
            at(-8.290, -35.030, "far"),
            at(-8.283, -35.030, "here"),
            at(-8.285, -35.030, "near"),
            at(-8.400, -35.030, "outside"),
        ];
        let result = find_nearby(REFERENCE, 1500.0, &incidents).unwrap();
        let streets: Vec<&str> = result.iter().map(|n| n.item.street.as_str()).collect();
        assert_eq!(streets, vec!["here", "near", "far"]);
        assert!(
            result
                .windows(2)
                .all(|w| w[0].distance_m <= w[1].distance_m)
        );
    }

    #[test]
    fn result_is_exactly_the_subset_within_radius() {
        let incidents = vec![
            at(-8.283, -35.030, "a"),
            at(-8.300, -35.040, "b"),
            at(-8.250, -35.000, "c"),
            at(-8.283, -35.045, "d"),
            at(-8.350, -34.950, "e"),
        ];
        let radius = 2500.0;
        let result = find_nearby(REFERENCE, radius, &incidents).unwrap();

        let expected: Vec<&str> = incidents
            .iter()
            .filter(|i| haversine_distance(REFERENCE, i.location().unwrap()) <= radius)
            .map(|i| i.street.as_str())
            .collect();
        assert_eq!(result.len(), expected.len());
        for nearby in &result {
            assert!(expected.contains(&nearby.item.street.as_str()));
            let exact = haversine_distance(REFERENCE, nearby.item.location().unwrap());
            assert!((nearby.distance_m - exact).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn growing_the_radius_never_drops_matches() {
        let incidents: Vec<Incident> = (0..40)
            .map(|i| {
                let offset = f64::from(i) * 0.001;
                at(-8.283 - offset, -35.030 + offset / 2.0, &format!("r{i}"))
            })
            .collect();

        let mut previous: Vec<String> = Vec::new();
        for radius in [0.0, 100.0, 500.0, 1000.0, 2500.0, 5000.0, 10_000.0] {
            let current: Vec<String> = find_nearby(REFERENCE, radius, &incidents)
                .unwrap()
                .iter()
                .map(|n| n.item.street.clone())
                .collect();
            for street in &previous {
                assert!(current.contains(street), "{street} dropped at {radius} m");
            }
            previous = current;
        }
    }

    #[test]
    fn equidistant_incidents_both_appear() {
        let incidents = vec![
            at(-8.278, -35.030, "north"),
            at(-8.288, -35.030, "south"),
        ];
        let result = find_nearby(REFERENCE, 1000.0, &incidents).unwrap();
        assert_eq!(result.len(), 2);
        assert!((result[0].distance_m - result[1].distance_m).abs() < 1e-6);
    }

    #[test]
    fn tied_distances_keep_input_order() {
        let incidents = vec![
            at(-8.285, -35.030, "first"),
            at(-8.283, -35.030, "closest"),
            at(-8.285, -35.030, "second"),
        ];
        let result = find_nearby(REFERENCE, 1000.0, &incidents).unwrap();
        let streets: Vec<&str> = result.iter().map(|n| n.item.street.as_str()).collect();
        assert_eq!(streets, vec!["closest", "first", "second"]);
        assert!((result[1].distance_m - result[2].distance_m).abs() < f64::EPSILON);

        let reversed: Vec<Incident> = incidents.into_iter().rev().collect();
        let result = find_nearby(REFERENCE, 1000.0, &reversed).unwrap();
        let streets: Vec<&str> = result.iter().map(|n| n.item.street.as_str()).collect();
        assert_eq!(streets, vec!["closest", "second", "first"]);
    }

    #[test]
    fn empty_collection_yields_empty_result() {
        let incidents: Vec<Incident> = Vec::new();
        for radius in [0.0, 800.0, f64::INFINITY] {
            assert!(find_nearby(REFERENCE, radius, &incidents).unwrap().is_empty());
        }
    }

    #[test]
    fn zero_radius_only_matches_coincident_points() {
        let incidents = vec![at(-8.283, -35.030, "here"), at(-8.2831, -35.030, "close")];
        let result = find_nearby(REFERENCE, 0.0, &incidents).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].item.street, "here");
    }

    #[test]
    fn infinite_radius_matches_every_located_incident() {
        let incidents = vec![at(51.5, -0.12, "london"), at(-8.283, -35.030, "here")];
        assert_eq!(
            find_nearby(REFERENCE, f64::INFINITY, &incidents)
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn negative_radius_is_rejected() {
        let incidents = vec![at(-8.283, -35.030, "here")];
        assert_eq!(
            find_nearby(REFERENCE, -1.0, &incidents).unwrap_err(),
            ProximityError::InvalidRadius { radius_m: -1.0 }
        );
    }

    #[test]
    fn nan_radius_is_rejected() {
        let incidents: Vec<Incident> = Vec::new();
        assert!(matches!(
            find_nearby(REFERENCE, f64::NAN, &incidents),
            Err(ProximityError::InvalidRadius { .. })
        ));
    }

    #[test]
    fn nan_reference_latitude_is_rejected() {
        let incidents = vec![at(-8.283, -35.030, "here")];
        let reference = GeoPoint::new(f64::NAN, -35.030);
        assert!(matches!(
            find_nearby(reference, 1000.0, &incidents),
            Err(ProximityError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn infinite_reference_longitude_is_rejected() {
        let incidents: Vec<Incident> = Vec::new();
        let reference = GeoPoint::new(-8.283, f64::NEG_INFINITY);
        assert!(matches!(
            find_nearby(reference, 1000.0, &incidents),
            Err(ProximityError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn out_of_range_reference_is_accepted() {
        let incidents = vec![at(-8.283, -35.030, "here")];
        let result = find_nearby(GeoPoint::new(120.0, 400.0), 1000.0, &incidents);
        assert!(result.is_ok());
    }

    #[test]
    fn incidents_without_location_are_skipped_and_counted() {
        let incidents = vec![
            incident(None, Some(-35.030), "no lat"),
            at(-8.283, -35.030, "here"),
            incident(Some(f64::NAN), Some(-35.030), "nan"),
            incident(None, None, "nothing"),
        ];
        let scan = scan_nearby(REFERENCE, 1000.0, &incidents).unwrap();
        assert_eq!(scan.skipped, 3);
        assert_eq!(scan.matches.len(), 1);
        assert_eq!(scan.matches[0].item.street, "here");
    }

    #[test]
    fn repeated_calls_are_identical() {
        let incidents = vec![
            at(-8.284, -35.031, "a"),
            at(-8.286, -35.029, "b"),
            at(-8.283, -35.030, "c"),
        ];
        let first = find_nearby(REFERENCE, 1000.0, &incidents).unwrap();
        let second = find_nearby(REFERENCE, 1000.0, &incidents).unwrap();
        assert_eq!(first, second);
    }
}
