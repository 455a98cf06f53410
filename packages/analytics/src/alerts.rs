//! Proximity alert panel.

use crime_watch_analytics_models::{AlertPanel, AlertRow, AlertStatus};
use crime_watch_dataset::filter::DashboardView;
use crime_watch_incident_models::GeoPoint;
use crime_watch_proximity::{ProximityError, scan_nearby};

/// Rounds a distance to one decimal place for display.
#[must_use]
pub fn round_distance(distance_m: f64) -> f64 {
    (distance_m * 10.0).round() / 10.0
}

/// Builds the alert panel for the incidents of the selection within
/// `radius_m` meters of `reference`.
///
/// # Errors
///
/// Returns [`ProximityError`] if the reference point is non-finite or the
/// radius is negative.
pub fn alert_panel(
    view: &DashboardView<'_>,
    reference: GeoPoint,
    radius_m: f64,
) -> Result<AlertPanel, ProximityError> {
    let scan = scan_nearby(reference, radius_m, &view.selection)?;

    if scan.skipped > 0 {
        log::warn!(
            "{} incident(s) without coordinates were left out of the proximity alert",
            scan.skipped
        );
    }

    let rows: Vec<AlertRow> = scan
        .matches
        .iter()
        .map(|nearby| AlertRow {
            timestamp: nearby.item.timestamp,
            category: nearby.item.category.clone(),
            street: nearby.item.street.clone(),
            neighborhood: nearby.item.neighborhood.clone(),
            distance_m: round_distance(nearby.distance_m),
        })
        .collect();

    let (status, message) = if rows.is_empty() {
        (
            AlertStatus::Clear,
            format!("No incidents within {radius_m:.0} m of your position"),
        )
    } else {
        (
            AlertStatus::Warning,
            format!(
                "{} incident(s) within {radius_m:.0} m of your position",
                rows.len()
            ),
        )
    };

    log::debug!("Alert panel around {reference}: {status} ({} rows)", rows.len());

    Ok(AlertPanel {
        status,
        reference,
        radius_m,
        count: rows.len(),
        message,
        rows,
        skipped: scan.skipped,
    })
}
