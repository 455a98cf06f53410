#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory dashboard analytics.
//!
//! Every function takes a [`DashboardView`] produced by
//! [`crime_watch_dataset::filter::apply`] and returns one of the result
//! types from [`crime_watch_analytics_models`]. Nothing here reads the
//! clock or touches disk.

pub mod alerts;
pub mod layers;

use std::collections::BTreeMap;

use crime_watch_analytics_models::{
    Badges, DashboardSummary, Kpis, LegendCounts, RankingDimension, RankingEntry, Rankings,
};
use crime_watch_config::DashboardConfig;
use crime_watch_dataset::filter::{DashboardView, period_start};
use crime_watch_incident_models::Incident;

/// Rows kept per ranking table.
pub const RANKING_LIMIT: usize = 10;

/// Window of the "last 7 days" KPI.
pub const LAST_WEEK_DAYS: u32 = 7;

/// Placeholder shown when there is no top street.
pub const NO_TOP_STREET: &str = "-";

fn label(incident: &Incident, dimension: RankingDimension) -> &str {
    match dimension {
        RankingDimension::Street => &incident.street,
        RankingDimension::Category => &incident.category,
        RankingDimension::Neighborhood => &incident.neighborhood,
    }
}

/// Counts `incidents` by `dimension`, most frequent first.
///
/// Ties are ordered by label ascending. Empty labels are not counted.
#[must_use]
pub fn rank(incidents: &[&Incident], dimension: RankingDimension, limit: usize) -> Vec<RankingEntry> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for incident in incidents {
        let name = label(incident, dimension);
        if !name.is_empty() {
            *counts.entry(name).or_default() += 1;
        }
    }

    let mut entries: Vec<RankingEntry> = counts
        .into_iter()
        .map(|(label, count)| RankingEntry {
            label: label.to_string(),
            count,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(limit);
    entries
}

/// Top streets, categories and neighborhoods of the selection.
#[must_use]
pub fn rankings(view: &DashboardView<'_>) -> Rankings {
    Rankings {
        streets: rank(&view.selection, RankingDimension::Street, RANKING_LIMIT),
        categories: rank(&view.selection, RankingDimension::Category, RANKING_LIMIT),
        neighborhoods: rank(&view.selection, RankingDimension::Neighborhood, RANKING_LIMIT),
    }
}

/// Headline numbers for the view.
#[must_use]
pub fn kpis(view: &DashboardView<'_>) -> Kpis {
    let week_start = period_start(view.today, LAST_WEEK_DAYS);
    let last_7_days = view
        .recent
        .iter()
        .filter(|i| i.timestamp >= week_start)
        .count();

    let (top_street, top_street_count) = rank(&view.selection, RankingDimension::Street, 1)
        .into_iter()
        .next()
        .map_or_else(|| (NO_TOP_STREET.to_string(), 0), |e| (e.label, e.count));

    Kpis {
        total_incidents: view.selection.len(),
        last_7_days,
        top_street,
        top_street_count,
    }
}

/// Violent versus other incidents in the selection.
#[must_use]
pub fn legend_counts(view: &DashboardView<'_>, config: &DashboardConfig) -> LegendCounts {
    let violent = view
        .selection
        .iter()
        .filter(|i| config.is_violent(&i.category))
        .count();

    LegendCounts {
        violent,
        other: view.selection.len() - violent,
    }
}

/// Header badges. The radius is truncated to whole meters.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn badges(view: &DashboardView<'_>, alert_radius_m: f64) -> Badges {
    Badges {
        period_days: view.period_days,
        incidents_shown: view.selection.len(),
        alert_radius_m: alert_radius_m.max(0.0) as u32,
    }
}

/// KPIs, badges and legend in one call.
#[must_use]
pub fn summary(
    view: &DashboardView<'_>,
    config: &DashboardConfig,
    alert_radius_m: f64,
) -> DashboardSummary {
    DashboardSummary {
        kpis: kpis(view),
        badges: badges(view, alert_radius_m),
        legend: legend_counts(view, config),
    }
}
