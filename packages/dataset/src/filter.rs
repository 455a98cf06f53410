//! Dashboard filter pipeline.
//!
//! Applies the operator controls to the loaded incidents in a fixed order:
//!
//! 1. newest first, keeping the first `limit` incidents (the *recent* set);
//! 2. categories offered to the operator come from the recent set;
//! 3. the *selection* keeps recent incidents from the last `period_days`
//!    days (counted from midnight of `today`);
//! 4. the selection is narrowed to the chosen categories, if any.
//!
//! All functions are pure; "today" is an argument rather than read from the
//! clock.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate, NaiveDateTime};
use crime_watch_config::{ConfigError, DashboardConfig};
use crime_watch_incident_models::Incident;

use crate::parsing::start_of_day;

/// Which categories the selection keeps.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategorySelection {
    /// The first `default_category_count` available categories.
    #[default]
    Default,
    /// No category filtering.
    All,
    /// Only these categories. An empty list filters nothing.
    Only(Vec<String>),
}

impl CategorySelection {
    /// Parses a request value: absent means [`Self::Default`], `*` means
    /// [`Self::All`], anything else is a comma-separated list.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None => Self::Default,
            Some("*") => Self::All,
            Some(list) => Self::Only(
                list.split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_owned)
                    .collect(),
            ),
        }
    }
}

/// Resolved operator controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewFilter {
    /// Size of the recent set.
    pub limit: usize,
    /// Look-back window in days.
    pub period_days: u32,
    /// Category selection.
    pub categories: CategorySelection,
    /// How many categories [`CategorySelection::Default`] picks.
    pub default_category_count: usize,
}

impl ViewFilter {
    /// Validates optional request values against the configured controls,
    /// filling in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `limit` is out of range or `period_days`
    /// is not a selectable period.
    pub fn resolve(
        config: &DashboardConfig,
        limit: Option<u32>,
        period_days: Option<u32>,
        categories: CategorySelection,
    ) -> Result<Self, ConfigError> {
        let limit = config
            .controls
            .incident_count
            .resolve("incident_count", limit)?;
        let period_days = config.periods.resolve(period_days)?;

        Ok(Self {
            limit: usize::try_from(limit).unwrap_or(usize::MAX),
            period_days,
            categories,
            default_category_count: config.default_category_count,
        })
    }
}

/// The filtered projection the dashboard displays.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView<'a> {
    /// Date the period is counted back from.
    pub today: NaiveDate,
    /// Look-back window in days.
    pub period_days: u32,
    /// Newest `limit` incidents, newest first.
    pub recent: Vec<&'a Incident>,
    /// Categories offered to the operator, sorted.
    pub available_categories: Vec<String>,
    /// Categories applied to the selection; `None` when not filtering.
    pub selected_categories: Option<Vec<String>>,
    /// Incidents shown on the map and used for alerts.
    pub selection: Vec<&'a Incident>,
}

/// Newest `limit` incidents, newest first.
///
/// The sort is stable: incidents with equal timestamps keep file order.
#[must_use]
pub fn recent_incidents(incidents: &[Incident], limit: usize) -> Vec<&Incident> {
    let mut sorted: Vec<&Incident> = incidents.iter().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted.truncate(limit);
    sorted
}

/// Sorted, de-duplicated categories of `incidents`.
#[must_use]
pub fn available_categories(incidents: &[&Incident]) -> Vec<String> {
    incidents
        .iter()
        .map(|i| i.category.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// Earliest timestamp inside a `days`-day window ending `today`.
#[must_use]
pub fn period_start(today: NaiveDate, days: u32) -> NaiveDateTime {
    let start = today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN);
    start_of_day(start)
}

/// Runs the full pipeline.
#[must_use]
pub fn apply<'a>(
    incidents: &'a [Incident],
    filter: &ViewFilter,
    today: NaiveDate,
) -> DashboardView<'a> {
    let recent = recent_incidents(incidents, filter.limit);
    let available = available_categories(&recent);

    let selected_categories = match &filter.categories {
        CategorySelection::Default => Some(
            available
                .iter()
                .take(filter.default_category_count)
                .cloned()
                .collect(),
        ),
        CategorySelection::All => None,
        CategorySelection::Only(list) if list.is_empty() => None,
        CategorySelection::Only(list) => Some(list.clone()),
    };

    let start = period_start(today, filter.period_days);
    let selection: Vec<&Incident> = recent
        .iter()
        .copied()
        .filter(|i| i.timestamp >= start)
        .filter(|i| {
            selected_categories
                .as_ref()
                .is_none_or(|cats| cats.iter().any(|c| *c == i.category))
        })
        .collect();

    log::debug!(
        "Filtered {} incidents to {} recent, {} selected (period {} days, categories {:?})",
        incidents.len(),
        recent.len(),
        selection.len(),
        filter.period_days,
        selected_categories
    );

    DashboardView {
        today,
        period_days: filter.period_days,
        recent,
        available_categories: available,
        selected_categories,
        selection,
    }
}
