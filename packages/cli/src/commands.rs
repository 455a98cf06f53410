//! Subcommand implementations.
//!
//! Each command builds the dashboard view from the loaded dataset and
//! renders the result either as a plain-text table or as pretty JSON.

use std::fmt::{self, Write};

use chrono::Local;
use crime_watch_analytics::alerts::alert_panel;
use crime_watch_analytics_models::{AlertPanel, DashboardSummary, RankingDimension, RankingEntry};
use crime_watch_config::DashboardConfig;
use crime_watch_dataset::filter::{CategorySelection, DashboardView, ViewFilter, apply};
use crime_watch_dataset::{Dataset, load_csv};
use crime_watch_incident_models::GeoPoint;
use crime_watch_proximity::coverage::{coverage_summary, stations_covering};
use crime_watch_server_models::ApiCoverage;
use serde::Serialize;

use crate::{ReferenceArgs, ViewArgs};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Loads the configured incident CSV.
pub fn load(config: &DashboardConfig) -> CliResult<Dataset> {
    let dataset = load_csv(&config.data_path)?;
    if dataset.skipped_rows > 0 {
        log::warn!(
            "{} row(s) of {} had no usable timestamp and were ignored",
            dataset.skipped_rows,
            config.data_path.display()
        );
    }
    Ok(dataset)
}

/// Applies the view controls to `dataset`.
pub fn build_view<'a>(
    config: &DashboardConfig,
    dataset: &'a Dataset,
    args: &ViewArgs,
) -> CliResult<DashboardView<'a>> {
    let filter = ViewFilter::resolve(
        config,
        args.limit,
        args.period_days,
        CategorySelection::parse(args.categories.as_deref()),
    )?;
    Ok(apply(&dataset.incidents, &filter, Local::now().date_naive()))
}

/// The requested reference point, defaulting each missing coordinate.
pub fn reference_point(config: &DashboardConfig, args: ReferenceArgs) -> GeoPoint {
    GeoPoint::new(
        args.lat.unwrap_or(config.reference.latitude),
        args.lon.unwrap_or(config.reference.longitude),
    )
}

fn to_json<T: Serialize>(value: &T) -> CliResult<String> {
    Ok(format!("{}\n", serde_json::to_string_pretty(value)?))
}

/// Runs a plain-text renderer into a fresh string.
fn rendered(render: impl FnOnce(&mut String) -> fmt::Result) -> CliResult<String> {
    let mut out = String::new();
    render(&mut out)?;
    Ok(out)
}

/// `alerts`: incidents within the alert radius, nearest first.
pub fn alerts(
    config: &DashboardConfig,
    dataset: &Dataset,
    args: &ViewArgs,
    reference: ReferenceArgs,
    radius_m: Option<f64>,
    json: bool,
) -> CliResult<String> {
    let radius_m = config.controls.alert_radius_m.resolve("alert_radius_m", radius_m)?;
    let view = build_view(config, dataset, args)?;
    let panel = alert_panel(&view, reference_point(config, reference), radius_m)?;

    if json {
        to_json(&panel)
    } else {
        rendered(|out| render_alerts(out, &panel))
    }
}

/// `summary`: KPIs, badges and legend counts.
pub fn summary(
    config: &DashboardConfig,
    dataset: &Dataset,
    args: &ViewArgs,
    radius_m: Option<f64>,
    json: bool,
) -> CliResult<String> {
    let radius_m = config.controls.alert_radius_m.resolve("alert_radius_m", radius_m)?;
    let view = build_view(config, dataset, args)?;
    let summary = crime_watch_analytics::summary(&view, config, radius_m);

    if json {
        to_json(&summary)
    } else {
        rendered(|out| render_summary(out, &summary))
    }
}

/// `rankings`: top streets, categories and neighborhoods.
pub fn rankings(
    config: &DashboardConfig,
    dataset: &Dataset,
    args: &ViewArgs,
    by: Option<RankingDimension>,
    json: bool,
) -> CliResult<String> {
    let view = build_view(config, dataset, args)?;
    let rankings = crime_watch_analytics::rankings(&view);

    let tables: Vec<(RankingDimension, &[RankingEntry])> = RankingDimension::all()
        .iter()
        .filter(|d| by.is_none_or(|b| b == **d))
        .map(|d| {
            let entries = match d {
                RankingDimension::Street => rankings.streets.as_slice(),
                RankingDimension::Category => rankings.categories.as_slice(),
                RankingDimension::Neighborhood => rankings.neighborhoods.as_slice(),
            };
            (*d, entries)
        })
        .collect();

    if json {
        if by.is_some() {
            return to_json(&tables.first().map(|(_, entries)| entries));
        }
        return to_json(&rankings);
    }

    rendered(|out| {
        for (dimension, entries) in tables {
            render_ranking(out, dimension, entries)?;
            writeln!(out)?;
        }
        Ok(())
    })
}

/// `categories`: categories present among the newest incidents.
pub fn categories(
    config: &DashboardConfig,
    dataset: &Dataset,
    args: &ViewArgs,
    json: bool,
) -> CliResult<String> {
    let view = build_view(config, dataset, args)?;

    if json {
        return to_json(&view.available_categories);
    }

    rendered(|out| {
        for (i, category) in view.available_categories.iter().enumerate() {
            let marker = if i < config.default_category_count {
                "*"
            } else {
                " "
            };
            writeln!(out, "{marker} {category}")?;
        }
        writeln!(
            out,
            "\n{} categories (* = selected by default)",
            view.available_categories.len()
        )?;
        Ok(())
    })
}

/// `coverage`: per-station incident counts and the stations covering the
/// reference point.
pub fn coverage(
    config: &DashboardConfig,
    dataset: &Dataset,
    args: &ViewArgs,
    reference: ReferenceArgs,
    patrol_radius_m: Option<f64>,
    json: bool,
) -> CliResult<String> {
    let radius_m = config
        .controls
        .patrol_radius_m
        .resolve("patrol_radius_m", patrol_radius_m)?;
    let reference = reference_point(config, reference);
    let view = build_view(config, dataset, args)?;

    let report = ApiCoverage {
        reference,
        covering_reference: stations_covering(reference, &config.stations, radius_m)?,
        summary: coverage_summary(&config.stations, &view.selection, radius_m)?,
    };

    if json {
        to_json(&report)
    } else {
        rendered(|out| render_coverage(out, &report))
    }
}

/// Plain-text alert panel.
pub fn render_alerts(out: &mut impl Write, panel: &AlertPanel) -> fmt::Result {
    writeln!(out, "{}: {}", panel.status, panel.message)?;
    writeln!(out, "Reference: {}", panel.reference)?;

    if !panel.rows.is_empty() {
        writeln!(
            out,
            "\n{:>12}  {:<19}  {:<14}  {:<28}  NEIGHBORHOOD",
            "DISTANCE (m)", "WHEN", "CATEGORY", "STREET"
        )?;
        writeln!(out, "{}", "-".repeat(100))?;
        for row in &panel.rows {
            writeln!(
                out,
                "{:>12.1}  {:<19}  {:<14}  {:<28}  {}",
                row.distance_m,
                row.timestamp.format("%Y-%m-%d %H:%M:%S"),
                row.category,
                row.street,
                row.neighborhood
            )?;
        }
    }

    if panel.skipped > 0 {
        writeln!(
            out,
            "\n{} incident(s) without coordinates not checked",
            panel.skipped
        )?;
    }
    Ok(())
}

/// Plain-text KPIs and badges.
pub fn render_summary(out: &mut impl Write, summary: &DashboardSummary) -> fmt::Result {
    let kpis = &summary.kpis;
    let badges = &summary.badges;
    writeln!(out, "Incidents:      {}", kpis.total_incidents)?;
    writeln!(out, "Last 7 days:    {}", kpis.last_7_days)?;
    writeln!(
        out,
        "Top street:     {} ({})",
        kpis.top_street, kpis.top_street_count
    )?;
    writeln!(
        out,
        "Violent/other:  {}/{}",
        summary.legend.violent, summary.legend.other
    )?;
    writeln!(
        out,
        "\nPeriod: {} days | Shown: {} | Alert radius: {} m",
        badges.period_days, badges.incidents_shown, badges.alert_radius_m
    )?;
    Ok(())
}

/// Plain-text ranking table.
pub fn render_ranking(
    out: &mut impl Write,
    dimension: RankingDimension,
    entries: &[RankingEntry],
) -> fmt::Result {
    writeln!(out, "Top {dimension}")?;
    writeln!(out, "{}", "-".repeat(40))?;
    if entries.is_empty() {
        writeln!(out, "(no incidents)")?;
    }
    for (i, entry) in entries.iter().enumerate() {
        writeln!(out, "{:>2}. {:<30} {:>5}", i + 1, entry.label, entry.count)?;
    }
    Ok(())
}

fn render_coverage(out: &mut impl Write, report: &ApiCoverage) -> fmt::Result {
    let summary = &report.summary;
    writeln!(out, "Patrol radius: {:.0} m", summary.patrol_radius_m)?;
    writeln!(out, "\n{:<28} {:>9}", "STATION", "INCIDENTS")?;
    writeln!(out, "{}", "-".repeat(38))?;
    for station in &summary.stations {
        writeln!(out, "{:<28} {:>9}", station.name, station.incidents)?;
    }
    writeln!(out, "{:<28} {:>9}", "(uncovered)", summary.uncovered)?;

    if report.covering_reference.is_empty() {
        writeln!(out, "\nNo station covers {}", report.reference)?;
    } else {
        writeln!(out, "\nCovering {}:", report.reference)?;
        for station in &report.covering_reference {
            writeln!(out, "  {} ({:.0} m)", station.name, station.distance_m)?;
        }
    }
    Ok(())
}
