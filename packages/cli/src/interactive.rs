//! Interactive mode.
//!
//! Presents a `dialoguer` menu of the subcommands and prompts for their
//! controls, pre-filled with the configured defaults.

use crime_watch_analytics_models::RankingDimension;
use crime_watch_config::DashboardConfig;
use dialoguer::{Input, Select};

use crate::commands::{self, CliResult};
use crate::{ReferenceArgs, ViewArgs};

/// Top-level actions in the interactive menu.
enum Action {
    Alerts,
    Summary,
    Rankings,
    Categories,
    Coverage,
    Serve,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Alerts,
        Self::Summary,
        Self::Rankings,
        Self::Categories,
        Self::Coverage,
        Self::Serve,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Alerts => "Check proximity alerts",
            Self::Summary => "Show dashboard summary",
            Self::Rankings => "Show rankings",
            Self::Categories => "List categories",
            Self::Coverage => "Show police coverage",
            Self::Serve => "Start API server",
        }
    }
}

/// Runs the interactive menu.
///
/// # Errors
///
/// Returns an error if a prompt fails, the dataset cannot be loaded, or a
/// control value is rejected.
pub async fn run(config: DashboardConfig) -> CliResult {
    println!("Crime Watch");
    println!("Dataset: {}", config.data_path.display());
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    let action = &Action::ALL[idx];
    if matches!(action, Action::Serve) {
        return crate::serve(config, true).await;
    }

    let dataset = commands::load(&config)?;
    let view = prompt_view(&config)?;

    let output = match action {
        Action::Alerts => {
            let reference = prompt_reference(&config)?;
            let radius: f64 = Input::new()
                .with_prompt("Alert radius (m)")
                .default(config.controls.alert_radius_m.default)
                .interact_text()?;
            commands::alerts(&config, &dataset, &view, reference, Some(radius), false)?
        }
        Action::Summary => commands::summary(&config, &dataset, &view, None, false)?,
        Action::Rankings => {
            let dimensions = RankingDimension::all();
            let labels: Vec<String> = dimensions.iter().map(ToString::to_string).collect();
            let idx = Select::new()
                .with_prompt("Rank by")
                .items(&labels)
                .default(0)
                .interact()?;
            commands::rankings(&config, &dataset, &view, Some(dimensions[idx]), false)?
        }
        Action::Categories => commands::categories(&config, &dataset, &view, false)?,
        Action::Coverage => {
            let reference = prompt_reference(&config)?;
            let radius: f64 = Input::new()
                .with_prompt("Patrol radius (m)")
                .default(config.controls.patrol_radius_m.default)
                .interact_text()?;
            commands::coverage(&config, &dataset, &view, reference, Some(radius), false)?
        }
        Action::Serve => String::new(),
    };

    println!();
    print!("{output}");
    Ok(())
}

/// Prompts for the incident count, period and categories.
fn prompt_view(config: &DashboardConfig) -> CliResult<ViewArgs> {
    let limit: u32 = Input::new()
        .with_prompt(format!(
            "Newest incidents to consider ({}-{})",
            config.controls.incident_count.min, config.controls.incident_count.max
        ))
        .default(config.controls.incident_count.default)
        .interact_text()?;

    let options = &config.periods.options;
    let labels: Vec<String> = options.iter().map(|d| format!("{d} days")).collect();
    let default_idx = options
        .iter()
        .position(|d| *d == config.periods.default)
        .unwrap_or(0);
    let period_idx = Select::new()
        .with_prompt("Period")
        .items(&labels)
        .default(default_idx)
        .interact()?;

    let categories: String = Input::new()
        .with_prompt("Categories (comma-separated, * for all, blank for default)")
        .allow_empty(true)
        .interact_text()?;

    Ok(ViewArgs {
        limit: Some(limit),
        period_days: options.get(period_idx).copied(),
        categories: Some(categories).filter(|c| !c.trim().is_empty()),
    })
}

/// Prompts for the reference point.
fn prompt_reference(config: &DashboardConfig) -> CliResult<ReferenceArgs> {
    let lat: f64 = Input::new()
        .with_prompt("Latitude")
        .default(config.reference.latitude)
        .interact_text()?;
    let lon: f64 = Input::new()
        .with_prompt("Longitude")
        .default(config.reference.longitude)
        .interact_text()?;

    Ok(ReferenceArgs {
        lat: Some(lat),
        lon: Some(lon),
    })
}
