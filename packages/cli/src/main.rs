#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the crime watch dashboard.
//!
//! ```text
//! crime_watch alerts [--lat -8.283 --lon -35.030 --radius 800]
//! crime_watch summary [--period-days 30 --categories Roubo,Furto]
//! crime_watch rankings [--by street]
//! crime_watch categories [--limit 600]
//! crime_watch coverage [--patrol-radius 1500]
//! crime_watch serve
//! ```
//!
//! Running `crime_watch` with no subcommand enters interactive mode.
//! `--data` overrides the incident CSV path for every subcommand.

mod commands;
mod interactive;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use crime_watch_analytics_models::RankingDimension;
use crime_watch_config::DashboardConfig;

#[derive(Parser)]
#[command(
    name = "crime_watch",
    about = "Proximity alerts and analytics over a crime incident dataset"
)]
struct Cli {
    /// Incident CSV to read instead of the configured one
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List incidents near a reference point, nearest first
    Alerts {
        #[command(flatten)]
        view: ViewArgs,
        #[command(flatten)]
        reference: ReferenceArgs,
        /// Alert radius in meters
        #[arg(long)]
        radius: Option<f64>,
    },
    /// Show KPIs, badges and legend counts
    Summary {
        #[command(flatten)]
        view: ViewArgs,
        /// Alert radius in meters (shown in the badges)
        #[arg(long)]
        radius: Option<f64>,
    },
    /// Show the top streets, categories and neighborhoods
    Rankings {
        #[command(flatten)]
        view: ViewArgs,
        /// Only show one ranking (street, category or neighborhood)
        #[arg(long, value_parser = parse_dimension)]
        by: Option<RankingDimension>,
    },
    /// List the categories present among the newest incidents
    Categories {
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Show police patrol coverage
    Coverage {
        #[command(flatten)]
        view: ViewArgs,
        #[command(flatten)]
        reference: ReferenceArgs,
        /// Patrol radius in meters
        #[arg(long)]
        patrol_radius: Option<f64>,
    },
    /// Start the JSON API server
    Serve,
}

/// Dashboard filter controls.
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Number of newest incidents to consider
    #[arg(long)]
    pub limit: Option<u32>,
    /// Look-back window in days
    #[arg(long)]
    pub period_days: Option<u32>,
    /// Comma-separated categories, or `*` for all
    #[arg(long)]
    pub categories: Option<String>,
}

/// Operator position.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct ReferenceArgs {
    /// Reference latitude
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,
    /// Reference longitude
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let mut config = DashboardConfig::load()?;
    if let Some(data) = cli.data {
        config.data_path = data;
    }

    let Some(command) = cli.command else {
        return interactive::run(config).await;
    };

    let output = match command {
        Commands::Serve => return serve(config, false).await,
        Commands::Alerts {
            view,
            reference,
            radius,
        } => {
            let dataset = commands::load(&config)?;
            commands::alerts(&config, &dataset, &view, reference, radius, cli.json)?
        }
        Commands::Summary { view, radius } => {
            let dataset = commands::load(&config)?;
            commands::summary(&config, &dataset, &view, radius, cli.json)?
        }
        Commands::Rankings { view, by } => {
            let dataset = commands::load(&config)?;
            commands::rankings(&config, &dataset, &view, by, cli.json)?
        }
        Commands::Categories { view } => {
            let dataset = commands::load(&config)?;
            commands::categories(&config, &dataset, &view, cli.json)?
        }
        Commands::Coverage {
            view,
            reference,
            patrol_radius,
        } => {
            let dataset = commands::load(&config)?;
            commands::coverage(&config, &dataset, &view, reference, patrol_radius, cli.json)?
        }
    };

    print!("{output}");
    Ok(())
}

/// Parses a `--by` value into a [`RankingDimension`].
fn parse_dimension(value: &str) -> Result<RankingDimension, String> {
    value.parse().map_err(|_| {
        let options: Vec<String> = RankingDimension::all()
            .iter()
            .map(ToString::to_string)
            .collect();
        format!("expected one of {}", options.join(", "))
    })
}

/// Runs the API server on its own actix system.
async fn serve(config: DashboardConfig, prompt: bool) -> Result<(), Box<dyn std::error::Error>> {
    // The server uses actix-web's runtime, so we need to run it
    // in a blocking task to avoid nesting tokio runtimes.
    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(async move {
            if prompt {
                crime_watch_server::interactive::run(config).await
            } else {
                crime_watch_server::serve(config).await
            }
        })
    })
    .await??;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_negative_reference_coordinates() {
        let cli = Cli::try_parse_from([
            "crime_watch",
            "alerts",
            "--lat",
            "-8.283",
            "--lon",
            "-35.030",
            "--radius",
            "800",
        ])
        .unwrap();

        let Some(Commands::Alerts {
            reference, radius, ..
        }) = cli.command
        else {
            panic!("expected alerts subcommand");
        };
        assert_eq!(reference.lat, Some(-8.283));
        assert_eq!(reference.lon, Some(-35.030));
        assert_eq!(radius, Some(800.0));
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "crime_watch",
            "rankings",
            "--by",
            "neighborhood",
            "--data",
            "other.csv",
            "--json",
        ])
        .unwrap();

        assert!(cli.json);
        assert_eq!(cli.data, Some(PathBuf::from("other.csv")));
        assert!(matches!(
            cli.command,
            Some(Commands::Rankings {
                by: Some(RankingDimension::Neighborhood),
                ..
            })
        ));
    }

    #[test]
    fn no_subcommand_is_interactive() {
        let cli = Cli::try_parse_from(["crime_watch"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn rejects_unknown_ranking_dimension() {
        assert!(Cli::try_parse_from(["crime_watch", "rankings", "--by", "city"]).is_err());
    }

    #[test]
    fn dimension_parser_lists_options_on_error() {
        assert_eq!(parse_dimension("street"), Ok(RankingDimension::Street));
        assert_eq!(
            parse_dimension("city"),
            Err("expected one of street, category, neighborhood".to_string())
        );
    }
}
