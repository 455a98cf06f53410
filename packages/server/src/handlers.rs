//! HTTP handler functions for the crime watch API.

use std::sync::Arc;

use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate};
use crime_watch_analytics::alerts::alert_panel;
use crime_watch_analytics::layers::{LayerOptions, map_layers};
use crime_watch_config::DashboardConfig;
use crime_watch_dataset::filter::{CategorySelection, DashboardView, ViewFilter, apply};
use crime_watch_incident_models::GeoPoint;
use crime_watch_proximity::coverage::{coverage_summary, stations_covering};
use crime_watch_proximity::validate_inputs;
use crime_watch_server_models::{
    ApiCategories, ApiConfig, ApiCoverage, ApiHealth, ApiIncident, ApiIncidents, ViewQueryParams,
};
use serde::Serialize;

use crate::{ApiError, AppState};

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/config`
///
/// Returns the slider bounds, defaults, periods and police stations.
pub async fn config(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiConfig::from(state.config.as_ref()))
}

/// `GET /api/categories`
///
/// Lists the categories present among the newest `limit` incidents.
pub async fn categories(
    state: web::Data<AppState>,
    params: web::Query<ViewQueryParams>,
) -> HttpResponse {
    let default_count = state.config.default_category_count;
    let result = with_view(&state, &params, |view| {
        Ok(ApiCategories {
            default_selection: view
                .available_categories
                .iter()
                .take(default_count)
                .cloned()
                .collect(),
            available: view.available_categories.clone(),
        })
    })
    .await;
    respond("categories", result)
}

/// `GET /api/incidents`
///
/// Returns the selected incidents, newest first.
pub async fn incidents(
    state: web::Data<AppState>,
    params: web::Query<ViewQueryParams>,
) -> HttpResponse {
    let result = with_view(&state, &params, |view| {
        Ok(ApiIncidents {
            period_days: view.period_days,
            categories: view.selected_categories.clone(),
            incidents: view.selection.iter().copied().map(ApiIncident::from).collect(),
        })
    })
    .await;
    respond("incidents", result)
}

/// `GET /api/summary`
///
/// Returns KPIs, header badges and legend counts.
pub async fn summary(
    state: web::Data<AppState>,
    params: web::Query<ViewQueryParams>,
) -> HttpResponse {
    let result = async {
        let radius_m = alert_radius(&state.config, &params)?;
        with_view(&state, &params, |view| {
            Ok(crime_watch_analytics::summary(view, &state.config, radius_m))
        })
        .await
    }
    .await;
    respond("summary", result)
}

/// `GET /api/rankings`
///
/// Returns the top streets, categories and neighborhoods.
pub async fn rankings(
    state: web::Data<AppState>,
    params: web::Query<ViewQueryParams>,
) -> HttpResponse {
    let result = with_view(&state, &params, |view| {
        Ok(crime_watch_analytics::rankings(view))
    })
    .await;
    respond("rankings", result)
}

/// `GET /api/alerts`
///
/// Returns the incidents within the alert radius of the reference point.
pub async fn alerts(
    state: web::Data<AppState>,
    params: web::Query<ViewQueryParams>,
) -> HttpResponse {
    let reference = reference_point(&state.config, &params);
    let result = async {
        let radius_m = alert_radius(&state.config, &params)?;
        validate_inputs(reference, radius_m)?;
        with_view(&state, &params, |view| {
            Ok(alert_panel(view, reference, radius_m)?)
        })
        .await
    }
    .await;
    respond("alerts", result)
}

/// `GET /api/coverage`
///
/// Returns per-station incident counts and the stations covering the
/// reference point.
pub async fn coverage(
    state: web::Data<AppState>,
    params: web::Query<ViewQueryParams>,
) -> HttpResponse {
    let reference = reference_point(&state.config, &params);
    let result = async {
        let radius_m = patrol_radius(&state.config, &params)?;
        let covering_reference = stations_covering(reference, &state.config.stations, radius_m)?;
        with_view(&state, &params, |view| {
            Ok(ApiCoverage {
                reference,
                covering_reference,
                summary: coverage_summary(&state.config.stations, &view.selection, radius_m)?,
            })
        })
        .await
    }
    .await;
    respond("coverage", result)
}

/// `GET /api/layers`
///
/// Returns the heat, pin, coverage and reference layers.
pub async fn layers(
    state: web::Data<AppState>,
    params: web::Query<ViewQueryParams>,
) -> HttpResponse {
    let result = async {
        let options = layer_options(&state.config, &params)?;
        with_view(&state, &params, |view| {
            Ok(map_layers(view, &state.config, &options))
        })
        .await
    }
    .await;
    respond("layers", result)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Resolves the filter controls, loads the dataset and runs `f` over the
/// filtered view.
///
/// Controls are validated before the dataset is touched, so a bad request
/// is rejected even when the dataset is unavailable. An expired cache is
/// reloaded on the blocking thread pool, off the worker's event loop.
#[allow(clippy::future_not_send)]
async fn with_view<T>(
    state: &AppState,
    params: &ViewQueryParams,
    f: impl FnOnce(&DashboardView<'_>) -> Result<T, ApiError>,
) -> Result<T, ApiError> {
    let filter = ViewFilter::resolve(
        &state.config,
        params.limit,
        params.period_days,
        CategorySelection::parse(params.categories.as_deref()),
    )?;
    let cache = Arc::clone(&state.cache);
    let dataset = web::block(move || cache.get()).await??;
    let view = apply(&dataset.incidents, &filter, today());
    f(&view)
}

/// The requested reference point. A missing coordinate falls back to the
/// configured default for that coordinate only.
fn reference_point(config: &DashboardConfig, params: &ViewQueryParams) -> GeoPoint {
    GeoPoint::new(
        params.lat.unwrap_or(config.reference.latitude),
        params.lon.unwrap_or(config.reference.longitude),
    )
}

fn alert_radius(config: &DashboardConfig, params: &ViewQueryParams) -> Result<f64, ApiError> {
    Ok(config
        .controls
        .alert_radius_m
        .resolve("alert_radius_m", params.radius)?)
}

fn patrol_radius(config: &DashboardConfig, params: &ViewQueryParams) -> Result<f64, ApiError> {
    Ok(config
        .controls
        .patrol_radius_m
        .resolve("patrol_radius_m", params.patrol_radius)?)
}

fn layer_options(
    config: &DashboardConfig,
    params: &ViewQueryParams,
) -> Result<LayerOptions, ApiError> {
    let mut options = LayerOptions::from_config(config);
    options.reference = reference_point(config, params);
    options.alert_radius_m = alert_radius(config, params)?;
    options.patrol_radius_m = patrol_radius(config, params)?;
    if let Some(show) = params.show_alert_circle {
        options.layers.alert_circle = show;
    }
    if let Some(show) = params.show_coverage {
        options.layers.coverage = show;
    }
    validate_inputs(options.reference, options.alert_radius_m)?;
    Ok(options)
}

/// Maps a handler result to a JSON response: rejected controls become
/// `400`, dataset failures `500`.
fn respond<T: Serialize>(endpoint: &str, result: Result<T, ApiError>) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e @ (ApiError::Config(_) | ApiError::Proximity(_))) => {
            log::debug!("Rejected {endpoint} request: {e}");
            HttpResponse::BadRequest().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
        Err(e @ (ApiError::Dataset(_) | ApiError::Blocking(_))) => {
            log::error!("Failed to load incidents for {endpoint}: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to load incident dataset"
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use chrono::Days;

    use super::*;

    const HEADER: &str = "data,tipo_crime,rua,bairro,latitude,longitude,severidade\n";

    fn days_ago(days: u64) -> String {
        today()
            .checked_sub_days(Days::new(days))
            .unwrap()
            .format("%Y-%m-%d 00:00:00")
            .to_string()
    }

    fn sample_csv() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(HEADER.as_bytes()).unwrap();
        let rows = [
            format!("{},Roubo,Rua A,Centro,-8.283,-35.030,4", days_ago(0)),
            format!("{},Furto,Rua B,Centro,-8.292,-35.030,2", days_ago(1)),
            format!("{},Assalto,Rua A,Gaibu,-8.336,-34.944,5", days_ago(2)),
            format!("{},Furto,Rua C,Suape,,,1", days_ago(3)),
            format!("{},Roubo,Rua D,Suape,-8.351,-34.956,3", days_ago(120)),
        ];
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn state_for(path: &std::path::Path) -> web::Data<AppState> {
        let mut config = DashboardConfig::embedded();
        config.data_path = path.to_path_buf();
        web::Data::new(AppState::new(config))
    }

    async fn get_json(state: web::Data<AppState>, uri: &str) -> (StatusCode, serde_json::Value) {
        let app = test::init_service(App::new().app_data(state).configure(crate::configure)).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = resp.status();
        let body: serde_json::Value = test::read_body_json(resp).await;
        (status, body)
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let file = sample_csv();
        let (status, body) = get_json(state_for(file.path()), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["healthy"], true);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn config_lists_stations_and_periods() {
        let file = sample_csv();
        let (status, body) = get_json(state_for(file.path()), "/api/config").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stations"].as_array().unwrap().len(), 4);
        assert_eq!(body["periods"], serde_json::json!([7, 15, 30, 60, 90, 180]));
    }

    #[actix_web::test]
    async fn categories_come_from_recent_set() {
        let file = sample_csv();
        let (status, body) = get_json(state_for(file.path()), "/api/categories").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["available"], serde_json::json!(["Assalto", "Furto", "Roubo"]));
        assert_eq!(body["defaultSelection"], body["available"]);
    }

    #[actix_web::test]
    async fn incidents_respect_period_and_categories() {
        let file = sample_csv();
        let (status, body) =
            get_json(state_for(file.path()), "/api/incidents?periodDays=7&categories=Furto").await;
        assert_eq!(status, StatusCode::OK);
        let incidents = body["incidents"].as_array().unwrap();
        assert_eq!(incidents.len(), 2);
        assert!(incidents.iter().all(|i| i["category"] == "Furto"));
    }

    #[actix_web::test]
    async fn alerts_list_nearest_incidents() {
        let file = sample_csv();
        let (status, body) =
            get_json(state_for(file.path()), "/api/alerts?radius=1050&categories=*").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "WARNING");
        assert_eq!(body["count"], 2);
        assert_eq!(body["skipped"], 1);
        assert_eq!(body["rows"][0]["street"], "Rua A");
        assert_eq!(body["rows"][0]["distanceM"], 0.0);
        assert_eq!(body["rows"][1]["distanceM"], 1000.8);
    }

    #[actix_web::test]
    async fn alerts_clear_away_from_incidents() {
        let file = sample_csv();
        let (status, body) = get_json(
            state_for(file.path()),
            "/api/alerts?lat=-8.2&lon=-35.2&radius=100&categories=*",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "CLEAR");
        assert_eq!(body["count"], 0);
    }

    #[actix_web::test]
    async fn out_of_range_controls_are_bad_requests() {
        let file = sample_csv();
        for uri in [
            "/api/alerts?radius=5",
            "/api/incidents?limit=10",
            "/api/summary?periodDays=3",
            "/api/coverage?patrolRadius=100000",
            "/api/alerts?lat=NaN",
        ] {
            let (status, body) = get_json(state_for(file.path()), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(body["error"].is_string(), "{uri}");
        }
    }

    #[actix_web::test]
    async fn missing_dataset_is_a_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(&dir.path().join("missing.csv"));
        let (status, body) = get_json(state, "/api/summary").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to load incident dataset");
    }

    #[actix_web::test]
    async fn expired_cache_reloads_between_requests() {
        let mut file = sample_csv();
        let mut config = DashboardConfig::embedded();
        config.data_path = file.path().to_path_buf();
        config.cache_ttl_secs = 0;
        let state = web::Data::new(AppState::new(config));

        let (_, before) = get_json(state.clone(), "/api/incidents?categories=*").await;
        assert_eq!(before["incidents"].as_array().unwrap().len(), 4);

        writeln!(file, "{},Furto,Rua E,Centro,-8.284,-35.031,2", days_ago(0)).unwrap();
        file.flush().unwrap();

        let (status, after) = get_json(state, "/api/incidents?categories=*").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(after["incidents"].as_array().unwrap().len(), 5);
    }

    #[actix_web::test]
    async fn summary_and_rankings_cover_selection() {
        let file = sample_csv();
        let state = state_for(file.path());

        let (_, summary) = get_json(state.clone(), "/api/summary?categories=*&radius=900").await;
        assert_eq!(summary["kpis"]["totalIncidents"], 4);
        assert_eq!(summary["kpis"]["topStreet"], "Rua A");
        assert_eq!(summary["badges"]["alertRadiusM"], 900);
        assert_eq!(summary["legend"]["violent"], 2);

        let (_, rankings) = get_json(state, "/api/rankings?categories=*").await;
        assert_eq!(rankings["categories"][0]["label"], "Furto");
        assert_eq!(rankings["categories"][0]["count"], 2);
    }

    #[actix_web::test]
    async fn coverage_counts_incidents_per_station() {
        let file = sample_csv();
        let (status, body) = get_json(
            state_for(file.path()),
            "/api/coverage?categories=*&patrolRadius=1500",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["coveringReference"][0]["name"], "Batalhão Centro");
        assert_eq!(body["summary"]["skipped"], 1);
        assert_eq!(body["summary"]["stations"].as_array().unwrap().len(), 4);
    }

    #[actix_web::test]
    async fn layers_honor_toggles() {
        let file = sample_csv();
        let (status, body) = get_json(
            state_for(file.path()),
            "/api/layers?categories=*&showCoverage=false",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["coverage"].as_array().unwrap().len(), 0);
        assert_eq!(body["stations"].as_array().unwrap().len(), 0);
        assert!(body["alertCircle"].is_object());
        assert_eq!(body["pins"].as_array().unwrap().len(), 3);
        assert_eq!(body["heat"].as_array().unwrap().len(), 3);
    }
}
