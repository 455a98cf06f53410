#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the crime watch dashboard.
//!
//! Reads `BIND_ADDR`, `PORT`, `CRIME_WATCH_CONFIG` and `CRIME_WATCH_DATA`
//! from the environment.

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    crime_watch_server::run_server().await
}
