#![allow(non_snake_case)]

mod cli;
mod clients;
mod config;
mod error;
mod handlers;
mod models;
mod runtime;
mod service;

use std::env;

use crate::config::{AppConfig, VenueConfig};

const DEFAULT_RUN_MODE: &str = "cli";

#[tokio::main]
async fn main() {
    let config = match env::var("CONFIG_FILE") {
        Ok(path) => AppConfig::from_file(&path).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    };

    let get_prop = |key: &str| -> Option<String> {
        config.get(key).or_else(|| env::var(key).ok())
    };

    let venue_config = match VenueConfig::from_settings(&get_prop) {
        Ok(venue_config) => venue_config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let run_mode = get_prop("RUN_MODE").unwrap_or(DEFAULT_RUN_MODE.to_string());
    if run_mode == "api" {
        let discord_client_secret = get_prop("DISCORD_CLIENT_SECRET")
            .expect("DISCORD_CLIENT_SECRET must be set for bot mode");
        runtime::run_api(venue_config, discord_client_secret).await;
    } else if run_mode == "cli" {
        cli::cli(venue_config).await;
    } else {
        println!("Invalid run mode {}", run_mode);
    }
}
