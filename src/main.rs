// src/main.rs

//! The main entry point for the Convoy agent.

use anyhow::Result;
use convoy::config::Config;
use convoy::server;
use std::env;
use std::path::Path;
use tracing::error;
use tracing_subscriber::{filter::EnvFilter, prelude::*};

const DEFAULT_CONFIG_PATH: &str = "convoy.toml";

#[tokio::main]
async fn main() -> Result<()> {
    run_app().await
}

async fn run_app() -> Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let args: Vec<String> = env::args().collect();

    if args.contains(&"--version".to_string()) {
        println!("Convoy version {VERSION}");
        return Ok(());
    }

    // The config path can be given via --config; a missing default file
    // means the built-in defaults are used.
    let explicit_path = args
        .iter()
        .position(|arg| arg == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());
    let config_path = explicit_path.unwrap_or(DEFAULT_CONFIG_PATH);

    let mut config = if explicit_path.is_none() && !Path::new(config_path).exists() {
        Config::default()
    } else {
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Failed to load configuration from \"{config_path}\": {e:#}");
                std::process::exit(1);
            }
        }
    };

    if let Some(port_index) = args.iter().position(|arg| arg == "--port") {
        if let Some(port_str) = args.get(port_index + 1) {
            match port_str.parse::<u16>() {
                Ok(port) => config.http_port = port,
                Err(_) => {
                    eprintln!("Invalid port number: {port_str}");
                    std::process::exit(1);
                }
            }
        } else {
            eprintln!("--port flag requires a value");
            std::process::exit(1);
        }
    }

    // Role flags only ever enable a role on top of the file's settings.
    if args.iter().any(|arg| arg == "--server") {
        config.server.enabled = true;
    }
    if args.iter().any(|arg| arg == "--client") {
        config.client.enabled = true;
    }
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone());
    tracing_subscriber::registry()
        .with(EnvFilter::new(log_level))
        .with(
            tracing_subscriber::fmt::layer()
                .compact() // Use the compact, single-line format.
                .with_ansi(true),
        )
        .init();

    if let Err(e) = server::run(config).await {
        error!("Agent runtime error: {}", e);
        return Err(e);
    }

    Ok(())
}
