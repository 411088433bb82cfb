//! NutriYess terminal client

use clap::Parser;
use color_eyre::Result;
use std::io::read_to_string;
use tracing::info;

use crate::config::{Config, LogFormat};
use crate::opt::Opt;
use crate::session::SessionStore;
use crate::store::CredentialStore;

mod api;
mod commands;
mod config;
mod gate;
mod model;
mod opt;
mod session;
mod store;

/// Initializes tracing collection
fn setup_tracing(config: config::Logging) {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let fmt_layer = match config.format {
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap();

    let filter_layer = config
        .filters
        .into_iter()
        .fold(filter_layer, |layer, filter| layer.add_directive(filter));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let Opt {
        config: config_file,
        command,
    } = Opt::parse();

    let config = match config_file {
        Some(mut config_file) => toml::from_str(&read_to_string(&mut config_file)?)?,
        None => Config::default(),
    };

    setup_tracing(config.logging.clone());
    color_eyre::install()?;

    let store = CredentialStore::with_config(&config.credentials).await?;
    let mut session = SessionStore::new(store, config.limits.clone());
    session.hydrate().await;

    info!(
        authenticated = session.is_authenticated(),
        "Session hydrated"
    );

    commands::run(command, &config, &mut session).await
}
