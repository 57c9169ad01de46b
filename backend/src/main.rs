//! Backend entry point: loads settings, wires adapters and serves the API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use eggcounter::inbound::http::health::HealthState;
use eggcounter::inbound::http::session_config::{BuildMode, cookie_policy_from_env};
use server::{AppSettings, ServerConfig, build_http_state, create_server};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("failed to load settings")?;
    let mode = BuildMode::from_debug_assertions();
    let policy = cookie_policy_from_env(&DefaultEnv::new(), mode)
        .wrap_err("invalid session cookie configuration")?;
    let config = ServerConfig::from_settings(&settings, policy, mode)?;

    let http_state = build_http_state(&config).await?;
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), http_state, &config)
        .wrap_err_with(|| format!("failed to bind {}", config.bind_addr()))?;
    info!(addr = %config.bind_addr(), "listening");

    let outcome = server.await;
    health_state.mark_unhealthy();
    outcome.wrap_err("server terminated with an error")
}
