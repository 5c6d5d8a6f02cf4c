mod app;
mod auth;
mod config;
mod dashboard;
mod error;
mod properties;
mod state;
mod store;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "insurmap=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    tracing::info!(
        secure_cookie = config.cookie_secure,
        static_dir = %config.static_dir,
        protected = ?config.protected_prefixes,
        "configuration loaded"
    );

    let app_state = AppState::init(config).await?;
    app::serve(app::build_app(app_state)).await
}
