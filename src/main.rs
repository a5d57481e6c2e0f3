mod app;
mod config;
mod db;
mod memory;
mod notes;
mod state;
mod storage;
mod users;

use tracing_subscriber::EnvFilter;

use crate::{app::build_app, config::AppConfig, state::AppState};

/// `RUST_LOG` overrides the default filter; `LOG_FORMAT=json` switches to
/// JSON lines without targets.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("notekeeper=debug,axum=info,tower_http=info"));
    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.with_target(false).json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    let config = AppConfig::from_env()?;
    let app_state = AppState::init(config).await?;
    let config = app_state.config.clone();

    app::serve(build_app(app_state), &config).await
}
