use sea_orm::{ConnectOptions, Database};
use tracing::{info, warn};

use pedalstar_codes::config::CodesConfig;
use pedalstar_codes::router::build_router;
use pedalstar_codes::state::AppState;
use pedalstar_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = CodesConfig::from_env().expect("invalid configuration");
    info!(?config, "loaded configuration");
    if config.admin_token.is_none() {
        warn!("ADMIN_TOKEN is not set; /redeem and /list will reject every request");
    }

    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .connect_timeout(config.store_timeout)
        .acquire_timeout(config.store_timeout)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("failed to connect to database");

    let state = AppState::new(db, &config);

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.codes_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("codes service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
