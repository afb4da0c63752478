use std::net::SocketAddr;

use goonj::{build_router, config::AppConfig, connect_db, AppState, Result};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    tracing::info!("Starting Goonj API...");

    let config = AppConfig::from_env()?;
    tracing::info!(auth = ?config.auth, "Configuration loaded");

    let db = connect_db(&config.db).await?;

    let app_state = AppState::new(db, config.auth.clone(), config.rate_limit_per_minute);
    let routes_all = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;

    tracing::info!("Listening on http://{}", config.bind_addr);

    axum::serve(
        listener,
        routes_all.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "goonj=debug,tower_http=info,info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}
