use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, Response},
    middleware, Router,
};
use surrealdb::{
    engine::any::{self, Any},
    opt::auth::Root,
    Surreal,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Span;
use uuid::Uuid;

use crate::{
    auth::token_service::AuthConfig,
    config::DbConfig,
    controllers::health_controller::health_handler,
    middlewares::mw_rate_limit::RateLimiter,
    routes::{auth_routes::AuthRoutes, playlist_routes::PlaylistRoutes, song_routes::SongRoutes},
};

pub use self::error::{Error, Result};

pub mod auth;
pub mod client;
pub mod config;
pub mod controllers;
pub mod error;
pub mod extract;
pub mod helpers;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod services;

#[derive(Clone)]
pub struct AppState {
    pub db: Surreal<Any>,
    pub auth_config: AuthConfig,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(db: Surreal<Any>, auth_config: AuthConfig, rate_limit_per_minute: u32) -> Self {
        Self {
            db,
            auth_config,
            rate_limiter: RateLimiter::new(rate_limit_per_minute),
        }
    }
}

pub async fn connect_db(config: &DbConfig) -> Result<Surreal<Any>> {
    tracing::info!("Connecting to database at: {}", config.url);

    let db = any::connect(&config.url).await?;

    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        db.signin(Root {
            username,
            password,
        })
        .await?;
    }

    db.use_ns(&config.namespace).use_db(&config.database).await?;

    tracing::info!("Database connected successfully!");
    Ok(db)
}

pub fn build_router(app_state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", axum::routing::get(health_handler))
        .nest("/auth", AuthRoutes::routes())
        .nest("/songs", SongRoutes::routes())
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            middlewares::mw_rate_limit::rate_limit_middleware,
        ));

    // mw_auth is the outer layer so the limiter sees the caller's Ctx.
    let protected_routes = Router::new()
        .nest("/playlists", PlaylistRoutes::routes())
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            middlewares::mw_rate_limit::rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            middlewares::mw_auth::mw_auth,
        ));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .with_state(app_state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4();
                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    tracing::info!("{} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &Response<Body>, latency: Duration, _span: &Span| {
                    let status = response.status();
                    let latency_ms = latency.as_millis();

                    match status.as_u16() {
                        200..=299 => tracing::info!("{} ({}ms)", status, latency_ms),
                        400..=499 => tracing::warn!("{} ({}ms)", status, latency_ms),
                        500..=599 => tracing::error!("{} ({}ms)", status, latency_ms),
                        _ => tracing::info!("{} ({}ms)", status, latency_ms),
                    }
                }),
        )
        .layer(CorsLayer::very_permissive())
}
