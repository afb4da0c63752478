use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use moka::future::Cache;

use crate::{middlewares::mw_auth::Ctx, AppState, Error};

const WINDOW_SECS: i64 = 60;

/// Fixed one-minute window counters keyed by requester and window index.
#[derive(Clone)]
pub struct RateLimiter {
    counters: Cache<String, Arc<AtomicU32>>,
    max_per_minute: u32,
}

impl RateLimiter {
    pub fn new(max_per_minute: u32) -> Self {
        Self {
            counters: Cache::builder()
                .max_capacity(100_000)
                .time_to_live(Duration::from_secs(WINDOW_SECS as u64 * 2))
                .build(),
            max_per_minute,
        }
    }

    /// Counts one request for `identifier`; false once the window is exhausted.
    pub async fn check(&self, identifier: &str) -> bool {
        self.check_in_window(identifier, Utc::now().timestamp() / WINDOW_SECS)
            .await
    }

    async fn check_in_window(&self, identifier: &str, window: i64) -> bool {
        let key = format!("rl:{identifier}:{window}");

        let counter = self
            .counters
            .get_with(key, async { Arc::new(AtomicU32::new(0)) })
            .await;

        counter.fetch_add(1, Ordering::Relaxed) < self.max_per_minute
    }
}

/// Global rate limiting middleware. Authenticated callers are counted per
/// user, anonymous ones per IP.
pub async fn rate_limit_middleware(
    State(app_state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, Error> {
    let identifier = req
        .extensions()
        .get::<Ctx>()
        .map(|ctx| format!("user:{}", ctx.user_id))
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| format!("ip:{}", addr.ip()))
        })
        .unwrap_or_else(|| "anonymous".to_string());

    if !app_state.rate_limiter.check(&identifier).await {
        tracing::warn!(%identifier, "rate limit exceeded");
        return Err(Error::RateLimited);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_limit_is_per_identifier() {
        let limiter = RateLimiter::new(3);

        for _ in 0..3 {
            assert!(limiter.check_in_window("ip:127.0.0.1", 7).await);
        }
        assert!(!limiter.check_in_window("ip:127.0.0.1", 7).await);
        assert!(limiter.check_in_window("ip:10.0.0.2", 7).await);

        // next window starts from zero again
        assert!(limiter.check_in_window("ip:127.0.0.1", 8).await);
    }
}
