use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Once the caller map reaches this size, expired windows are swept before
/// admitting a new caller.
const SWEEP_THRESHOLD: usize = 1024;

/// Fixed-window request counter keyed per caller. Windows reset lazily on the
/// first request after expiry; once the map grows past [`SWEEP_THRESHOLD`],
/// expired entries are dropped so one-off callers do not accumulate forever.
pub struct RateLimiter {
    enabled: bool,
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<String, (Instant, u32)>>,
}

impl RateLimiter {
    pub fn new(enabled: bool, max_requests: u32, window: Duration) -> Self {
        Self {
            enabled,
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(
            config.enable_rate_limiting,
            config.rate_limit_requests,
            Duration::from_secs(config.rate_limit_window_secs),
        )
    }

    /// Records one request for the caller; false when over the limit.
    pub fn try_acquire(&self, caller: &str) -> bool {
        if !self.enabled {
            return true;
        }
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        if windows.len() >= SWEEP_THRESHOLD && !windows.contains_key(caller) {
            windows.retain(|_, (start, _)| now.duration_since(*start) < self.window);
        }
        let entry = windows.entry(caller.to_string()).or_insert((now, 0));
        if now.duration_since(entry.0) >= self.window {
            *entry = (now, 0);
        }
        entry.1 += 1;
        entry.1 <= self.max_requests
    }

    #[cfg(test)]
    fn tracked_callers(&self) -> usize {
        self.windows.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Throttles by API key when one is presented, otherwise by peer address.
/// The health probe is never throttled.
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if request.uri().path() == "/healthz" {
        return Ok(next.run(request).await);
    }

    let caller = request
        .headers()
        .get("x-apikey")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|info| info.0.ip().to_string())
        })
        .unwrap_or_else(|| "anonymous".to_string());

    if !state.limiter.try_acquire(&caller) {
        tracing::warn!(caller, "rate limit exceeded");
        return Err(ApiError::RateLimited);
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_limiter_always_admits() {
        let limiter = RateLimiter::new(false, 1, Duration::from_secs(60));
        for _ in 0..100 {
            assert!(limiter.try_acquire("a"));
        }
    }

    #[test]
    fn requests_beyond_the_limit_are_rejected() {
        let limiter = RateLimiter::new(true, 3, Duration::from_secs(60));
        assert!(limiter.try_acquire("a"));
        assert!(limiter.try_acquire("a"));
        assert!(limiter.try_acquire("a"));
        assert!(!limiter.try_acquire("a"));
    }

    #[test]
    fn callers_are_counted_separately() {
        let limiter = RateLimiter::new(true, 1, Duration::from_secs(60));
        assert!(limiter.try_acquire("a"));
        assert!(limiter.try_acquire("b"));
        assert!(!limiter.try_acquire("a"));
    }

    #[test]
    fn window_expiry_resets_the_count() {
        let limiter = RateLimiter::new(true, 1, Duration::from_millis(0));
        assert!(limiter.try_acquire("a"));
        // Zero-length window: the next request starts a fresh one.
        assert!(limiter.try_acquire("a"));
    }

    #[test]
    fn expired_callers_are_swept_instead_of_accumulating() {
        let limiter = RateLimiter::new(true, 1, Duration::from_millis(0));
        for i in 0..(SWEEP_THRESHOLD * 4) {
            assert!(limiter.try_acquire(&format!("caller-{i}")));
        }
        assert!(limiter.tracked_callers() <= SWEEP_THRESHOLD);
    }

    #[test]
    fn active_windows_survive_the_sweep() {
        let limiter = RateLimiter::new(true, 10, Duration::from_secs(60));
        for i in 0..(SWEEP_THRESHOLD + 5) {
            assert!(limiter.try_acquire(&format!("caller-{i}")));
        }
        // Every window is still live, so nothing can be evicted and the
        // caller from before the sweep keeps its count.
        assert_eq!(limiter.tracked_callers(), SWEEP_THRESHOLD + 5);
        assert!(limiter.try_acquire("caller-0"));
    }
}
