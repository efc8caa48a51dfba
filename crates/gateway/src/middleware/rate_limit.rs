//! Rate limiting middleware using token bucket algorithm

use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use governor::{
    clock::QuantaClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reviewdesk_common::config::RateLimitConfig;
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter using governor crate
pub type GlobalRateLimiter = RateLimiter<NotKeyed, InMemoryState, QuantaClock>;

/// Create a rate limiter from gateway configuration
pub fn create_rate_limiter(config: &RateLimitConfig) -> Arc<GlobalRateLimiter> {
    let rate = NonZeroU32::new(config.requests_per_second.max(1)).unwrap();
    let burst = NonZeroU32::new(config.burst.max(1)).unwrap();
    let quota = Quota::per_second(rate).allow_burst(burst);

    Arc::new(RateLimiter::direct(quota))
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    request: Request,
    next: Next,
    limiter: Arc<GlobalRateLimiter>,
) -> Result<Response, StatusCode> {
    match limiter.check() {
        Ok(_) => Ok(next.run(request).await),
        Err(_) => {
            tracing::warn!("Rate limit exceeded");
            Err(StatusCode::TOO_MANY_REQUESTS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_allows_within_quota() {
        let config = RateLimitConfig {
            requests_per_second: 100,
            burst: 200,
            enabled: true,
        };
        let limiter = create_rate_limiter(&config);
        assert!(limiter.check().is_ok());
    }

    #[test]
    fn test_rate_limiter_exhausts_burst() {
        let config = RateLimitConfig {
            requests_per_second: 1,
            burst: 2,
            enabled: true,
        };
        let limiter = create_rate_limiter(&config);
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }
}
