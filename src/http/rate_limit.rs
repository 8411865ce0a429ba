//! Server-wide token-bucket rate limiting

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::ApiError;

struct Bucket {
    tokens: f64,
    refilled_at: Instant,
}

/// Refills at `rps` tokens per second up to `burst`; each request takes one token.
#[derive(Clone)]
pub struct RateLimiter {
    rps: f64,
    burst: f64,
    bucket: Arc<Mutex<Bucket>>,
}

impl RateLimiter {
    pub fn new(rps: f64, burst: u32) -> Self {
        let burst = f64::from(burst.max(1));
        Self { rps: rps.max(0.0), burst, bucket: Arc::new(Mutex::new(Bucket { tokens: burst, refilled_at: Instant::now() })) }
    }

    /// Returns `true` if the request may proceed.
    pub async fn try_acquire(&self) -> bool {
        let mut bucket = self.bucket.lock().await;
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.refilled_at).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rps).min(self.burst);
        bucket.refilled_at = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

pub async fn throttle(State(limiter): State<RateLimiter>, request: Request, next: Next) -> Result<Response, ApiError> {
    if !limiter.try_acquire().await {
        tracing::warn!(method = %request.method(), path = %request.uri().path(), "rate limited");
        return Err(ApiError::new(StatusCode::TOO_MANY_REQUESTS, "rate_limited", "too many requests"));
    }
    Ok(next.run(request).await)
}
