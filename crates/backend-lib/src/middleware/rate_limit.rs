use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::Request, middleware::Next, response::Response};
use metrics::counter;
use parking_lot::Mutex;

use crate::config::RateLimitSettings;
use crate::metrics::RATE_LIMIT_REJECTED;
use crate::storage::Storage;
use crate::{error::AppError, AppState};

/// Process-wide token bucket.
///
/// Holds up to `capacity` tokens and regains `refill_per_sec` per second.
/// Every admitted request spends one.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    refill_per_sec: f64,
    state: Mutex<BucketState>,
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a full bucket
    pub fn new(capacity: u32, refill_per_sec: u32) -> Self {
        Self {
            capacity: f64::from(capacity),
            refill_per_sec: f64::from(refill_per_sec),
            state: Mutex::new(BucketState {
                tokens: f64::from(capacity),
                last_refill: Instant::now(),
            }),
        }
    }

    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::new(settings.capacity, settings.refill_per_sec)
    }

    /// Take one token if available
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    pub fn try_acquire_at(&self, now: Instant) -> bool {
        let mut state = self.state.lock();

        // Clock readings from racing callers may arrive slightly out of order
        if now > state.last_refill {
            let elapsed = now.duration_since(state.last_refill).as_secs_f64();
            state.tokens = (state.tokens + elapsed * self.refill_per_sec).min(self.capacity);
            state.last_refill = now;
        }

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Rate limiter middleware
pub async fn rate_limit<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    if !state.rate_limiter.try_acquire() {
        counter!(RATE_LIMIT_REJECTED).increment(1);
        tracing::debug!(path = %request.uri().path(), "request rate limited");
        return Err(AppError::RateLimitExceeded);
    }

    Ok(next.run(request).await)
}
