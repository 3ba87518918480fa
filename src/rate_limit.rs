use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, instrument};

use crate::error::{FetchError, Result};

/// Token bucket shared by every request a client makes
///
/// NCBI allows 3 requests per second without an API key and 10 with one.
/// Clones share the same bucket.
#[derive(Clone)]
pub struct RateLimiter {
    bucket: Arc<Mutex<TokenBucket>>,
}

// Absorbs float drift between the computed wait and the refill after it.
const TOKEN_EPSILON: f64 = 1e-6;

struct TokenBucket {
    tokens: f64,
    capacity: f64,
    refill_rate: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }

    /// Take a token, or report how long until one is available
    fn try_take(&mut self) -> Option<Duration> {
        self.refill();
        if self.tokens + TOKEN_EPSILON >= 1.0 {
            self.tokens = (self.tokens - 1.0).max(0.0);
            None
        } else {
            let missing = 1.0 - self.tokens;
            Some(Duration::from_secs_f64(missing / self.refill_rate))
        }
    }
}

impl RateLimiter {
    /// `rate` is in requests per second and must be positive
    pub fn new(rate: f64) -> Self {
        let capacity = rate.max(1.0);
        Self {
            bucket: Arc::new(Mutex::new(TokenBucket {
                tokens: capacity,
                capacity,
                refill_rate: rate,
                last_refill: Instant::now(),
            })),
        }
    }

    /// Wait until a request may be sent
    #[instrument(skip(self))]
    pub async fn acquire(&self) -> Result<()> {
        let wait = self.bucket.lock().await.try_take();

        let Some(wait) = wait else {
            return Ok(());
        };

        debug!(wait_ms = wait.as_millis(), "Waiting for rate limit token");
        sleep(wait).await;

        match self.bucket.lock().await.try_take() {
            None => Ok(()),
            Some(_) => Err(FetchError::RateLimitExceeded),
        }
    }

    pub async fn token_count(&self) -> f64 {
        let mut bucket = self.bucket.lock().await;
        bucket.refill();
        bucket.tokens
    }

    pub async fn rate(&self) -> f64 {
        self.bucket.lock().await.refill_rate
    }
}
