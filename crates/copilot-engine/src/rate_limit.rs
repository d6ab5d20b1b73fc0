//! Per-endpoint token-bucket rate limiting for outbound Engine calls (spec §5).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use copilot_core::config::{BucketConfig, EngineEndpoint, RateLimitTable};

struct TokenBucket {
    tokens: f64,
    last_update: Instant,
    rate: f64,
    capacity: f64,
    throttled_count: u64,
}

impl TokenBucket {
    fn new(config: BucketConfig) -> Self {
        Self {
            tokens: config.burst,
            last_update: Instant::now(),
            rate: config.tokens_per_second,
            capacity: config.burst,
            throttled_count: 0,
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity);
        self.last_update = now;
    }

    /// Time until at least one token is available.
    fn wait_for_token(&mut self) -> Duration {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Duration::ZERO
        } else {
            self.throttled_count += 1;
            let deficit = 1.0 - self.tokens;
            self.tokens = 0.0;
            Duration::from_secs_f64(deficit / self.rate)
        }
    }
}

/// Keeps one [`TokenBucket`] per [`EngineEndpoint`], seeded from a [`RateLimitTable`].
pub struct RateLimiter {
    buckets: Arc<Mutex<HashMap<EngineEndpoint, TokenBucket>>>,
    table: RateLimitTable,
}

impl RateLimiter {
    pub fn new(table: RateLimitTable) -> Self {
        Self { buckets: Arc::new(Mutex::new(HashMap::new())), table }
    }

    /// Block until a token for `endpoint` is available, then consume it.
    pub async fn acquire(&self, endpoint: EngineEndpoint) {
        let wait = {
            let mut buckets = self.buckets.lock().await;
            let config = self.table.for_endpoint(endpoint);
            let bucket = buckets.entry(endpoint).or_insert_with(|| TokenBucket::new(config));
            bucket.wait_for_token()
        };
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }

    pub async fn throttled_count(&self, endpoint: EngineEndpoint) -> u64 {
        self.buckets.lock().await.get(&endpoint).map(|bucket| bucket.throttled_count).unwrap_or(0)
    }
}
