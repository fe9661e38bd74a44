//! Per-client token bucket rate limiting.
//!
//! Each client IP owns a bucket with a fixed capacity that refills at a
//! steady rate. A request consumes one token; an empty bucket yields HTTP
//! 429 with the standard error envelope. The web and public surfaces each
//! get their own limiter with different capacities.
//!
//! Buckets live in a `DashMap` in process memory. Entries idle past the
//! expiry window are pruned whenever the map has grown past a threshold, so
//! the table does not accumulate one bucket per IP forever.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;

use crate::error::AppError;

/// Idle time after which a bucket is considered stale.
const BUCKET_EXPIRY: Duration = Duration::from_secs(60);

/// Map size that triggers opportunistic pruning of stale buckets.
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_access: Instant,
}

/// Token bucket rate limiter keyed by client IP.
#[derive(Debug)]
pub struct RateLimiter {
    capacity: u32,
    refill_per_sec: f64,
    buckets: DashMap<String, Bucket>,
}

impl RateLimiter {
    /// Create a limiter with the given burst capacity and refill rate
    /// (tokens per second).
    pub fn new(capacity: u32, refill_per_sec: f64) -> Self {
        Self {
            capacity: capacity.max(1),
            refill_per_sec,
            buckets: DashMap::new(),
        }
    }

    /// Consume one token for a client, reporting whether the request may
    /// proceed.
    pub fn allow(&self, client: &str) -> bool {
        self.allow_at(client, Instant::now())
    }

    fn allow_at(&self, client: &str, now: Instant) -> bool {
        let mut entry = self.buckets.entry(client.to_string()).or_insert(Bucket {
            tokens: self.capacity as f64,
            last_access: now,
        });

        let elapsed = now.saturating_duration_since(entry.last_access);
        entry.tokens = (entry.tokens + elapsed.as_secs_f64() * self.refill_per_sec)
            .min(self.capacity as f64);
        entry.last_access = now;

        if entry.tokens >= 1.0 {
            entry.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Drop buckets idle longer than the expiry window once the map has
    /// grown large.
    fn prune(&self, now: Instant) {
        if self.buckets.len() > PRUNE_THRESHOLD {
            self.buckets
                .retain(|_, bucket| now.saturating_duration_since(bucket.last_access) < BUCKET_EXPIRY);
        }
    }
}

/// Rate limiting middleware function.
///
/// Keyed by the peer address of the connection. Requests from a client with
/// an empty bucket are rejected with 429 before reaching authentication or
/// handlers.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client = addr.ip().to_string();

    limiter.prune(Instant::now());
    if !limiter.allow(&client) {
        return Err(AppError::RateLimited);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_up_to_capacity_then_reject() {
        let limiter = RateLimiter::new(3, 1.0);
        let now = Instant::now();
        assert!(limiter.allow_at("1.2.3.4", now));
        assert!(limiter.allow_at("1.2.3.4", now));
        assert!(limiter.allow_at("1.2.3.4", now));
        assert!(!limiter.allow_at("1.2.3.4", now));
    }

    #[test]
    fn refills_over_time() {
        let limiter = RateLimiter::new(1, 1.0);
        let start = Instant::now();
        assert!(limiter.allow_at("1.2.3.4", start));
        assert!(!limiter.allow_at("1.2.3.4", start));
        // one second later one token has refilled
        assert!(limiter.allow_at("1.2.3.4", start + Duration::from_secs(1)));
    }

    #[test]
    fn refill_never_exceeds_capacity() {
        let limiter = RateLimiter::new(2, 1.0);
        let start = Instant::now();
        assert!(limiter.allow_at("1.2.3.4", start));
        // a long idle period must not bank more than `capacity` tokens
        let later = start + Duration::from_secs(3600);
        assert!(limiter.allow_at("1.2.3.4", later));
        assert!(limiter.allow_at("1.2.3.4", later));
        assert!(!limiter.allow_at("1.2.3.4", later));
    }

    #[test]
    fn clients_have_independent_buckets() {
        let limiter = RateLimiter::new(1, 1.0);
        let now = Instant::now();
        assert!(limiter.allow_at("1.1.1.1", now));
        assert!(!limiter.allow_at("1.1.1.1", now));
        assert!(limiter.allow_at("2.2.2.2", now));
    }
}
