//! Per-client token bucket applied as a tower layer.
//!
//! Clients are identified by a request header set by the fronting proxy.
//! Requests without that header are never limited. Buckets left idle for
//! [`IDLE_TIMEOUT`] are evicted, at most once per [`SWEEP_INTERVAL`].

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{HeaderName, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;
use tower::{Layer, Service};
use tracing::warn;

const LOG_INTERVAL: Duration = Duration::from_secs(60);
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Clone)]
pub struct RateLimiterLayer {
    limits: Arc<Limits>,
}

#[derive(Clone)]
pub struct RateLimiter<S> {
    inner: S,
    limits: Arc<Limits>,
}

struct Limits {
    client_header: HeaderName,
    rate_per_sec: f64,
    burst: f64,
    buckets: DashMap<String, Bucket>,
    dropped_since_log: AtomicU64,
    last_log: Mutex<Instant>,
    last_sweep: Mutex<Instant>,
}

#[derive(Debug, Clone)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiterLayer {
    /// Every service produced by this layer shares the same buckets, so
    /// a client's budget spans all routes.
    pub fn new(rate_per_sec: u32, burst: u32, client_header: HeaderName) -> Self {
        Self {
            limits: Arc::new(Limits {
                client_header,
                rate_per_sec: rate_per_sec as f64,
                burst: burst as f64,
                buckets: DashMap::new(),
                dropped_since_log: AtomicU64::new(0),
                last_log: Mutex::new(Instant::now()),
                last_sweep: Mutex::new(Instant::now()),
            }),
        }
    }
}

impl<S> Layer<S> for RateLimiterLayer {
    type Service = RateLimiter<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimiter {
            inner,
            limits: Arc::clone(&self.limits),
        }
    }
}

impl<S, ReqBody> Service<Request<ReqBody>> for RateLimiter<S>
where
    S: Service<Request<ReqBody>, Response = Response<Body>> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let client = req
            .headers()
            .get(&self.limits.client_header)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.trim().to_string());
        if let Some(client) = client {
            if !self.limits.try_acquire(&client) {
                self.limits.record_drop();
                return Box::pin(async {
                    Ok((StatusCode::TOO_MANY_REQUESTS, "rate limited").into_response())
                });
            }
        }

        Box::pin(self.inner.call(req))
    }
}

impl Limits {
    fn try_acquire(&self, client: &str) -> bool {
        let now = Instant::now();
        self.sweep_if_due(now);
        let mut entry = self.buckets.entry(client.to_string()).or_insert(Bucket {
            tokens: self.burst,
            last_refill: now,
        });
        let elapsed = now.saturating_duration_since(entry.last_refill).as_secs_f64();
        if elapsed > 0.0 {
            entry.tokens = (entry.tokens + elapsed * self.rate_per_sec).min(self.burst);
            entry.last_refill = now;
        }
        if entry.tokens >= 1.0 {
            entry.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn sweep_if_due(&self, now: Instant) {
        let Ok(mut last) = self.last_sweep.lock() else {
            return;
        };
        if now.saturating_duration_since(*last) >= SWEEP_INTERVAL {
            *last = now;
            drop(last);
            self.evict_idle(now);
        }
    }

    fn evict_idle(&self, now: Instant) {
        self.buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.last_refill) < IDLE_TIMEOUT);
    }

    fn record_drop(&self) {
        self.dropped_since_log.fetch_add(1, Ordering::Relaxed);
        let now = Instant::now();
        let Ok(mut last) = self.last_log.lock() else {
            return;
        };
        if now.saturating_duration_since(*last) >= LOG_INTERVAL {
            let dropped = self.dropped_since_log.swap(0, Ordering::Relaxed);
            if dropped > 0 {
                warn!("rate limiter dropped {dropped} requests in the last minute");
            }
            *last = now;
        }
    }
}
