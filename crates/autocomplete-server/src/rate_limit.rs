//! Per-client token-bucket rate limiting as a tower layer.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, Response, StatusCode};
use dashmap::DashMap;
use tower::{Layer, Service};
use tracing::{debug, warn};

const LOG_INTERVAL: Duration = Duration::from_secs(60);
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone, Copy, Debug)]
struct Limits {
    rate_per_sec: f64,
    burst: f64,
}

/// Buckets live in the layer, so every route it wraps draws on the same
/// per-client budget.
#[derive(Clone)]
pub struct RateLimiterLayer {
    shared: Arc<Limiter>,
}

impl RateLimiterLayer {
    pub fn new(rate_per_sec: u32, burst: u32) -> Self {
        Self {
            shared: Arc::new(Limiter::new(
                Limits {
                    rate_per_sec: f64::from(rate_per_sec),
                    burst: f64::from(burst),
                },
                false,
                Instant::now(),
            )),
        }
    }

    /// Key clients on the hop appended by the reverse proxy in front of the
    /// service (the rightmost `X-Forwarded-For` entry) instead of the peer
    /// address. Only enable this behind a proxy that sets the header.
    pub fn trust_forwarded(self, trust: bool) -> Self {
        Self {
            shared: Arc::new(Limiter::new(self.shared.limits, trust, Instant::now())),
        }
    }
}

impl<S> Layer<S> for RateLimiterLayer {
    type Service = RateLimiter<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimiter {
            inner,
            shared: Arc::clone(&self.shared),
        }
    }
}

#[derive(Clone)]
pub struct RateLimiter<S> {
    inner: S,
    shared: Arc<Limiter>,
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
        let now = Instant::now();
        if let Some(client) = client_id(&req, self.shared.trust_forwarded)
            && !self.shared.admit(&client, now)
        {
            self.shared.drops.record(now);
            return Box::pin(async move {
                let mut response = Response::new(Body::from("rate limited"));
                *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;
                Ok(response)
            });
        }

        let fut = self.inner.call(req);
        Box::pin(fut)
    }
}

/// Identify the caller.
///
/// The peer address comes from `ConnectInfo`, which the server installs via
/// `into_make_service_with_connect_info`. With `trust_forwarded` the last
/// `X-Forwarded-For` hop wins, since earlier hops are whatever the client sent.
/// Requests with neither are not limited.
fn client_id<B>(req: &Request<B>, trust_forwarded: bool) -> Option<String> {
    let forwarded = trust_forwarded
        .then(|| req.headers().get("x-forwarded-for"))
        .flatten()
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.rsplit(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned);
    forwarded.or_else(|| {
        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
    })
}

/// State shared by every service the layer wraps.
struct Limiter {
    limits: Limits,
    trust_forwarded: bool,
    buckets: DashMap<String, TokenBucket>,
    last_sweep: Mutex<Instant>,
    drops: DropLog,
}

impl Limiter {
    fn new(limits: Limits, trust_forwarded: bool, now: Instant) -> Self {
        Self {
            limits,
            trust_forwarded,
            buckets: DashMap::new(),
            last_sweep: Mutex::new(now),
            drops: DropLog::new(now),
        }
    }

    fn admit(&self, client: &str, now: Instant) -> bool {
        self.sweep_if_due(now);
        let Limits {
            rate_per_sec,
            burst,
        } = self.limits;
        self.buckets
            .entry(client.to_owned())
            .or_insert_with(|| TokenBucket::full(burst, now))
            .try_take(now, rate_per_sec, burst)
    }

    fn sweep_if_due(&self, now: Instant) {
        {
            let mut last = self.last_sweep.lock().unwrap_or_else(|e| e.into_inner());
            if now.saturating_duration_since(*last) < SWEEP_INTERVAL {
                return;
            }
            *last = now;
        }
        self.sweep(now);
    }

    /// Forget clients whose bucket has refilled completely. A fresh bucket
    /// would be identical, so no client gains or loses tokens.
    fn sweep(&self, now: Instant) {
        let Limits {
            rate_per_sec,
            burst,
        } = self.limits;
        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| !bucket.is_full_at(now, rate_per_sec, burst));
        debug!(
            evicted = before.saturating_sub(self.buckets.len()),
            tracked = self.buckets.len(),
            "rate limiter sweep"
        );
    }
}

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn full(burst: f64, now: Instant) -> Self {
        Self {
            tokens: burst,
            last_refill: now,
        }
    }

    fn refilled(&self, now: Instant, rate_per_sec: f64, burst: f64) -> f64 {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        (self.tokens + elapsed * rate_per_sec).min(burst)
    }

    fn is_full_at(&self, now: Instant, rate_per_sec: f64, burst: f64) -> bool {
        self.refilled(now, rate_per_sec, burst) >= burst
    }

    fn try_take(&mut self, now: Instant, rate_per_sec: f64, burst: f64) -> bool {
        if now > self.last_refill {
            self.tokens = self.refilled(now, rate_per_sec, burst);
            self.last_refill = now;
        }
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Counts rejected requests and reports them at most once per interval.
struct DropLog {
    dropped: AtomicU64,
    last_log: Mutex<Instant>,
}

impl DropLog {
    fn new(now: Instant) -> Self {
        Self {
            dropped: AtomicU64::new(0),
            last_log: Mutex::new(now),
        }
    }

    /// Returns the number of drops reported, if this call emitted a log line.
    fn record(&self, now: Instant) -> Option<u64> {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        let mut last = self.last_log.lock().unwrap_or_else(|e| e.into_inner());
        if now.saturating_duration_since(*last) < LOG_INTERVAL {
            return None;
        }
        *last = now;
        let dropped = self.dropped.swap(0, Ordering::Relaxed);
        warn!("rate limiter dropped {dropped} requests in the last minute");
        Some(dropped)
    }
}
