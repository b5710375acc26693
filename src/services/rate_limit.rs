//! Per-client rate limiting for the auth endpoints.
//!
//! Each client IP gets its own bucket. The IP is read from `X-Forwarded-For`
//! or `X-Real-IP` only when the deployment says a proxy sets them; otherwise
//! the socket peer address from `ConnectInfo` is used.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use governor::{clock::DefaultClock, state::keyed::DefaultKeyedStateStore, Quota, RateLimiter};
use std::{
    future::Future,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    pin::Pin,
    sync::Arc,
};
use tower::{Layer, Service};

use crate::error::ErrorResponse;

pub type ClientRateLimiter = Arc<RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>>;

/// Idle buckets are dropped once the store tracks this many clients.
const MAX_TRACKED_CLIENTS: usize = 10_000;

/// `per_minute` requests refill each minute per client; the same number may
/// arrive in a burst.
pub fn create_rate_limiter(per_minute: u32) -> ClientRateLimiter {
    let rate = NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN);
    Arc::new(RateLimiter::keyed(Quota::per_minute(rate).allow_burst(rate)))
}

/// Client address for rate limiting. Requests with no usable address share
/// the unspecified-address bucket.
pub fn client_ip(request: &Request<Body>, trust_forwarded: bool) -> IpAddr {
    if trust_forwarded {
        if let Some(ip) = forwarded_ip(request.headers()) {
            return ip;
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    // First hop in the chain is the original client.
    let forwarded_for = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse().ok());

    forwarded_for.or_else(|| {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok())
    })
}

#[derive(Clone)]
pub struct RateLimitLayer {
    limiter: ClientRateLimiter,
    trust_forwarded: bool,
}

impl RateLimitLayer {
    pub fn new(limiter: ClientRateLimiter) -> Self {
        Self {
            limiter,
            trust_forwarded: false,
        }
    }

    /// Keys clients by proxy headers. Only enable behind a proxy that
    /// overwrites them.
    pub fn trust_forwarded_headers(mut self, trust: bool) -> Self {
        self.trust_forwarded = trust;
        self
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitService {
            inner,
            limiter: self.limiter.clone(),
            trust_forwarded: self.trust_forwarded,
        }
    }
}

#[derive(Clone)]
pub struct RateLimitService<S> {
    inner: S,
    limiter: ClientRateLimiter,
    trust_forwarded: bool,
}

impl<S> Service<Request<Body>> for RateLimitService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut std::task::Context<'_>) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let limiter = self.limiter.clone();
        let mut inner = self.inner.clone();
        let ip = client_ip(&request, self.trust_forwarded);

        Box::pin(async move {
            if limiter.len() > MAX_TRACKED_CLIENTS {
                limiter.retain_recent();
            }

            if limiter.check_key(&ip).is_err() {
                tracing::warn!(path = %request.uri().path(), client = %ip, "Auth rate limit exceeded");
                return Ok((
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(ErrorResponse::new("Too many requests, try again later")),
                )
                    .into_response());
            }
            inner.call(request).await
        })
    }
}
