//! Per-address submission limiter.
//!
//! Sliding log: each address keeps the instants of its admitted requests.
//! A request is admitted only while fewer than `max_requests` of those lie
//! inside the trailing window, so no window-length interval ever holds more
//! than `max_requests` admits for one address.

use axum::http::HeaderMap;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::RateLimitConfig;
use crate::security::clock::{Clock, SystemClock};

/// Gate decision for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Counted against the window; `remaining` more fit before it closes.
    Admitted { remaining: u32 },
    /// Over the limit; the oldest admit leaves the window after `retry_after`.
    Rejected { retry_after: Duration },
}

/// Process-wide limiter state, owned explicitly and shared via `Arc`.
pub struct RateLimiter {
    logs: DashMap<IpAddr, VecDeque<Instant>>,
    max_requests: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self::with_clock(max_requests, window, Arc::new(SystemClock))
    }

    pub fn with_clock(max_requests: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            logs: DashMap::new(),
            max_requests,
            window,
            clock,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, config.window())
    }

    pub fn limit(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Count a request from `addr` if it fits.
    ///
    /// The map entry stays locked for the whole check-and-push, so a burst
    /// from one address cannot slip extra requests through.
    pub fn check(&self, addr: IpAddr) -> Admission {
        let now = self.clock.now();
        let mut entry = self.logs.entry(addr).or_default();
        let log = entry.value_mut();
        prune(log, now, self.window);

        if (log.len() as u32) < self.max_requests {
            log.push_back(now);
            Admission::Admitted {
                remaining: self.max_requests - log.len() as u32,
            }
        } else {
            let retry_after = log
                .front()
                .map(|oldest| (*oldest + self.window).saturating_duration_since(now))
                .unwrap_or_default();
            Admission::Rejected { retry_after }
        }
    }

    /// Drop addresses with no admits left in the window. Returns how many.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let before = self.logs.len();
        self.logs.retain(|_, log| {
            prune(log, now, self.window);
            !log.is_empty()
        });
        before.saturating_sub(self.logs.len())
    }

    /// Forget every address.
    pub fn reset(&self) {
        self.logs.clear();
    }

    /// Number of addresses currently tracked.
    pub fn tracked(&self) -> usize {
        self.logs.len()
    }
}

fn prune(log: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(oldest) = log.front() {
        if now.saturating_duration_since(*oldest) >= window {
            log.pop_front();
        } else {
            break;
        }
    }
}

/// Periodically sweep idle addresses until shutdown.
pub fn spawn_sweeper(
    limiter: Arc<RateLimiter>,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(limiter.window());
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = limiter.sweep();
                    if removed > 0 {
                        tracing::debug!(removed, tracked = limiter.tracked(), "Swept idle rate-limit entries");
                    }
                }
                _ = shutdown.recv() => break,
            }
        }
    })
}

/// Address a request is limited under.
///
/// The TCP peer, unless forwarded headers are trusted and carry a parseable
/// first hop.
pub fn client_ip(peer: SocketAddr, headers: &HeaderMap, trust_forwarded_for: bool) -> IpAddr {
    if trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok());
        if let Some(ip) = forwarded {
            return ip;
        }
    }
    peer.ip()
}
