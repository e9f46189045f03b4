//! Shared server state: the transition executor and the request budget.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use problemflow_engine::TransitionExecutor;
use problemflow_storage::MemoryStore;
use tokio::sync::Mutex;

/// Requests seen from one client in the current fixed window.
#[derive(Debug, Clone, Copy)]
struct Window {
    count: u64,
    started: Instant,
}

#[derive(Debug)]
struct Windows {
    clients: HashMap<IpAddr, Window>,
    last_sweep: Instant,
}

/// Fixed-window per-IP request budget.
///
/// Expired windows are dropped at most once per window length, so the
/// table only holds clients seen during roughly the last two windows.
#[derive(Debug)]
pub(crate) struct RateLimiter {
    windows: Mutex<Windows>,
    max_requests: u64,
    window: Duration,
}

impl RateLimiter {
    pub(crate) fn new(max_requests: u64, window: Duration) -> Self {
        Self {
            windows: Mutex::new(Windows {
                clients: HashMap::new(),
                last_sweep: Instant::now(),
            }),
            max_requests,
            window,
        }
    }

    /// Count one request from `ip`. `Err` carries the seconds until the
    /// client's window resets.
    pub(crate) async fn check(&self, ip: IpAddr) -> Result<(), u64> {
        self.check_at(ip, Instant::now()).await
    }

    async fn check_at(&self, ip: IpAddr, now: Instant) -> Result<(), u64> {
        let mut windows = self.windows.lock().await;

        if now.duration_since(windows.last_sweep) >= self.window {
            let window = self.window;
            windows
                .clients
                .retain(|_, w| now.duration_since(w.started) < window);
            windows.last_sweep = now;
        }

        let entry = windows.clients.entry(ip).or_insert(Window {
            count: 0,
            started: now,
        });
        let elapsed = now.duration_since(entry.started);
        if elapsed >= self.window {
            *entry = Window {
                count: 0,
                started: now,
            };
        }

        entry.count += 1;
        if entry.count > self.max_requests {
            let remaining = self.window.saturating_sub(now.duration_since(entry.started));
            Err(remaining.as_secs().max(1))
        } else {
            Ok(())
        }
    }

    #[cfg(test)]
    async fn tracked_clients(&self) -> usize {
        self.windows.lock().await.clients.len()
    }
}

/// Application state shared across request handlers.
pub(crate) struct AppState {
    /// Transition pipeline over the seeded problem store.
    pub(crate) executor: TransitionExecutor<MemoryStore>,
    pub(crate) rate_limiter: RateLimiter,
    /// None = no auth required.
    pub(crate) api_key: Option<String>,
}
