/// Sliding-window rate limiting for uploads
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Per-key sliding window limiter.
///
/// Each key owns a queue of admission timestamps. A request is admitted
/// when, after dropping timestamps older than the window, fewer than
/// `max_per_window` remain. The check and the append happen under one
/// lock so two concurrent requests cannot both squeeze into the last
/// slot.
pub struct RateLimiter {
    window: Duration,
    max_per_window: usize,
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_per_window: usize) -> Self {
        Self {
            window,
            max_per_window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Admit or reject one request for `key`.
    ///
    /// Rejected attempts are not recorded, so hammering the endpoint
    /// does not extend the lockout.
    pub async fn admit(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let timestamps = windows.entry(key.to_string()).or_default();

        while let Some(oldest) = timestamps.front() {
            if now.duration_since(*oldest) >= self.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }

        if timestamps.len() >= self.max_per_window {
            return false;
        }

        timestamps.push_back(now);
        true
    }

    /// Drop keys whose windows have fully drained. Returns how many
    /// keys were removed.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let before = windows.len();

        windows.retain(|_, timestamps| {
            while let Some(oldest) = timestamps.front() {
                if now.duration_since(*oldest) >= self.window {
                    timestamps.pop_front();
                } else {
                    break;
                }
            }
            !timestamps.is_empty()
        });

        before - windows.len()
    }

    /// Spawn a background task that sweeps idle windows periodically
    pub fn start_sweeper(self: Arc<Self>, every: Duration) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await;
            loop {
                interval.tick().await;
                let removed = self.sweep().await;
                if removed > 0 {
                    tracing::debug!(removed, "Evicted idle upload windows");
                }
            }
        });
    }

    #[cfg(test)]
    pub(crate) async fn tracked_keys(&self) -> usize {
        self.windows.lock().await.len()
    }
}
