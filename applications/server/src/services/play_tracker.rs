/// Duration-gated play accounting
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use wavecast_core::{PlayStore, TrackId, Username};

use crate::error::Result;

/// Counts a play only when the listener stayed past a minimum duration.
///
/// Streaming a track records a pending session keyed by
/// (track, listener); completing it consumes the session and counts the
/// play if enough time elapsed since the start.
pub struct PlayTracker {
    threshold: Duration,
    store: Arc<dyn PlayStore>,
    pending: Mutex<HashMap<(TrackId, Username), Instant>>,
}

impl PlayTracker {
    pub fn new(threshold: Duration, store: Arc<dyn PlayStore>) -> Self {
        Self {
            threshold,
            store,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Record the start of a listening session.
    ///
    /// Latest start wins: a repeated start replaces the timestamp, so
    /// restarting a track resets the gate.
    pub async fn mark_started(&self, track_id: &TrackId, listener: &Username) {
        let mut pending = self.pending.lock().await;
        pending.insert((track_id.clone(), listener.clone()), Instant::now());
    }

    /// Consume the pending session and count the play if it lasted long
    /// enough. Returns whether the play was counted.
    pub async fn mark_completed(&self, track_id: &TrackId, listener: &Username) -> Result<bool> {
        // Claim the pending session before judging it, so a concurrent
        // completion for the same pair cannot count the play twice.
        let started = {
            let mut pending = self.pending.lock().await;
            pending.remove(&(track_id.clone(), listener.clone()))
        };

        let Some(started) = started else {
            return Ok(false);
        };

        if started.elapsed() < self.threshold {
            tracing::debug!(
                track = %track_id,
                listener = %listener,
                "Play ended before the counting threshold"
            );
            return Ok(false);
        }

        let plays = self.store.increment_play_count(track_id).await?;
        tracing::info!(track = %track_id, listener = %listener, plays, "Counted play");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::time::advance;

    struct StubPlayStore {
        counts: Mutex<HashMap<String, i64>>,
    }

    impl StubPlayStore {
        fn new() -> Self {
            Self {
                counts: Mutex::new(HashMap::new()),
            }
        }

        async fn plays(&self, track_id: &TrackId) -> i64 {
            *self
                .counts
                .lock()
                .await
                .get(track_id.as_str())
                .unwrap_or(&0)
        }
    }

    #[async_trait]
    impl PlayStore for StubPlayStore {
        async fn increment_play_count(&self, track_id: &TrackId) -> wavecast_core::Result<i64> {
            let mut counts = self.counts.lock().await;
            let entry = counts.entry(track_id.as_str().to_string()).or_insert(0);
            *entry += 1;
            Ok(*entry)
        }
    }

    fn tracker(store: Arc<StubPlayStore>) -> PlayTracker {
        PlayTracker::new(Duration::from_secs(25), store)
    }

    #[tokio::test(start_paused = true)]
    async fn short_listen_does_not_count() {
        let store = Arc::new(StubPlayStore::new());
        let tracker = tracker(Arc::clone(&store));
        let track = TrackId::generate();
        let alice = Username::new("alice");

        tracker.mark_started(&track, &alice).await;
        advance(Duration::from_secs(10)).await;

        assert!(!tracker.mark_completed(&track, &alice).await.unwrap());
        assert_eq!(store.plays(&track).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn listen_exactly_at_threshold_counts() {
        let store = Arc::new(StubPlayStore::new());
        let tracker = tracker(Arc::clone(&store));
        let track = TrackId::generate();
        let alice = Username::new("alice");

        tracker.mark_started(&track, &alice).await;
        advance(Duration::from_secs(25)).await;

        assert!(tracker.mark_completed(&track, &alice).await.unwrap());
        assert_eq!(store.plays(&track).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn completion_consumes_the_session() {
        let store = Arc::new(StubPlayStore::new());
        let tracker = tracker(Arc::clone(&store));
        let track = TrackId::generate();
        let alice = Username::new("alice");

        tracker.mark_started(&track, &alice).await;
        advance(Duration::from_secs(30)).await;

        assert!(tracker.mark_completed(&track, &alice).await.unwrap());
        // Second completion finds no pending session
        assert!(!tracker.mark_completed(&track, &alice).await.unwrap());
        assert_eq!(store.plays(&track).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn completion_without_start_is_ignored() {
        let store = Arc::new(StubPlayStore::new());
        let tracker = tracker(Arc::clone(&store));
        let track = TrackId::generate();

        assert!(!tracker
            .mark_completed(&track, &Username::new("alice"))
            .await
            .unwrap());
        assert_eq!(store.plays(&track).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_resets_the_gate() {
        let store = Arc::new(StubPlayStore::new());
        let tracker = tracker(Arc::clone(&store));
        let track = TrackId::generate();
        let alice = Username::new("alice");

        tracker.mark_started(&track, &alice).await;
        advance(Duration::from_secs(20)).await;
        // Restarting replaces the earlier timestamp
        tracker.mark_started(&track, &alice).await;
        advance(Duration::from_secs(10)).await;

        assert!(!tracker.mark_completed(&track, &alice).await.unwrap());
        assert_eq!(store.plays(&track).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn listeners_are_tracked_independently() {
        let store = Arc::new(StubPlayStore::new());
        let tracker = tracker(Arc::clone(&store));
        let track = TrackId::generate();
        let alice = Username::new("alice");
        let bob = Username::new("bob");

        tracker.mark_started(&track, &alice).await;
        advance(Duration::from_secs(10)).await;
        tracker.mark_started(&track, &bob).await;
        advance(Duration::from_secs(20)).await;

        // Alice listened 30s, Bob only 20s
        assert!(tracker.mark_completed(&track, &alice).await.unwrap());
        assert!(!tracker.mark_completed(&track, &bob).await.unwrap());
        assert_eq!(store.plays(&track).await, 1);
    }
}
