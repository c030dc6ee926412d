//! Periodic metrics refresh.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use voicebot_core::{EventBus, MetricsSnapshot, SessionEvent, Severity};
use voicebot_notify::NotificationFeed;

use crate::error::InsightError;
use crate::mock::mock_metrics;
use crate::sources::DataSource;

/// Shortest accepted refresh interval.
const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Owns the current [`MetricsSnapshot`] and the refresh loop that updates it.
pub struct MetricsRefresher {
    source: Arc<dyn DataSource>,
    snapshot: Mutex<MetricsSnapshot>,
    rng: Mutex<StdRng>,
    feed: Arc<NotificationFeed>,
    events: EventBus,
    running: Mutex<Option<CancellationToken>>,
}

impl MetricsRefresher {
    pub fn new(
        source: Arc<dyn DataSource>,
        feed: Arc<NotificationFeed>,
        events: EventBus,
        seed: u64,
    ) -> Self {
        Self {
            source,
            snapshot: Mutex::new(mock_metrics(seed)),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            feed,
            events,
            running: Mutex::new(None),
        }
    }

    pub fn current(&self) -> MetricsSnapshot {
        self.snapshot.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Produce the next snapshot.
    ///
    /// Fetched values never lower `conversations` or `leads`. When the fetch
    /// fails the previous snapshot drifts by small non-negative amounts and a
    /// warning is posted; an unconfigured source drifts silently.
    pub async fn tick(&self) -> MetricsSnapshot {
        let result = self.source.fetch_metrics().await;
        let failure = match &result {
            Ok(_) | Err(InsightError::NotConfigured) => None,
            Err(e) => Some(e.to_string()),
        };

        let next = {
            let mut snapshot = self.snapshot.lock().unwrap_or_else(|e| e.into_inner());
            let next = match result {
                Ok(fetched) => merge_fetched(&snapshot, fetched),
                Err(_) => {
                    let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
                    apply_drift(&snapshot, &mut rng)
                }
            };
            *snapshot = next.clone();
            next
        };

        if let Some(reason) = failure {
            warn!(error = %reason, "Metrics fetch failed, applying drift");
            self.feed.post(
                format!("Live metrics unavailable, showing estimates ({})", reason),
                Severity::Warning,
            );
        }

        debug!(
            conversations = next.conversations,
            leads = next.leads,
            satisfaction = next.satisfaction_percent,
            "Metrics refreshed"
        );
        self.events.publish(SessionEvent::MetricsRefreshed {
            snapshot: next.clone(),
        });
        next
    }

    /// Start the refresh loop. Returns `None` if a loop is already running.
    pub fn start(self: &Arc<Self>, interval: Duration) -> Option<JoinHandle<()>> {
        let token = {
            let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
            if running.as_ref().is_some_and(|t| !t.is_cancelled()) {
                return None;
            }
            let token = CancellationToken::new();
            *running = Some(token.clone());
            token
        };

        let this = Arc::clone(self);
        let interval = interval.max(MIN_INTERVAL);
        info!(interval_ms = interval.as_millis() as u64, "Metrics refresh loop started");

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        this.tick().await;
                    }
                }
            }
            info!("Metrics refresh loop stopped");
        }))
    }

    pub fn stop(&self) {
        if let Some(token) = self
            .running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            token.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|t| !t.is_cancelled())
    }
}

fn merge_fetched(prev: &MetricsSnapshot, fetched: MetricsSnapshot) -> MetricsSnapshot {
    MetricsSnapshot {
        conversations: fetched.conversations.max(prev.conversations),
        leads: fetched.leads.max(prev.leads),
        revenue_minor_units: fetched.revenue_minor_units,
        satisfaction_percent: clamp_percent(fetched.satisfaction_percent, prev.satisfaction_percent),
        timestamp: Utc::now(),
    }
}

fn apply_drift(prev: &MetricsSnapshot, rng: &mut StdRng) -> MetricsSnapshot {
    let satisfaction = prev.satisfaction_percent + rng.random_range(-0.5..=0.5);
    MetricsSnapshot {
        conversations: prev.conversations.saturating_add(rng.random_range(0..=5)),
        leads: prev.leads.saturating_add(rng.random_range(0..=2)),
        revenue_minor_units: prev
            .revenue_minor_units
            .saturating_add(rng.random_range(0..=2_500_000)),
        satisfaction_percent: clamp_percent(satisfaction, prev.satisfaction_percent),
        timestamp: Utc::now(),
    }
}

/// Clamp to [0, 100]; NaN keeps the previous value.
fn clamp_percent(value: f64, previous: f64) -> f64 {
    if value.is_nan() {
        previous.clamp(0.0, 100.0)
    } else {
        value.clamp(0.0, 100.0)
    }
}
