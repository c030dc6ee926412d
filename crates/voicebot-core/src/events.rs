use serde::Serialize;
use tokio::sync::broadcast;

use crate::types::{CaptureState, MetricsSnapshot, Notification, Theme, TranscriptEntry, TurnId, View};

/// Capacity of the session event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Observable changes inside the session controller.
///
/// Events are published on the [`EventBus`] and consumed by the SSE stream of
/// the local API. The composing indicator and quick replies only exist as
/// events; they never become transcript entries.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum SessionEvent {
    // =========================================================================
    // Conversation
    // =========================================================================
    TranscriptAppended {
        entry: TranscriptEntry,
    },
    ComposingStarted {
        turn: TurnId,
    },
    ComposingFinished {
        turn: TurnId,
    },
    QuickRepliesOffered {
        turn: TurnId,
        replies: Vec<String>,
    },
    QuickRepliesCleared,

    // =========================================================================
    // Notifications and voice
    // =========================================================================
    NotificationPosted {
        notification: Notification,
    },
    CaptureStateChanged {
        from: CaptureState,
        to: CaptureState,
    },

    // =========================================================================
    // UI state
    // =========================================================================
    ViewChanged {
        view: View,
    },
    ThemeChanged {
        theme: Theme,
    },

    // =========================================================================
    // Metrics and reports
    // =========================================================================
    MetricsRefreshed {
        snapshot: MetricsSnapshot,
    },
    ReportProgress {
        stage: String,
        percent: u8,
    },
    ReportCompleted {
        file_name: String,
    },
    ReportFailed {
        stage: String,
        reason: String,
    },
}

impl SessionEvent {
    /// Name used as the SSE event type.
    pub fn event_name(&self) -> &'static str {
        match self {
            SessionEvent::TranscriptAppended { .. } => "transcript_appended",
            SessionEvent::ComposingStarted { .. } => "composing_started",
            SessionEvent::ComposingFinished { .. } => "composing_finished",
            SessionEvent::QuickRepliesOffered { .. } => "quick_replies_offered",
            SessionEvent::QuickRepliesCleared => "quick_replies_cleared",
            SessionEvent::NotificationPosted { .. } => "notification_posted",
            SessionEvent::CaptureStateChanged { .. } => "capture_state_changed",
            SessionEvent::ViewChanged { .. } => "view_changed",
            SessionEvent::ThemeChanged { .. } => "theme_changed",
            SessionEvent::MetricsRefreshed { .. } => "metrics_refreshed",
            SessionEvent::ReportProgress { .. } => "report_progress",
            SessionEvent::ReportCompleted { .. } => "report_completed",
            SessionEvent::ReportFailed { .. } => "report_failed",
        }
    }
}

/// Fan-out of [`SessionEvent`]s to any number of subscribers.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
