use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Who produced a transcript entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// The customer.
    User,
    /// A reply, either from the chat service or the local fallback.
    Assistant,
    /// Status lines written by the session itself (report results, help).
    System,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::User => write!(f, "user"),
            Speaker::Assistant => write!(f, "assistant"),
            Speaker::System => write!(f, "system"),
        }
    }
}

/// How the text of an entry reached the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputModality {
    /// Recognized from voice capture.
    Voice,
    /// Typed into the message box (default).
    #[default]
    Typed,
}

/// Notification severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Success => write!(f, "success"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Where an assistant reply came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    /// The remote chat service answered.
    Remote,
    /// The deterministic local rule table answered.
    Fallback,
}

/// Voice capture state. Exactly one instance lives in the voice controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
    /// Not capturing. Ready to start.
    #[default]
    Idle,
    /// Platform capture is running.
    Listening,
    /// A platform error was reported; the controller leaves this state immediately.
    Error,
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureState::Idle => write!(f, "Idle"),
            CaptureState::Listening => write!(f, "Listening"),
            CaptureState::Error => write!(f, "Error"),
        }
    }
}

impl CaptureState {
    /// Returns whether a transition from `self` to `target` is valid.
    ///
    /// Idle -> Listening (start), Listening -> Idle (result or stop),
    /// Listening -> Error (platform error), Error -> Idle (recovery).
    pub fn can_transition_to(&self, target: &CaptureState) -> bool {
        matches!(
            (self, target),
            (CaptureState::Idle, CaptureState::Listening)
                | (CaptureState::Listening, CaptureState::Idle)
                | (CaptureState::Listening, CaptureState::Error)
                | (CaptureState::Error, CaptureState::Idle)
        )
    }
}

/// The view currently shown by the UI. Sent as dispatch context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Chat,
    Dashboard,
    Analytics,
    Reports,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Chat => write!(f, "chat"),
            View::Dashboard => write!(f, "dashboard"),
            View::Analytics => write!(f, "analytics"),
            View::Reports => write!(f, "reports"),
        }
    }
}

/// Colour theme toggled by voice command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

// =============================================================================
// Newtype Wrappers
// =============================================================================

/// Identifies one dispatched turn. Replies are correlated by this id, never by call order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TurnId(pub u64);

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Process-lifetime identifier attached to every dispatched message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionIdentity(pub Uuid);

impl SessionIdentity {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Transcript
// =============================================================================

/// Optional reply metadata carried by assistant entries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplyMetadata {
    pub intent_label: Option<String>,
    /// Confidence in [0, 1]. Always `None` for fallback replies.
    pub confidence: Option<f32>,
    #[serde(default)]
    pub suggested_replies: Vec<String>,
}

/// One line of the conversation. Immutable once appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub id: Uuid,
    pub speaker: Speaker,
    pub text: String,
    pub input_modality: InputModality,
    pub timestamp: DateTime<Utc>,
    /// Turn this entry belongs to. System entries have none.
    pub turn: Option<TurnId>,
    /// Set on assistant entries only.
    pub source: Option<ReplySource>,
    pub metadata: Option<ReplyMetadata>,
}

impl TranscriptEntry {
    pub fn user(turn: TurnId, text: impl Into<String>, modality: InputModality) -> Self {
        Self {
            id: Uuid::new_v4(),
            speaker: Speaker::User,
            text: text.into(),
            input_modality: modality,
            timestamp: Utc::now(),
            turn: Some(turn),
            source: None,
            metadata: None,
        }
    }

    pub fn assistant(
        turn: TurnId,
        text: impl Into<String>,
        source: ReplySource,
        metadata: Option<ReplyMetadata>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            speaker: Speaker::Assistant,
            text: text.into(),
            input_modality: InputModality::Typed,
            timestamp: Utc::now(),
            turn: Some(turn),
            source: Some(source),
            metadata,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            speaker: Speaker::System,
            text: text.into(),
            input_modality: InputModality::Typed,
            timestamp: Utc::now(),
            turn: None,
            source: None,
            metadata: None,
        }
    }

    /// Suggested replies carried by this entry, or an empty slice.
    pub fn suggested_replies(&self) -> &[String] {
        self.metadata
            .as_ref()
            .map(|m| m.suggested_replies.as_slice())
            .unwrap_or(&[])
    }
}

// =============================================================================
// Notifications
// =============================================================================

/// One entry of the notification feed. Only `read` ever changes after posting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

// =============================================================================
// Metrics
// =============================================================================

/// Point-in-time business KPIs driving the dashboard and the report.
///
/// Invariants: `conversations` and `leads` never decrease between snapshots,
/// `satisfaction_percent` stays within [0, 100].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub conversations: u64,
    pub leads: u64,
    pub revenue_minor_units: u64,
    pub satisfaction_percent: f64,
    pub timestamp: DateTime<Utc>,
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self {
            conversations: 1_247,
            leads: 89,
            revenue_minor_units: 245_000_000,
            satisfaction_percent: 94.0,
            timestamp: Utc::now(),
        }
    }
}

impl MetricsSnapshot {
    /// Lead conversion rate as a percentage of conversations.
    pub fn conversion_percent(&self) -> f64 {
        if self.conversations == 0 {
            0.0
        } else {
            self.leads as f64 / self.conversations as f64 * 100.0
        }
    }

    /// Revenue in major currency units (rupees).
    pub fn revenue_major_units(&self) -> f64 {
        self.revenue_minor_units as f64 / 100.0
    }
}

// =============================================================================
// Languages
// =============================================================================

/// A supported speech/chat language.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

/// Language tags the session accepts, in display order.
pub const SUPPORTED_LANGUAGES: &[Language] = &[
    Language { code: "en-IN", name: "English (India)" },
    Language { code: "hi-IN", name: "हिंदी (Hindi)" },
    Language { code: "ta-IN", name: "தமிழ் (Tamil)" },
    Language { code: "te-IN", name: "తెలుగు (Telugu)" },
    Language { code: "mr-IN", name: "मराठी (Marathi)" },
    Language { code: "gu-IN", name: "ગુજરાતી (Gujarati)" },
    Language { code: "bn-IN", name: "বাংলা (Bengali)" },
];

pub fn is_supported_language(tag: &str) -> bool {
    SUPPORTED_LANGUAGES
        .iter()
        .any(|l| l.code.eq_ignore_ascii_case(tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_entry_fields() {
        let entry = TranscriptEntry::user(TurnId(3), "hello", InputModality::Voice);
        assert_eq!(entry.speaker, Speaker::User);
        assert_eq!(entry.turn, Some(TurnId(3)));
        assert_eq!(entry.input_modality, InputModality::Voice);
        assert!(entry.source.is_none());
        assert!(entry.suggested_replies().is_empty());
    }

    #[test]
    fn test_assistant_entry_suggestions() {
        let meta = ReplyMetadata {
            intent_label: Some("pricing".into()),
            confidence: Some(0.9),
            suggested_replies: vec!["EMI options".into(), "Book a test ride".into()],
        };
        let entry = TranscriptEntry::assistant(TurnId(1), "Prices start at 55,000", ReplySource::Remote, Some(meta));
        assert_eq!(entry.speaker, Speaker::Assistant);
        assert_eq!(entry.suggested_replies().len(), 2);
        assert_eq!(entry.source, Some(ReplySource::Remote));
    }

    #[test]
    fn test_system_entry_has_no_turn() {
        let entry = TranscriptEntry::system("Report ready");
        assert_eq!(entry.speaker, Speaker::System);
        assert!(entry.turn.is_none());
    }

    #[test]
    fn test_capture_transitions() {
        assert!(CaptureState::Idle.can_transition_to(&CaptureState::Listening));
        assert!(CaptureState::Listening.can_transition_to(&CaptureState::Idle));
        assert!(CaptureState::Listening.can_transition_to(&CaptureState::Error));
        assert!(CaptureState::Error.can_transition_to(&CaptureState::Idle));

        assert!(!CaptureState::Idle.can_transition_to(&CaptureState::Error));
        assert!(!CaptureState::Idle.can_transition_to(&CaptureState::Idle));
        assert!(!CaptureState::Error.can_transition_to(&CaptureState::Listening));
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }

    #[test]
    fn test_display_impls() {
        assert_eq!(Speaker::Assistant.to_string(), "assistant");
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(CaptureState::Listening.to_string(), "Listening");
        assert_eq!(View::Dashboard.to_string(), "dashboard");
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&ReplySource::Fallback).unwrap();
        assert_eq!(json, "\"fallback\"");
        let view: View = serde_json::from_str("\"analytics\"").unwrap();
        assert_eq!(view, View::Analytics);
    }

    #[test]
    fn test_conversion_percent() {
        let snap = MetricsSnapshot {
            conversations: 200,
            leads: 50,
            revenue_minor_units: 0,
            satisfaction_percent: 90.0,
            timestamp: Utc::now(),
        };
        assert!((snap.conversion_percent() - 25.0).abs() < f64::EPSILON);

        let empty = MetricsSnapshot { conversations: 0, ..snap };
        assert_eq!(empty.conversion_percent(), 0.0);
    }

    #[test]
    fn test_supported_languages() {
        assert_eq!(SUPPORTED_LANGUAGES.len(), 7);
        assert!(is_supported_language("en-IN"));
        assert!(is_supported_language("ta-in"));
        assert!(!is_supported_language("fr-FR"));
    }
}
