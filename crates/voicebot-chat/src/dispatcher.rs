//! Message dispatcher: one remote attempt per turn, local fallback on failure.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};
use voicebot_core::{
    EventBus, InputModality, ReplyMetadata, ReplySource, SessionEvent, SessionIdentity,
    SpeechOutput, TranscriptEntry, TurnId, View,
};

use crate::client::{ChatClient, ChatReply, ChatRequest, RequestContext};
use crate::error::ChatError;
use crate::fallback::FallbackResponder;
use crate::transcript::Transcript;

/// Default client-side bound on one remote call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

/// Default maximum message length in characters.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Session state sent along with every message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchContext {
    pub language_tag: String,
    pub current_view: View,
}

impl Default for DispatchContext {
    fn default() -> Self {
        Self {
            language_tag: "en-IN".to_string(),
            current_view: View::Chat,
        }
    }
}

/// Runs the send pipeline for each user turn.
pub struct MessageDispatcher {
    client: Option<Arc<dyn ChatClient>>,
    fallback: FallbackResponder,
    transcript: Arc<Transcript>,
    speech: Arc<dyn SpeechOutput>,
    events: EventBus,
    timeout: Duration,
    max_message_length: usize,
    next_turn: AtomicU64,
    session: OnceLock<SessionIdentity>,
}

impl MessageDispatcher {
    /// `client` may be `None`, in which case every turn is answered locally.
    pub fn new(
        client: Option<Arc<dyn ChatClient>>,
        transcript: Arc<Transcript>,
        speech: Arc<dyn SpeechOutput>,
        events: EventBus,
    ) -> Result<Self, ChatError> {
        Ok(Self {
            client,
            fallback: FallbackResponder::new()?,
            transcript,
            speech,
            events,
            timeout: DEFAULT_TIMEOUT,
            max_message_length: MAX_MESSAGE_LENGTH,
            next_turn: AtomicU64::new(1),
            session: OnceLock::new(),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_message_length(mut self, max: usize) -> Self {
        self.max_message_length = max;
        self
    }

    pub fn transcript(&self) -> &Arc<Transcript> {
        &self.transcript
    }

    /// Identity attached to every dispatched message, created on first use.
    pub fn session_identity(&self) -> SessionIdentity {
        *self.session.get_or_init(|| {
            let id = SessionIdentity::generate();
            info!(session_id = %id, "Session identity created");
            id
        })
    }

    /// Check a message before it becomes a turn.
    pub fn validate(&self, text: &str) -> Result<String, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if text.chars().count() > self.max_message_length {
            return Err(ChatError::MessageTooLong(self.max_message_length));
        }
        Ok(text.to_string())
    }

    /// Dispatch one user message and return the assistant entry answering it.
    ///
    /// Only validation errors are returned. Once the user entry is appended,
    /// the turn always ends with exactly one assistant entry: the remote
    /// reply, or the local fallback on timeout, network or payload failure.
    pub async fn send(
        &self,
        text: &str,
        modality: InputModality,
        ctx: &DispatchContext,
    ) -> Result<TranscriptEntry, ChatError> {
        let text = self.validate(text)?;
        let turn = TurnId(self.next_turn.fetch_add(1, Ordering::SeqCst));
        let session_id = self.session_identity();

        self.transcript
            .append(TranscriptEntry::user(turn, text.clone(), modality));
        self.events.publish(SessionEvent::ComposingStarted { turn });

        let request = ChatRequest {
            text: text.clone(),
            language_tag: ctx.language_tag.clone(),
            session_identity: session_id,
            context: RequestContext {
                timestamp: Utc::now(),
                current_view: ctx.current_view,
            },
        };
        let outcome = self.call_remote(&request).await;

        self.events.publish(SessionEvent::ComposingFinished { turn });

        let (entry, suggestions) = match outcome {
            Ok(reply) => {
                let metadata = reply.metadata();
                let suggestions = metadata.suggested_replies.clone();
                info!(
                    session_id = %session_id,
                    turn = %turn,
                    intent = ?metadata.intent_label,
                    "Chat service replied"
                );
                let entry = TranscriptEntry::assistant(
                    turn,
                    reply.response,
                    ReplySource::Remote,
                    Some(metadata),
                );
                (entry, suggestions)
            }
            Err(e) => {
                warn!(session_id = %session_id, turn = %turn, error = %e, "Chat service failed, using fallback");
                let fallback = self.fallback.respond(&text);
                let metadata = ReplyMetadata {
                    intent_label: Some(fallback.intent_label.to_string()),
                    confidence: None,
                    suggested_replies: Vec::new(),
                };
                let entry = TranscriptEntry::assistant(
                    turn,
                    fallback.text,
                    ReplySource::Fallback,
                    Some(metadata),
                );
                (entry, Vec::new())
            }
        };

        self.transcript.append(entry.clone());
        self.speech.speak(&entry.text);
        self.transcript.offer_quick_replies(turn, suggestions);
        Ok(entry)
    }

    async fn call_remote(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        let client = self.client.as_ref().ok_or(ChatError::NotConfigured)?;
        match tokio::time::timeout(self.timeout, client.send(request)).await {
            Ok(result) => result?.validate(),
            Err(_) => Err(ChatError::Timeout(self.timeout)),
        }
    }
}
