//! The session controller.
//!
//! One [`SessionController`] is built per process with its collaborators
//! injected. It routes recognized speech to the command recognizer or the
//! message dispatcher, executes local actions, owns the view/theme/language
//! state, and runs the metrics refresh loop and report compilation.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use voicebot_chat::{ChatClient, DispatchContext, MessageDispatcher, Transcript};
use voicebot_command::{CommandAction, CommandRecognizer};
use voicebot_core::{
    is_supported_language, CaptureState, EventBus, InputModality, MetricsSnapshot, Notification,
    SessionEvent, SessionIdentity, Severity, Theme, TranscriptEntry, View, VoicebotConfig,
    VoicebotError, SUPPORTED_LANGUAGES,
};
use voicebot_insight::{
    Artifact, ArtifactSink, ChartRenderer, DataSource, DocumentRenderer, InsightError,
    JsonDocumentRenderer, MemoryArtifactSink, MetricsRefresher, OfflineSource, ReportCompiler,
    ReportOutcome, ReportSettings, SvgChartRenderer,
};
use voicebot_notify::NotificationFeed;
use voicebot_voice::{NullPlatform, SpeechParams, VoiceController, VoicePlatform};

use crate::error::SessionError;

/// External capabilities the session is built from.
pub struct Collaborators {
    pub platform: Arc<dyn VoicePlatform>,
    /// `None` answers every turn with the local fallback.
    pub chat: Option<Arc<dyn ChatClient>>,
    pub data: Arc<dyn DataSource>,
    pub charts: Arc<dyn ChartRenderer>,
    pub documents: Arc<dyn DocumentRenderer>,
    pub artifacts: Arc<dyn ArtifactSink>,
}

impl Collaborators {
    /// No voice, no chat service, mock data only, artifacts kept in memory.
    pub fn offline() -> Self {
        Self {
            platform: Arc::new(NullPlatform),
            chat: None,
            data: Arc::new(OfflineSource),
            charts: Arc::new(SvgChartRenderer::default()),
            documents: Arc::new(JsonDocumentRenderer),
            artifacts: Arc::new(MemoryArtifactSink::new()),
        }
    }
}

/// What happened to one utterance.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UtteranceOutcome {
    /// Matched a voice command; nothing was dispatched.
    Command { action: CommandAction },
    /// Dispatched; carries the assistant entry answering it.
    Reply { entry: TranscriptEntry },
}

#[derive(Serialize)]
struct ExportDocument {
    generated_at: DateTime<Utc>,
    session_identity: SessionIdentity,
    language: String,
    metrics: MetricsSnapshot,
    transcript: Vec<TranscriptEntry>,
    notifications: Vec<Notification>,
}

pub struct SessionController {
    events: EventBus,
    feed: Arc<NotificationFeed>,
    voice: Arc<VoiceController>,
    commands: CommandRecognizer,
    dispatcher: Arc<MessageDispatcher>,
    transcript: Arc<Transcript>,
    metrics: Arc<MetricsRefresher>,
    reports: Arc<ReportCompiler>,
    artifacts: Arc<dyn ArtifactSink>,
    view: Mutex<View>,
    theme: Mutex<Theme>,
    language: Mutex<String>,
    refresh_interval: Duration,
    file_prefix: String,
}

impl SessionController {
    pub fn new(config: &VoicebotConfig, collaborators: Collaborators) -> Result<Self, SessionError> {
        let language = canonical_language(&config.voice.language)
            .ok_or_else(|| VoicebotError::UnsupportedLanguage(config.voice.language.clone()))?;

        let events = EventBus::new();
        let feed = Arc::new(
            NotificationFeed::new(config.notifications.retention).with_events(events.clone()),
        );

        let voice = Arc::new(
            VoiceController::new(collaborators.platform, feed.clone(), events.clone())
                .with_language(language)
                .with_params(SpeechParams {
                    rate: config.voice.rate,
                    pitch: config.voice.pitch,
                    volume: config.voice.volume,
                }),
        );

        let transcript = Arc::new(Transcript::new(events.clone()));
        let dispatcher = MessageDispatcher::new(
            collaborators.chat,
            transcript.clone(),
            voice.clone(),
            events.clone(),
        )?
        .with_timeout(Duration::from_secs(config.chat.timeout_secs))
        .with_max_message_length(config.chat.max_message_length);

        let metrics = Arc::new(MetricsRefresher::new(
            collaborators.data.clone(),
            feed.clone(),
            events.clone(),
            config.metrics.seed,
        ));

        let reports = Arc::new(ReportCompiler::new(
            collaborators.data,
            collaborators.charts,
            collaborators.documents,
            collaborators.artifacts.clone(),
            feed.clone(),
            events.clone(),
            ReportSettings {
                top_customers: config.report.top_customers,
                file_prefix: config.report.file_prefix.clone(),
                seed: config.metrics.seed,
            },
        ));

        info!(
            language,
            capture = voice.capture_available(),
            synthesis = voice.synthesis_available(),
            "Session controller ready"
        );

        Ok(Self {
            events,
            feed,
            voice,
            commands: CommandRecognizer::new()?,
            dispatcher: Arc::new(dispatcher),
            transcript,
            metrics,
            reports,
            artifacts: collaborators.artifacts,
            view: Mutex::new(View::default()),
            theme: Mutex::new(Theme::default()),
            language: Mutex::new(language.to_string()),
            refresh_interval: Duration::from_secs(config.metrics.refresh_interval_secs),
            file_prefix: config.report.file_prefix.clone(),
        })
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn feed(&self) -> &Arc<NotificationFeed> {
        &self.feed
    }

    pub fn transcript(&self) -> &Arc<Transcript> {
        &self.transcript
    }

    pub fn voice(&self) -> &Arc<VoiceController> {
        &self.voice
    }

    pub fn commands(&self) -> &CommandRecognizer {
        &self.commands
    }

    pub fn session_identity(&self) -> SessionIdentity {
        self.dispatcher.session_identity()
    }

    pub fn capture_state(&self) -> CaptureState {
        self.voice.state()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.current()
    }

    pub fn view(&self) -> View {
        *self.view.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn theme(&self) -> Theme {
        *self.theme.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn language(&self) -> String {
        self.language.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_compiling_report(&self) -> bool {
        self.reports.is_compiling()
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    /// Route one utterance: a recognized command runs locally, anything
    /// else is dispatched unchanged.
    pub async fn handle_utterance(
        &self,
        text: &str,
        modality: InputModality,
    ) -> Result<UtteranceOutcome, SessionError> {
        if let Some(action) = self.commands.recognize(text) {
            self.execute(action).await;
            return Ok(UtteranceOutcome::Command { action });
        }
        let entry = self.dispatch(text.to_string(), modality).await?;
        Ok(UtteranceOutcome::Reply { entry })
    }

    /// Typed messages skip command recognition.
    pub async fn send_typed(&self, text: &str) -> Result<TranscriptEntry, SessionError> {
        self.dispatch(text.to_string(), InputModality::Typed).await
    }

    /// The voice platform recognized `text`. Returns `None` for empty results.
    pub async fn handle_capture_result(
        &self,
        text: &str,
    ) -> Result<Option<UtteranceOutcome>, SessionError> {
        match self.voice.on_result(text) {
            Some(utterance) => self
                .handle_utterance(&utterance, InputModality::Voice)
                .await
                .map(Some),
            None => Ok(None),
        }
    }

    pub fn handle_capture_error(&self, code: &str) {
        self.voice.on_error(code);
    }

    pub async fn start_listening(&self) -> Result<(), SessionError> {
        self.voice.start_capture().await?;
        Ok(())
    }

    pub async fn stop_listening(&self) {
        self.voice.stop_capture().await;
    }

    /// Consume the active quick reply at `index` and send it as a typed turn.
    pub async fn choose_quick_reply(&self, index: usize) -> Result<TranscriptEntry, SessionError> {
        let text = self
            .transcript
            .take_quick_reply(index)
            .ok_or(SessionError::NoQuickReply(index))?;
        self.dispatch(text, InputModality::Typed).await
    }

    /// The send pipeline runs on its own task, so a caller that goes away
    /// mid-turn still gets its assistant entry appended.
    async fn dispatch(
        &self,
        text: String,
        modality: InputModality,
    ) -> Result<TranscriptEntry, SessionError> {
        let dispatcher = self.dispatcher.clone();
        let ctx = DispatchContext {
            language_tag: self.language(),
            current_view: self.view(),
        };
        let entry = tokio::spawn(async move { dispatcher.send(&text, modality, &ctx).await })
            .await??;
        Ok(entry)
    }

    // -------------------------------------------------------------------------
    // Local actions
    // -------------------------------------------------------------------------

    /// Run a command action. The success confirmation is posted only when
    /// the action completed; export and report failures post their own error
    /// and a superseded report posts nothing. Returns whether it completed.
    pub async fn execute(&self, action: CommandAction) -> bool {
        info!(action = %action, "Executing voice command");
        let completed = match action {
            CommandAction::ShowDashboard => self.show(View::Dashboard),
            CommandAction::ShowChat => self.show(View::Chat),
            CommandAction::ShowAnalytics => self.show(View::Analytics),
            CommandAction::ShowReports => self.show(View::Reports),
            CommandAction::ToggleTheme => {
                self.toggle_theme();
                true
            }
            CommandAction::ExportData => self.export_data().await.is_ok(),
            CommandAction::GenerateReport => match self.compile_report().await {
                Ok(_) => true,
                Err(e) => {
                    warn!(error = %e, "Voice command did not complete");
                    false
                }
            },
            CommandAction::ShowHelp => {
                self.transcript
                    .append(TranscriptEntry::system(self.commands.help_text()));
                true
            }
            CommandAction::StopListening => {
                self.voice.stop_capture().await;
                true
            }
        };
        if completed {
            self.feed.post(
                format!("Voice command executed: {}", action.describe()),
                Severity::Success,
            );
        }
        completed
    }

    fn show(&self, view: View) -> bool {
        self.set_view(view);
        true
    }

    pub fn set_view(&self, view: View) {
        let changed = {
            let mut current = self.view.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::replace(&mut *current, view) != view
        };
        if changed {
            info!(view = %view, "View changed");
            self.events.publish(SessionEvent::ViewChanged { view });
        }
    }

    pub fn toggle_theme(&self) -> Theme {
        let theme = {
            let mut current = self.theme.lock().unwrap_or_else(|e| e.into_inner());
            *current = current.toggled();
            *current
        };
        self.events.publish(SessionEvent::ThemeChanged { theme });
        theme
    }

    /// Switch the active language tag. Unknown tags are rejected and leave
    /// the current language in place.
    pub fn set_language(&self, tag: &str) -> Result<(), SessionError> {
        let language = canonical_language(tag)
            .ok_or_else(|| VoicebotError::UnsupportedLanguage(tag.to_string()))?;
        *self.language.lock().unwrap_or_else(|e| e.into_inner()) = language.to_string();
        self.voice.set_language(language);
        info!(language, "Language changed");
        Ok(())
    }

    /// Write transcript, notifications and metrics to a dated JSON artifact.
    pub async fn export_data(&self) -> Result<String, SessionError> {
        let document = ExportDocument {
            generated_at: Utc::now(),
            session_identity: self.session_identity(),
            language: self.language(),
            metrics: self.metrics(),
            transcript: self.transcript.entries(),
            notifications: self.feed.list(),
        };
        let artifact = Artifact {
            file_name: Artifact::dated_name(
                &self.file_prefix,
                "export",
                document.generated_at.date_naive(),
                "json",
            ),
            media_type: "application/json".to_string(),
            bytes: serde_json::to_vec_pretty(&document).map_err(InsightError::from)?,
        };

        match self.artifacts.store(&artifact).await {
            Ok(location) => {
                info!(location = %location, "Session data exported");
                self.feed.post(
                    format!("Data exported: {}", artifact.file_name),
                    Severity::Success,
                );
                Ok(artifact.file_name)
            }
            Err(e) => {
                warn!(error = %e, "Export failed");
                self.feed
                    .post(format!("Export failed: {}", e), Severity::Error);
                Err(e.into())
            }
        }
    }

    // -------------------------------------------------------------------------
    // Metrics and reports
    // -------------------------------------------------------------------------

    /// Start the refresh loop. Returns `None` if it is already running.
    pub fn start_refresh_loop(&self) -> Option<JoinHandle<()>> {
        self.metrics.start(self.refresh_interval)
    }

    pub async fn refresh_metrics(&self) -> MetricsSnapshot {
        self.metrics.tick().await
    }

    /// Compile a report from the current snapshot. The outcome is also
    /// written to the transcript as a system entry; a superseded compilation
    /// leaves no trace.
    pub async fn compile_report(&self) -> Result<ReportOutcome, SessionError> {
        let reports = self.reports.clone();
        let snapshot = self.metrics();
        let result = tokio::spawn(async move { reports.compile(snapshot).await }).await?;

        match &result {
            Ok(outcome) => self.transcript.append(TranscriptEntry::system(format!(
                "Report ready: {} ({} pages)",
                outcome.file_name, outcome.page_count
            ))),
            Err(InsightError::Superseded) => {}
            Err(e) => self
                .transcript
                .append(TranscriptEntry::system(format!("Report generation failed: {}", e))),
        }
        Ok(result?)
    }

    /// Stop background work and release the microphone.
    pub async fn shutdown(&self) {
        self.metrics.stop();
        self.voice.stop_capture().await;
        info!("Session controller stopped");
    }
}

fn canonical_language(tag: &str) -> Option<&'static str> {
    if !is_supported_language(tag) {
        return None;
    }
    SUPPORTED_LANGUAGES
        .iter()
        .find(|l| l.code.eq_ignore_ascii_case(tag.trim()))
        .map(|l| l.code)
}
