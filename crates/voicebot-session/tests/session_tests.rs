//! End-to-end behavior of the session controller with fake collaborators.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use voicebot_chat::{ChatClient, ChatError, ChatReply, ChatRequest};
use voicebot_command::CommandAction;
use voicebot_core::{
    CaptureState, InputModality, ReplySource, SessionEvent, Severity, Speaker, Theme, View,
    VoicebotConfig,
};
use voicebot_insight::{
    Artifact, ArtifactSink, ChartImage, ChartRenderer, ChartSpec, InsightError,
    MemoryArtifactSink, SvgChartRenderer,
};
use voicebot_session::{Collaborators, SessionController, SessionError, UtteranceOutcome};
use voicebot_voice::{SpeechParams, VoiceError, VoicePlatform};

// =============================================================================
// Fakes
// =============================================================================

struct EchoClient {
    calls: AtomicUsize,
}

#[async_trait]
impl ChatClient for EchoClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        // Later calls finish first.
        tokio::time::sleep(Duration::from_millis(40u64.saturating_sub(n as u64 * 10))).await;
        Ok(ChatReply {
            response: format!("echo: {}", request.text),
            intent_label: Some("echo".into()),
            confidence: Some(0.9),
            suggested_replies: Some(vec!["Book a test ride".into(), "Show offers".into()]),
        })
    }
}

struct OfflineClient;

#[async_trait]
impl ChatClient for OfflineClient {
    async fn send(&self, _request: &ChatRequest) -> Result<ChatReply, ChatError> {
        Err(ChatError::Network("connection refused".into()))
    }
}

#[derive(Default)]
struct Microphone {
    starts: AtomicUsize,
}

#[async_trait]
impl VoicePlatform for Microphone {
    fn capture_available(&self) -> bool {
        true
    }

    fn synthesis_available(&self) -> bool {
        false
    }

    async fn start_capture(&self, _language: &str) -> Result<(), VoiceError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stop_capture(&self) -> Result<(), VoiceError> {
        Ok(())
    }

    async fn speak(&self, _: &str, _: &str, _: SpeechParams) -> Result<(), VoiceError> {
        Err(VoiceError::SynthesisUnavailable)
    }
}

/// Fails while `failing` is set, then renders normally.
struct FlakyCharts {
    failing: AtomicBool,
    inner: SvgChartRenderer,
}

#[async_trait]
impl ChartRenderer for FlakyCharts {
    async fn render(&self, spec: &ChartSpec) -> Result<ChartImage, InsightError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(InsightError::Chart {
                chart: spec.id.clone(),
                reason: "renderer crashed".into(),
            });
        }
        self.inner.render(spec).await
    }
}

struct FullDisk;

#[async_trait]
impl ArtifactSink for FullDisk {
    async fn store(&self, _artifact: &Artifact) -> Result<String, InsightError> {
        Err(InsightError::Artifact("no space left on device".into()))
    }
}

/// Renders normally after a fixed delay per chart.
struct SlowCharts {
    delay: Duration,
    inner: SvgChartRenderer,
}

#[async_trait]
impl ChartRenderer for SlowCharts {
    async fn render(&self, spec: &ChartSpec) -> Result<ChartImage, InsightError> {
        tokio::time::sleep(self.delay).await;
        self.inner.render(spec).await
    }
}

fn session_with(collaborators: Collaborators) -> SessionController {
    SessionController::new(&VoicebotConfig::default(), collaborators).unwrap()
}

fn offline_session() -> SessionController {
    session_with(Collaborators::offline())
}

// =============================================================================
// Dispatch
// =============================================================================

#[tokio::test]
async fn test_every_user_turn_gets_one_reply() {
    let session = Arc::new(session_with(Collaborators {
        chat: Some(Arc::new(EchoClient {
            calls: AtomicUsize::new(0),
        })),
        ..Collaborators::offline()
    }));

    let mut handles = Vec::new();
    for i in 0..4 {
        let s = session.clone();
        handles.push(tokio::spawn(async move {
            s.send_typed(&format!("message {i}")).await
        }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    let entries = session.transcript().entries();
    let users: Vec<_> = entries.iter().filter(|e| e.speaker == Speaker::User).collect();
    assert_eq!(users.len(), 4);
    for user in users {
        let turn = user.turn.unwrap();
        let replies: Vec<_> = entries
            .iter()
            .filter(|e| e.speaker == Speaker::Assistant && e.turn == Some(turn))
            .collect();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].text, format!("echo: {}", user.text));
    }
}

#[tokio::test]
async fn test_test_ride_fallback_is_stable() {
    let session = session_with(Collaborators {
        chat: Some(Arc::new(OfflineClient)),
        ..Collaborators::offline()
    });

    let first = session.send_typed("I want to book a test ride").await.unwrap();
    let second = session.send_typed("I want to book a test ride").await.unwrap();

    assert_eq!(first.source, Some(ReplySource::Fallback));
    assert!(first.text.starts_with("Test Ride Booking Made Easy!"));
    assert_eq!(first.text, second.text);
    assert!(first.metadata.as_ref().unwrap().confidence.is_none());
}

#[tokio::test]
async fn test_quick_reply_is_one_shot() {
    let session = session_with(Collaborators {
        chat: Some(Arc::new(EchoClient {
            calls: AtomicUsize::new(10),
        })),
        ..Collaborators::offline()
    });

    session.send_typed("hello").await.unwrap();
    assert_eq!(session.transcript().quick_replies().unwrap().replies.len(), 2);

    let reply = session.choose_quick_reply(1).await.unwrap();
    assert_eq!(reply.text, "echo: Show offers");

    // The new turn offered a fresh set; the chosen set is gone.
    session.transcript().take_quick_reply(0).unwrap();
    assert!(matches!(
        session.choose_quick_reply(0).await,
        Err(SessionError::NoQuickReply(0))
    ));
}

#[tokio::test]
async fn test_empty_message_is_rejected() {
    let session = offline_session();
    assert!(matches!(
        session.send_typed("   ").await,
        Err(SessionError::Chat(ChatError::EmptyMessage))
    ));
    assert!(session.transcript().is_empty());
}

// =============================================================================
// Voice and commands
// =============================================================================

#[tokio::test]
async fn test_command_is_not_dispatched() {
    let session = offline_session();
    let outcome = session
        .handle_utterance("please show dashboard now", InputModality::Voice)
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        UtteranceOutcome::Command {
            action: CommandAction::ShowDashboard
        }
    ));
    assert_eq!(session.view(), View::Dashboard);
    assert!(session.transcript().is_empty());

    let notes = session.feed().list();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].severity, Severity::Success);
    assert!(notes[0].message.contains("Show dashboard"));
}

#[tokio::test]
async fn test_unmatched_utterance_is_dispatched() {
    let session = offline_session();
    let outcome = session
        .handle_utterance("what is the price of the scooter", InputModality::Voice)
        .await
        .unwrap();

    match outcome {
        UtteranceOutcome::Reply { entry } => assert_eq!(entry.speaker, Speaker::Assistant),
        other => panic!("unexpected outcome: {other:?}"),
    }
    let user = &session.transcript().entries()[0];
    assert_eq!(user.input_modality, InputModality::Voice);
}

#[tokio::test]
async fn test_capture_unavailable_warns_once() {
    let session = offline_session();
    let result = session.start_listening().await;

    assert!(matches!(
        result,
        Err(SessionError::Voice(VoiceError::CaptureUnavailable))
    ));
    assert_eq!(session.capture_state(), CaptureState::Idle);
    assert_eq!(session.feed().len(), 1);
    assert_eq!(session.feed().count_by_severity(Severity::Warning), 1);
}

#[tokio::test]
async fn test_capture_result_runs_command() {
    let mic = Arc::new(Microphone::default());
    let session = session_with(Collaborators {
        platform: mic.clone(),
        ..Collaborators::offline()
    });

    session.start_listening().await.unwrap();
    assert_eq!(session.capture_state(), CaptureState::Listening);

    let outcome = session.handle_capture_result("Dark mode please").await.unwrap();
    assert!(matches!(
        outcome,
        Some(UtteranceOutcome::Command {
            action: CommandAction::ToggleTheme
        })
    ));
    assert_eq!(session.theme(), Theme::Dark);
    assert_eq!(session.capture_state(), CaptureState::Idle);
    assert_eq!(mic.starts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_capture_error_returns_to_idle() {
    let session = session_with(Collaborators {
        platform: Arc::new(Microphone::default()),
        ..Collaborators::offline()
    });

    session.start_listening().await.unwrap();
    session.handle_capture_error("no-speech");

    assert_eq!(session.capture_state(), CaptureState::Idle);
    assert_eq!(session.feed().count_by_severity(Severity::Error), 1);

    // Capture can start again afterwards.
    session.start_listening().await.unwrap();
}

#[tokio::test]
async fn test_help_appends_system_entry() {
    let session = offline_session();
    session
        .handle_utterance("list commands", InputModality::Voice)
        .await
        .unwrap();

    let entries = session.transcript().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].speaker, Speaker::System);
    assert!(entries[0].text.starts_with("Available voice commands:"));
}

#[tokio::test]
async fn test_export_data() {
    let sink = Arc::new(MemoryArtifactSink::new());
    let session = session_with(Collaborators {
        artifacts: sink.clone(),
        ..Collaborators::offline()
    });
    session.send_typed("hello there").await.unwrap();

    let file_name = session.export_data().await.unwrap();
    assert!(file_name.starts_with("voicebot-export-"));

    let stored = sink.artifacts();
    assert_eq!(stored.len(), 1);
    let doc: serde_json::Value = serde_json::from_slice(&stored[0].bytes).unwrap();
    assert_eq!(doc["transcript"].as_array().unwrap().len(), 2);
    assert_eq!(doc["language"], "en-IN");
}

// =============================================================================
// Metrics and reports
// =============================================================================

#[tokio::test]
async fn test_metrics_never_regress() {
    let session = offline_session();
    let mut previous = session.metrics();
    for _ in 0..50 {
        let next = session.refresh_metrics().await;
        assert!(next.conversations >= previous.conversations);
        assert!(next.leads >= previous.leads);
        assert!((0.0..=100.0).contains(&next.satisfaction_percent));
        previous = next;
    }
    // The offline source is unconfigured, so drift is silent.
    assert!(session.feed().is_empty());
}

#[tokio::test]
async fn test_refresh_loop_runs_once() {
    let mut config = VoicebotConfig::default();
    config.metrics.refresh_interval_secs = 3600;
    let session = SessionController::new(&config, Collaborators::offline()).unwrap();

    assert!(session.start_refresh_loop().is_some());
    assert!(session.start_refresh_loop().is_none());
    session.shutdown().await;
    assert!(session.start_refresh_loop().is_some());
    session.shutdown().await;
}

#[tokio::test]
async fn test_chart_failure_then_success() {
    let sink = Arc::new(MemoryArtifactSink::new());
    let charts = Arc::new(FlakyCharts {
        failing: AtomicBool::new(true),
        inner: SvgChartRenderer::default(),
    });
    let session = session_with(Collaborators {
        charts: charts.clone(),
        artifacts: sink.clone(),
        ..Collaborators::offline()
    });
    let mut rx = session.events().subscribe();

    let err = session.compile_report().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Insight(InsightError::StageFailed { .. })
    ));
    assert!(sink.artifacts().is_empty());
    assert_eq!(session.feed().len(), 1);
    assert_eq!(session.feed().count_by_severity(Severity::Error), 1);

    charts.failing.store(false, Ordering::SeqCst);
    let outcome = session.compile_report().await.unwrap();
    assert_eq!(sink.artifacts().len(), 1);
    assert_eq!(sink.artifacts()[0].file_name, outcome.file_name);
    assert_eq!(session.feed().count_by_severity(Severity::Success), 1);

    let system: Vec<_> = session
        .transcript()
        .entries()
        .into_iter()
        .filter(|e| e.speaker == Speaker::System)
        .collect();
    assert_eq!(system.len(), 2);
    assert!(system[0].text.starts_with("Report generation failed"));
    assert!(system[1].text.starts_with("Report ready"));

    let mut failed = 0;
    let mut completed = 0;
    while let Ok(event) = rx.try_recv() {
        match event {
            SessionEvent::ReportFailed { .. } => failed += 1,
            SessionEvent::ReportCompleted { .. } => completed += 1,
            _ => {}
        }
    }
    assert_eq!((failed, completed), (1, 1));
}

#[tokio::test]
async fn test_notifications_newest_first() {
    let session = offline_session();
    session.set_view(View::Analytics);
    session.execute(CommandAction::ShowChat).await;
    session.execute(CommandAction::ToggleTheme).await;
    session.start_listening().await.ok();

    let notes = session.feed().list();
    assert_eq!(notes.len(), 3);
    for pair in notes.windows(2) {
        assert!(pair[0].id > pair[1].id);
    }
    assert_eq!(notes[0].severity, Severity::Warning);
}

// =============================================================================
// Voice commands with failing collaborators
// =============================================================================

#[tokio::test]
async fn test_report_command_failure_posts_only_the_error() {
    let session = session_with(Collaborators {
        charts: Arc::new(FlakyCharts {
            failing: AtomicBool::new(true),
            inner: SvgChartRenderer::default(),
        }),
        ..Collaborators::offline()
    });

    let outcome = session
        .handle_utterance("generate report", InputModality::Voice)
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        UtteranceOutcome::Command {
            action: CommandAction::GenerateReport
        }
    ));

    let notes = session.feed().list();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].severity, Severity::Error);
    assert!(notes[0].message.starts_with("Report generation failed during charts"));
}

#[tokio::test]
async fn test_report_command_success_is_confirmed() {
    let session = offline_session();
    assert!(session.execute(CommandAction::GenerateReport).await);
    assert_eq!(session.feed().count_by_severity(Severity::Error), 0);
    assert!(session
        .feed()
        .list()
        .iter()
        .any(|n| n.message == "Voice command executed: Generate report"));
}

#[tokio::test]
async fn test_export_command_failure_posts_only_the_error() {
    let session = session_with(Collaborators {
        artifacts: Arc::new(FullDisk),
        ..Collaborators::offline()
    });

    assert!(!session.execute(CommandAction::ExportData).await);

    let notes = session.feed().list();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].severity, Severity::Error);
    assert!(notes[0].message.starts_with("Export failed"));
}

#[tokio::test]
async fn test_superseded_report_command_posts_nothing() {
    let session = Arc::new(session_with(Collaborators {
        charts: Arc::new(SlowCharts {
            delay: Duration::from_millis(50),
            inner: SvgChartRenderer::default(),
        }),
        ..Collaborators::offline()
    }));

    let first = {
        let s = session.clone();
        tokio::spawn(async move { s.execute(CommandAction::GenerateReport).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = session.compile_report().await;

    assert!(!first.await.unwrap());
    assert!(second.is_ok());

    // Only the surviving compilation reports anything.
    let notes = session.feed().list();
    assert_eq!(notes.len(), 1);
    assert!(notes[0].message.starts_with("Report generated"));
}
