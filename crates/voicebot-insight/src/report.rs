//! On-demand report compilation.
//!
//! A compilation runs four stages (gather, charts, document, export) and
//! publishes progress after each one. Starting a new compilation cancels the
//! one in flight; the cancelled run returns [`InsightError::Superseded`]
//! without posting anything.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use voicebot_core::{EventBus, MetricsSnapshot, SessionEvent, Severity};
use voicebot_notify::NotificationFeed;

use crate::artifact::{Artifact, ArtifactSink};
use crate::chart::{ChartImage, ChartRenderer, ChartSpec};
use crate::document::{DocumentRenderer, ReportDocument};
use crate::error::InsightError;
use crate::mock::{mock_customers, mock_inventory, top_customers, Customer, InventoryItem};
use crate::sources::DataSource;

const MOCK_CUSTOMER_POOL: usize = 50;
const MOCK_INVENTORY_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStage {
    Gathering,
    Charts,
    Document,
    Export,
}

impl ReportStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStage::Gathering => "gathering",
            ReportStage::Charts => "charts",
            ReportStage::Document => "document",
            ReportStage::Export => "export",
        }
    }

    /// Progress reported once the stage completes.
    pub fn percent(&self) -> u8 {
        match self {
            ReportStage::Gathering => 25,
            ReportStage::Charts => 50,
            ReportStage::Document => 75,
            ReportStage::Export => 100,
        }
    }
}

impl fmt::Display for ReportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub top_customers: usize,
    pub file_prefix: String,
    pub seed: u64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            top_customers: 10,
            file_prefix: "voicebot".to_string(),
            seed: 42,
        }
    }
}

/// Result of a successful compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportOutcome {
    pub file_name: String,
    pub location: String,
    pub media_type: String,
    pub page_count: usize,
    pub size_bytes: usize,
}

pub struct ReportCompiler {
    source: Arc<dyn DataSource>,
    charts: Arc<dyn ChartRenderer>,
    renderer: Arc<dyn DocumentRenderer>,
    sink: Arc<dyn ArtifactSink>,
    feed: Arc<NotificationFeed>,
    events: EventBus,
    settings: ReportSettings,
    generation: AtomicU64,
    in_flight: Mutex<Option<(u64, CancellationToken)>>,
}

impl ReportCompiler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Arc<dyn DataSource>,
        charts: Arc<dyn ChartRenderer>,
        renderer: Arc<dyn DocumentRenderer>,
        sink: Arc<dyn ArtifactSink>,
        feed: Arc<NotificationFeed>,
        events: EventBus,
        settings: ReportSettings,
    ) -> Self {
        Self {
            source,
            charts,
            renderer,
            sink,
            feed,
            events,
            settings,
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    pub fn is_compiling(&self) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Compile a report from `metrics` and store it through the artifact sink.
    pub async fn compile(&self, metrics: MetricsSnapshot) -> Result<ReportOutcome, InsightError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
            if let Some((previous, prior)) = in_flight.replace((generation, token.clone())) {
                info!(previous, generation, "Superseding in-flight report compilation");
                prior.cancel();
            }
        }

        info!(generation, "Report compilation started");
        let result = tokio::select! {
            _ = token.cancelled() => Err(InsightError::Superseded),
            result = self.run(metrics) => result,
        };

        {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
            if in_flight.as_ref().is_some_and(|(g, _)| *g == generation) {
                in_flight.take();
            }
        }

        match &result {
            Ok(outcome) => {
                info!(file = %outcome.file_name, pages = outcome.page_count, "Report compiled");
                self.feed.post(
                    format!("Report generated: {}", outcome.file_name),
                    Severity::Success,
                );
                self.events.publish(SessionEvent::ReportCompleted {
                    file_name: outcome.file_name.clone(),
                });
            }
            Err(InsightError::Superseded) => {
                info!(generation, "Report compilation superseded");
            }
            Err(e) => {
                let (stage, reason) = match e {
                    InsightError::StageFailed { stage, reason } => (stage.clone(), reason.clone()),
                    other => ("unknown".to_string(), other.to_string()),
                };
                error!(stage = %stage, error = %reason, "Report compilation failed");
                self.feed.post(
                    format!("Report generation failed during {}: {}", stage, reason),
                    Severity::Error,
                );
                self.events.publish(SessionEvent::ReportFailed { stage, reason });
            }
        }
        result
    }

    async fn run(&self, metrics: MetricsSnapshot) -> Result<ReportOutcome, InsightError> {
        let (customers, inventory) = self.gather().await;
        self.progress(ReportStage::Gathering);

        let specs = [
            ChartSpec::sales_trend(&metrics, self.settings.seed),
            ChartSpec::model_performance(&inventory),
            ChartSpec::quarterly_growth(&metrics),
            ChartSpec::revenue_distribution(&inventory),
        ];
        let mut images: Vec<ChartImage> = Vec::with_capacity(specs.len());
        for spec in &specs {
            let image = self
                .charts
                .render(spec)
                .await
                .map_err(|e| stage_failed(ReportStage::Charts, e))?;
            images.push(image);
        }
        self.progress(ReportStage::Charts);

        let top_n = self.settings.top_customers;
        let document = ReportDocument::assemble(
            metrics,
            images,
            top_customers(&customers, top_n),
            top_n,
            inventory,
        );
        let bytes = self
            .renderer
            .render(&document)
            .map_err(|e| stage_failed(ReportStage::Document, e))?;
        self.progress(ReportStage::Document);

        let artifact = Artifact {
            file_name: Artifact::dated_name(
                &self.settings.file_prefix,
                "report",
                Utc::now().date_naive(),
                self.renderer.extension(),
            ),
            media_type: self.renderer.media_type().to_string(),
            bytes,
        };
        let location = self
            .sink
            .store(&artifact)
            .await
            .map_err(|e| stage_failed(ReportStage::Export, e))?;
        self.progress(ReportStage::Export);

        Ok(ReportOutcome {
            file_name: artifact.file_name,
            location,
            media_type: artifact.media_type,
            page_count: document.page_count(),
            size_bytes: artifact.bytes.len(),
        })
    }

    /// Customers and inventory fall back to mock data independently.
    async fn gather(&self) -> (Vec<Customer>, Vec<InventoryItem>) {
        let seed = self.settings.seed;
        let (customers, inventory) =
            tokio::join!(self.source.fetch_customers(), self.source.fetch_inventory());

        let customers = match customers {
            Ok(c) if !c.is_empty() => c,
            Ok(_) => mock_customers(seed, MOCK_CUSTOMER_POOL),
            Err(e) => {
                warn!(error = %e, "Customer data unavailable, using mock data");
                mock_customers(seed, MOCK_CUSTOMER_POOL)
            }
        };
        let inventory = match inventory {
            Ok(i) if !i.is_empty() => i,
            Ok(_) => mock_inventory(seed, MOCK_INVENTORY_SIZE),
            Err(e) => {
                warn!(error = %e, "Inventory data unavailable, using mock data");
                mock_inventory(seed, MOCK_INVENTORY_SIZE)
            }
        };
        (customers, inventory)
    }

    fn progress(&self, stage: ReportStage) {
        self.events.publish(SessionEvent::ReportProgress {
            stage: stage.to_string(),
            percent: stage.percent(),
        });
    }
}

fn stage_failed(stage: ReportStage, err: InsightError) -> InsightError {
    InsightError::StageFailed {
        stage: stage.to_string(),
        reason: err.to_string(),
    }
}
