//! Metrics and report pipeline for the voicebot session.
//!
//! - Periodic refresh of the business metrics snapshot, with bounded random
//!   drift when the data source is unreachable
//! - Read-only data sources with deterministic mock substitutes
//! - Chart specifications and a default SVG renderer
//! - Paginated report documents and staged report compilation
//! - Artifact sinks for reports and exports

pub mod artifact;
pub mod catalogue;
pub mod chart;
pub mod document;
pub mod error;
pub mod metrics;
pub mod mock;
pub mod report;
pub mod sources;

pub use artifact::{Artifact, ArtifactSink, FileArtifactSink, MemoryArtifactSink};
pub use catalogue::{BikeModel, Offer, CATALOGUE, OFFERS};
pub use chart::{ChartImage, ChartKind, ChartRenderer, ChartSpec, SvgChartRenderer};
pub use document::{DocumentRenderer, JsonDocumentRenderer, ReportDocument, ReportPage};
pub use error::InsightError;
pub use metrics::MetricsRefresher;
pub use mock::{Customer, InventoryItem, LeadStatus, StockStatus};
pub use report::{ReportCompiler, ReportOutcome, ReportSettings, ReportStage};
pub use sources::{DataSource, HttpDataSource, OfflineSource};
