//! Paginated report document and its renderers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use voicebot_core::MetricsSnapshot;

use crate::chart::ChartImage;
use crate::error::InsightError;
use crate::mock::{Customer, InventoryItem};

/// Fixed recommendations closing every report.
pub const RECOMMENDATIONS: &[&str] = &[
    "Follow up with qualified leads within 24 hours to lift conversion.",
    "Restock low-stock models before the weekend rush.",
    "Promote zero down payment finance on premium models.",
    "Offer test rides for electric scooters to first-time buyers.",
    "Extend voice support to more regional languages.",
];

/// One page of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum ReportPage {
    Cover {
        title: String,
        generated_at: DateTime<Utc>,
        metrics: MetricsSnapshot,
        conversion_percent: f64,
    },
    Analytics {
        charts: Vec<ChartImage>,
    },
    Customers {
        top_n: usize,
        customers: Vec<Customer>,
    },
    Inventory {
        items: Vec<InventoryItem>,
        low_stock_count: usize,
    },
    Insights {
        recommendations: Vec<String>,
    },
}

impl ReportPage {
    pub fn name(&self) -> &'static str {
        match self {
            ReportPage::Cover { .. } => "cover",
            ReportPage::Analytics { .. } => "analytics",
            ReportPage::Customers { .. } => "customers",
            ReportPage::Inventory { .. } => "inventory",
            ReportPage::Insights { .. } => "insights",
        }
    }
}

/// A complete report: cover, analytics, customers, inventory, insights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub pages: Vec<ReportPage>,
}

impl ReportDocument {
    pub fn assemble(
        metrics: MetricsSnapshot,
        charts: Vec<ChartImage>,
        top_customers: Vec<Customer>,
        top_n: usize,
        inventory: Vec<InventoryItem>,
    ) -> Self {
        let generated_at = Utc::now();
        let title = "VoiceBot Business Report".to_string();
        let low_stock_count = inventory
            .iter()
            .filter(|i| i.status != crate::mock::StockStatus::InStock)
            .count();
        let conversion_percent = metrics.conversion_percent();

        Self {
            title: title.clone(),
            generated_at,
            pages: vec![
                ReportPage::Cover {
                    title,
                    generated_at,
                    metrics,
                    conversion_percent,
                },
                ReportPage::Analytics { charts },
                ReportPage::Customers {
                    top_n,
                    customers: top_customers,
                },
                ReportPage::Inventory {
                    items: inventory,
                    low_stock_count,
                },
                ReportPage::Insights {
                    recommendations: RECOMMENDATIONS.iter().map(|r| r.to_string()).collect(),
                },
            ],
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Document-rendering capability.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, InsightError>;

    fn media_type(&self) -> &'static str;

    /// File extension without the dot.
    fn extension(&self) -> &'static str;
}

/// Serializes the document as pretty-printed JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonDocumentRenderer;

impl DocumentRenderer for JsonDocumentRenderer {
    fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, InsightError> {
        Ok(serde_json::to_vec_pretty(document)?)
    }

    fn media_type(&self) -> &'static str {
        "application/json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}
