//! Chart specifications for the dashboard and report, and a default SVG
//! renderer.

use std::fmt::Write as _;

use async_trait::async_trait;
use chrono::{Datelike, Months};
use serde::{Deserialize, Serialize};
use voicebot_core::MetricsSnapshot;

use crate::error::InsightError;
use crate::mock::{mock_monthly_sales, InventoryItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    Doughnut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<f64>,
}

/// Renderer-independent description of one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

/// A rendered chart, embedded in the report document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartImage {
    pub chart_id: String,
    pub title: String,
    pub media_type: String,
    pub data: String,
}

impl ChartSpec {
    /// Monthly unit sales for the six months ending at the snapshot.
    pub fn sales_trend(snapshot: &MetricsSnapshot, seed: u64) -> Self {
        const MONTHS: usize = 6;
        let end = snapshot.timestamp.date_naive();
        let labels = (0..MONTHS)
            .rev()
            .map(|back| {
                end.checked_sub_months(Months::new(back as u32))
                    .map(|d| month_abbrev(d.month()).to_string())
                    .unwrap_or_default()
            })
            .collect();
        let values = mock_monthly_sales(seed, MONTHS)
            .into_iter()
            .map(|v| v as f64)
            .collect();
        Self {
            id: "sales_trend".to_string(),
            title: "Sales Trend".to_string(),
            kind: ChartKind::Line,
            labels,
            series: vec![ChartSeries {
                name: "Units sold".to_string(),
                values,
            }],
        }
    }

    /// Units sold this month per model.
    pub fn model_performance(inventory: &[InventoryItem]) -> Self {
        Self {
            id: "model_performance".to_string(),
            title: "Model Performance".to_string(),
            kind: ChartKind::Bar,
            labels: inventory.iter().map(|i| i.model.clone()).collect(),
            series: vec![ChartSeries {
                name: "Units sold this month".to_string(),
                values: inventory
                    .iter()
                    .map(|i| i.units_sold_this_month as f64)
                    .collect(),
            }],
        }
    }

    /// Quarterly revenue (lakh rupees) building up to the current total.
    pub fn quarterly_growth(snapshot: &MetricsSnapshot) -> Self {
        const SHARES: [f64; 4] = [0.62, 0.74, 0.87, 1.0];
        let lakh = snapshot.revenue_major_units() / 100_000.0;
        Self {
            id: "quarterly_growth".to_string(),
            title: "Quarterly Growth".to_string(),
            kind: ChartKind::Bar,
            labels: ["Q1", "Q2", "Q3", "Q4"].iter().map(|q| q.to_string()).collect(),
            series: vec![ChartSeries {
                name: "Revenue (lakh)".to_string(),
                values: SHARES.iter().map(|s| (lakh * s * 100.0).round() / 100.0).collect(),
            }],
        }
    }

    /// Share of this month's revenue by model category.
    pub fn revenue_distribution(inventory: &[InventoryItem]) -> Self {
        let mut categories: Vec<(String, f64)> = Vec::new();
        for item in inventory {
            let revenue = item.price_minor_units as f64 / 100.0 * item.units_sold_this_month as f64;
            match categories.iter_mut().find(|(c, _)| *c == item.category) {
                Some((_, total)) => *total += revenue,
                None => categories.push((item.category.clone(), revenue)),
            }
        }
        Self {
            id: "revenue_distribution".to_string(),
            title: "Revenue Distribution".to_string(),
            kind: ChartKind::Doughnut,
            labels: categories.iter().map(|(c, _)| c.clone()).collect(),
            series: vec![ChartSeries {
                name: "Revenue".to_string(),
                values: categories.into_iter().map(|(_, v)| v).collect(),
            }],
        }
    }

    fn has_data(&self) -> bool {
        !self.labels.is_empty() && self.series.iter().any(|s| !s.values.is_empty())
    }
}

fn month_abbrev(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    NAMES[(month.clamp(1, 12) - 1) as usize]
}

/// Charting capability.
#[async_trait]
pub trait ChartRenderer: Send + Sync {
    async fn render(&self, spec: &ChartSpec) -> Result<ChartImage, InsightError>;
}

/// Renders charts as standalone SVG documents. Doughnut charts are drawn as
/// horizontal percentage bars.
#[derive(Debug, Clone, Copy)]
pub struct SvgChartRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for SvgChartRenderer {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
        }
    }
}

const MARGIN: f64 = 40.0;
const PALETTE: [&str; 6] = ["#2563eb", "#16a34a", "#f59e0b", "#dc2626", "#7c3aed", "#0891b2"];

impl SvgChartRenderer {
    fn render_svg(&self, spec: &ChartSpec) -> String {
        let (w, h) = (self.width as f64, self.height as f64);
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            self.width, self.height, self.width, self.height
        );
        let _ = write!(
            svg,
            r#"<text x="{}" y="24" text-anchor="middle" font-size="16">{}</text>"#,
            w / 2.0,
            escape(&spec.title)
        );

        let values: &[f64] = spec.series.first().map(|s| s.values.as_slice()).unwrap_or(&[]);
        let plot_w = w - 2.0 * MARGIN;
        let plot_h = h - 2.0 * MARGIN;

        match spec.kind {
            ChartKind::Bar => {
                let max = values.iter().cloned().fold(0.0_f64, f64::max).max(1.0);
                let slot = plot_w / values.len().max(1) as f64;
                for (i, (value, label)) in values.iter().zip(&spec.labels).enumerate() {
                    let bar_h = value.max(0.0) / max * plot_h;
                    let x = MARGIN + i as f64 * slot + slot * 0.1;
                    let y = MARGIN + plot_h - bar_h;
                    let _ = write!(
                        svg,
                        r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"><title>{}: {}</title></rect>"#,
                        x,
                        y,
                        slot * 0.8,
                        bar_h,
                        PALETTE[i % PALETTE.len()],
                        escape(label),
                        value
                    );
                }
            }
            ChartKind::Line => {
                let max = values.iter().cloned().fold(0.0_f64, f64::max).max(1.0);
                let step = plot_w / (values.len().max(2) - 1) as f64;
                let points: Vec<String> = values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| {
                        format!(
                            "{:.1},{:.1}",
                            MARGIN + i as f64 * step,
                            MARGIN + plot_h - v.max(0.0) / max * plot_h
                        )
                    })
                    .collect();
                let _ = write!(
                    svg,
                    r#"<polyline fill="none" stroke="{}" stroke-width="2" points="{}"/>"#,
                    PALETTE[0],
                    points.join(" ")
                );
                for (i, label) in spec.labels.iter().enumerate() {
                    let _ = write!(
                        svg,
                        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="11">{}</text>"#,
                        MARGIN + i as f64 * step,
                        h - MARGIN / 2.0,
                        escape(label)
                    );
                }
            }
            ChartKind::Doughnut => {
                let total: f64 = values.iter().map(|v| v.max(0.0)).sum::<f64>().max(f64::EPSILON);
                let row = plot_h / values.len().max(1) as f64;
                for (i, (value, label)) in values.iter().zip(&spec.labels).enumerate() {
                    let share = value.max(0.0) / total;
                    let y = MARGIN + i as f64 * row;
                    let _ = write!(
                        svg,
                        r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/><text x="{:.1}" y="{:.1}" font-size="11">{} {:.1}%</text>"#,
                        MARGIN,
                        y,
                        share * plot_w * 0.7,
                        row * 0.7,
                        PALETTE[i % PALETTE.len()],
                        MARGIN + share * plot_w * 0.7 + 6.0,
                        y + row * 0.5,
                        escape(label),
                        share * 100.0
                    );
                }
            }
        }

        svg.push_str("</svg>");
        svg
    }
}

#[async_trait]
impl ChartRenderer for SvgChartRenderer {
    async fn render(&self, spec: &ChartSpec) -> Result<ChartImage, InsightError> {
        if !spec.has_data() {
            return Err(InsightError::Chart {
                chart: spec.id.clone(),
                reason: "no data".to_string(),
            });
        }
        Ok(ChartImage {
            chart_id: spec.id.clone(),
            title: spec.title.clone(),
            media_type: "image/svg+xml".to_string(),
            data: self.render_svg(spec),
        })
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
