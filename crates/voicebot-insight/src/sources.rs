//! Read-only data sources for metrics, customers and inventory.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use voicebot_core::MetricsSnapshot;

use crate::error::InsightError;
use crate::mock::{Customer, InventoryItem};

/// External business data. Any fetch may fail; callers substitute mock data.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_metrics(&self) -> Result<MetricsSnapshot, InsightError>;

    async fn fetch_customers(&self) -> Result<Vec<Customer>, InsightError>;

    async fn fetch_inventory(&self) -> Result<Vec<InventoryItem>, InsightError>;
}

/// Data source reading JSON documents over HTTP. Collections without a URL
/// report [`InsightError::NotConfigured`].
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    client: reqwest::Client,
    metrics_url: Option<String>,
    customers_url: Option<String>,
    inventory_url: Option<String>,
}

impl HttpDataSource {
    pub fn new(timeout: Duration) -> Result<Self, InsightError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                InsightError::DataSourceUnavailable(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            client,
            metrics_url: None,
            customers_url: None,
            inventory_url: None,
        })
    }

    pub fn with_metrics_url(mut self, url: Option<String>) -> Self {
        self.metrics_url = url;
        self
    }

    pub fn with_customers_url(mut self, url: Option<String>) -> Self {
        self.customers_url = url;
        self
    }

    pub fn with_inventory_url(mut self, url: Option<String>) -> Self {
        self.inventory_url = url;
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Option<&str>) -> Result<T, InsightError> {
        let url = url.ok_or(InsightError::NotConfigured)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| InsightError::DataSourceUnavailable(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(InsightError::DataSourceUnavailable(format!(
                "{} returned status {}",
                url,
                status.as_u16()
            )));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| InsightError::DataSourceUnavailable(format!("invalid payload: {e}")))
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn fetch_metrics(&self) -> Result<MetricsSnapshot, InsightError> {
        self.get_json(self.metrics_url.as_deref()).await
    }

    async fn fetch_customers(&self) -> Result<Vec<Customer>, InsightError> {
        self.get_json(self.customers_url.as_deref()).await
    }

    async fn fetch_inventory(&self) -> Result<Vec<InventoryItem>, InsightError> {
        self.get_json(self.inventory_url.as_deref()).await
    }
}

/// A source with nothing behind it. Every fetch reports
/// [`InsightError::NotConfigured`], so callers always use mock data.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineSource;

#[async_trait]
impl DataSource for OfflineSource {
    async fn fetch_metrics(&self) -> Result<MetricsSnapshot, InsightError> {
        Err(InsightError::NotConfigured)
    }

    async fn fetch_customers(&self) -> Result<Vec<Customer>, InsightError> {
        Err(InsightError::NotConfigured)
    }

    async fn fetch_inventory(&self) -> Result<Vec<InventoryItem>, InsightError> {
        Err(InsightError::NotConfigured)
    }
}
