//! Deterministic mock data.
//!
//! Every generator is a pure function of `(seed, size)`: the same arguments
//! always produce the same collection. Used whenever a data source is
//! unreachable or not configured.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use voicebot_core::MetricsSnapshot;

use crate::catalogue::CATALOGUE;

const CUSTOMER_SALT: u64 = 0x0C05_7E11;
const INVENTORY_SALT: u64 = 0x1A7E_0B0C;
const METRICS_SALT: u64 = 0x3E7B_1C55;

const FIRST_NAMES: &[&str] = &[
    "Aarav", "Priya", "Rohan", "Ananya", "Vikram", "Sneha", "Arjun", "Kavya", "Rahul", "Meera",
    "Karthik", "Divya", "Amit", "Pooja", "Suresh", "Lakshmi",
];
const LAST_NAMES: &[&str] = &[
    "Sharma", "Patel", "Iyer", "Reddy", "Nair", "Gupta", "Singh", "Rao", "Menon", "Joshi",
    "Kulkarni", "Das",
];
const CITIES: &[&str] = &[
    "Bengaluru", "Chennai", "Hyderabad", "Mumbai", "Pune", "Delhi", "Kolkata", "Ahmedabad",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Converted,
}

/// A customer or lead. Money in minor units (paise).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub city: String,
    pub interested_model: String,
    /// 0-100.
    pub lead_score: u8,
    pub purchase_value_minor_units: u64,
    pub status: LeadStatus,
    pub last_contact: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    pub const LOW_STOCK_THRESHOLD: u32 = 5;

    pub fn from_units(units: u32) -> Self {
        match units {
            0 => StockStatus::OutOfStock,
            n if n < Self::LOW_STOCK_THRESHOLD => StockStatus::LowStock,
            _ => StockStatus::InStock,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::InStock => "In stock",
            StockStatus::LowStock => "Low stock",
            StockStatus::OutOfStock => "Out of stock",
        }
    }
}

/// Stock level for one catalogue model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub model: String,
    pub category: String,
    pub price_minor_units: u64,
    pub units_in_stock: u32,
    pub units_sold_this_month: u32,
    pub status: StockStatus,
}

fn rng_for(seed: u64, size: usize, salt: u64) -> StdRng {
    StdRng::seed_from_u64(seed ^ salt ^ (size as u64).rotate_left(32))
}

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items[rng.random_range(0..items.len())]
}

/// `size` customers with scores, values and statuses drawn from `seed`.
pub fn mock_customers(seed: u64, size: usize) -> Vec<Customer> {
    let mut rng = rng_for(seed, size, CUSTOMER_SALT);
    let epoch = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default();

    (0..size)
        .map(|i| {
            let model = &CATALOGUE[rng.random_range(0..CATALOGUE.len())];
            let lead_score: u8 = rng.random_range(10..=100);
            let status = match lead_score {
                90..=100 => LeadStatus::Converted,
                70..=89 => LeadStatus::Qualified,
                40..=69 => LeadStatus::Contacted,
                _ => LeadStatus::New,
            };
            let purchase_value_minor_units = if status == LeadStatus::Converted {
                model.price * 100
            } else {
                0
            };
            Customer {
                id: format!("CUST-{:04}", i + 1),
                name: format!("{} {}", pick(&mut rng, FIRST_NAMES), pick(&mut rng, LAST_NAMES)),
                city: pick(&mut rng, CITIES).to_string(),
                interested_model: model.name.to_string(),
                lead_score,
                purchase_value_minor_units,
                status,
                last_contact: epoch + Duration::hours(rng.random_range(0..24 * 365)),
            }
        })
        .collect()
}

/// Inventory rows for the first `size` catalogue models (cycling if larger).
pub fn mock_inventory(seed: u64, size: usize) -> Vec<InventoryItem> {
    let mut rng = rng_for(seed, size, INVENTORY_SALT);
    (0..size)
        .map(|i| {
            let model = &CATALOGUE[i % CATALOGUE.len()];
            let units_in_stock: u32 = rng.random_range(0..=30);
            InventoryItem {
                model: model.name.to_string(),
                category: model.category.to_string(),
                price_minor_units: model.price * 100,
                units_in_stock,
                units_sold_this_month: rng.random_range(0..=40),
                status: StockStatus::from_units(units_in_stock),
            }
        })
        .collect()
}

/// A plausible starting snapshot.
pub fn mock_metrics(seed: u64) -> MetricsSnapshot {
    let mut rng = rng_for(seed, 1, METRICS_SALT);
    let conversations: u64 = rng.random_range(1_000..=1_500);
    MetricsSnapshot {
        conversations,
        leads: conversations * rng.random_range(5..=9) / 100,
        revenue_minor_units: rng.random_range(200_000_000..=300_000_000),
        satisfaction_percent: rng.random_range(88.0..=97.0),
        timestamp: Utc::now(),
    }
}

/// Monthly sales counts for the last `months` months, oldest first.
pub fn mock_monthly_sales(seed: u64, months: usize) -> Vec<u64> {
    let mut rng = rng_for(seed, months, CUSTOMER_SALT ^ INVENTORY_SALT);
    let mut level: u64 = rng.random_range(60..=90);
    (0..months)
        .map(|_| {
            level += rng.random_range(0..=15);
            level
        })
        .collect()
}

/// Customers ranked by lead score, then purchase value, both descending.
pub fn top_customers(customers: &[Customer], n: usize) -> Vec<Customer> {
    let mut ranked = customers.to_vec();
    ranked.sort_by(|a, b| {
        b.lead_score
            .cmp(&a.lead_score)
            .then(b.purchase_value_minor_units.cmp(&a.purchase_value_minor_units))
            .then(a.id.cmp(&b.id))
    });
    ranked.truncate(n);
    ranked
}
