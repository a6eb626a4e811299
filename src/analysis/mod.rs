use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use crate::foodlog::entry::{FoodLogEntry, MealType};
use crate::foodlog::store::FoodLogStore;

/// What gets handed to the external analysis provider.
#[derive(Debug, Clone)]
pub enum AnalysisInput {
    Image { data: Bytes, content_type: String },
    Text(String),
}

/// External nutrition-analysis collaborator. The provider owns its own
/// network and timeout policy; this core only consumes the record it
/// returns.
#[async_trait]
pub trait NutritionAnalyzer: Send + Sync {
    async fn analyze(&self, input: AnalysisInput) -> anyhow::Result<RawNutrition>;
}

/// Whatever shape the provider returned: every field optional, unknown
/// fields dropped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNutrition {
    pub name: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub meal_type: Option<String>,
    pub timestamp: Option<String>,
}

impl RawNutrition {
    /// Coerces the untrusted record into a typed entry: missing numbers
    /// become 0, odd meal types fall back to snack, an unreadable
    /// timestamp becomes `now`. A fresh id is always assigned.
    pub fn into_entry(self, now: OffsetDateTime) -> FoodLogEntry {
        let timestamp = self
            .timestamp
            .as_deref()
            .and_then(|ts| match OffsetDateTime::parse(ts, &Rfc3339) {
                Ok(t) => Some(t),
                Err(e) => {
                    warn!(timestamp = %ts, error = %e, "unreadable analysis timestamp, using now");
                    None
                }
            })
            .unwrap_or(now);
        FoodLogEntry {
            id: Uuid::new_v4().to_string(),
            name: self.name.unwrap_or_else(|| "Unknown food".to_string()),
            calories: self.calories.unwrap_or(0.0),
            protein: self.protein.unwrap_or(0.0),
            carbs: self.carbs.unwrap_or(0.0),
            fat: self.fat.unwrap_or(0.0),
            fiber: self.fiber.unwrap_or(0.0),
            sugar: self.sugar.unwrap_or(0.0),
            meal_type: self
                .meal_type
                .as_deref()
                .map(MealType::parse_lenient)
                .unwrap_or_default(),
            timestamp,
        }
    }
}

/// Runs the provider and persists the coerced entry.
pub async fn log_analyzed(
    analyzer: &dyn NutritionAnalyzer,
    store: &FoodLogStore,
    input: AnalysisInput,
    now: OffsetDateTime,
) -> anyhow::Result<FoodLogEntry> {
    let raw = analyzer.analyze(input).await?;
    let entry = raw.into_entry(now);
    store.save(&entry).await?;
    Ok(entry)
}
