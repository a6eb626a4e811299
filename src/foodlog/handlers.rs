use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime};
use tracing::instrument;
use uuid::Uuid;

use crate::analysis::RawNutrition;
use crate::error::http_err;
use crate::state::AppState;

use super::dto::{NewEntryRequest, RangeQuery};
use super::entry::{FoodLogEntry, MealType, DATE_FORMAT};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/log/days/:date", get(list_day))
        .route("/log/range", get(list_range))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/log/entries", post(create_entry))
        .route("/log/entries/:id", delete(remove_entry))
        .route("/log/analyzed", post(log_analyzed))
}

fn parse_date(s: &str) -> Result<Date, (StatusCode, String)> {
    Date::parse(s, DATE_FORMAT)
        .map_err(|_| (StatusCode::BAD_REQUEST, format!("invalid date: {s}")))
}

/// POST /log/entries — create or replace-by-id.
#[instrument(skip(state, payload))]
pub async fn create_entry(
    State(state): State<AppState>,
    Json(payload): Json<NewEntryRequest>,
) -> Result<(StatusCode, Json<FoodLogEntry>), (StatusCode, String)> {
    let timestamp = OffsetDateTime::parse(&payload.timestamp, &Rfc3339)
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("invalid timestamp: {e}")))?;
    let entry = FoodLogEntry {
        id: payload.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        name: payload.name,
        calories: payload.calories,
        protein: payload.protein,
        carbs: payload.carbs,
        fat: payload.fat,
        fiber: payload.fiber,
        sugar: payload.sugar,
        meal_type: payload
            .meal_type
            .as_deref()
            .map(MealType::parse_lenient)
            .unwrap_or_default(),
        timestamp,
    };
    state.food_log.save(&entry).await.map_err(http_err)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// POST /log/analyzed — persist a raw provider record relayed by the
/// client; missing fields are coerced, extras dropped.
#[instrument(skip(state, raw))]
pub async fn log_analyzed(
    State(state): State<AppState>,
    Json(raw): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<FoodLogEntry>), (StatusCode, String)> {
    let raw: RawNutrition = serde_json::from_value(raw)
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("invalid analysis record: {e}")))?;
    let entry = raw.into_entry(OffsetDateTime::now_utc());
    state.food_log.save(&entry).await.map_err(http_err)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /log/days/:date
#[instrument(skip(state))]
pub async fn list_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<Vec<FoodLogEntry>>, (StatusCode, String)> {
    parse_date(&date)?;
    let entries = state
        .food_log
        .entries_for_date(&date)
        .await
        .map_err(http_err)?;
    Ok(Json(entries))
}

/// GET /log/range?start=&end=
#[instrument(skip(state))]
pub async fn list_range(
    State(state): State<AppState>,
    Query(q): Query<RangeQuery>,
) -> Result<Json<BTreeMap<String, Vec<FoodLogEntry>>>, (StatusCode, String)> {
    parse_date(&q.start)?;
    parse_date(&q.end)?;
    let days = state
        .food_log
        .entries_for_range(&q.start, &q.end)
        .await
        .map_err(http_err)?;
    Ok(Json(days))
}

/// DELETE /log/entries/:id — idempotent, 204 even for unknown ids.
#[instrument(skip(state))]
pub async fn remove_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    state.food_log.delete(&id).await.map_err(http_err)?;
    Ok(StatusCode::NO_CONTENT)
}
