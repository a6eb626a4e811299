use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::Date;
use tracing::instrument;

use crate::error::http_err;
use crate::foodlog::entry::DATE_FORMAT;
use crate::profile;
use crate::state::AppState;

use super::dto::SummaryResponse;
use super::services::aggregate;

pub fn routes() -> Router<AppState> {
    Router::new().route("/summary/:date", get(get_summary))
}

/// GET /summary/:date — the day's log folded against the profile's
/// calorie goal. No profile means a zero goal, never an error.
#[instrument(skip(state))]
pub async fn get_summary(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<SummaryResponse>, (StatusCode, String)> {
    Date::parse(&date, DATE_FORMAT)
        .map_err(|_| (StatusCode::BAD_REQUEST, format!("invalid date: {date}")))?;

    let calorie_goal = profile::services::load(state.store.as_ref())
        .await
        .map_err(http_err)?
        .map_or(0.0, |p| p.calorie_goal);
    let entries = state
        .food_log
        .entries_for_date(&date)
        .await
        .map_err(http_err)?;

    Ok(Json(SummaryResponse {
        date,
        totals: aggregate(&entries, calorie_goal),
    }))
}
