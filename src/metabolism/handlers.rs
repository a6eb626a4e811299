use axum::{extract::Query, routing::get, Json, Router};
use tracing::instrument;

use crate::state::AppState;

use super::calc;
use super::dto::{StepsQuery, StepsReport};

pub fn routes() -> Router<AppState> {
    Router::new().route("/activity/steps", get(steps_report))
}

/// GET /activity/steps?steps=&weight_kg=&height_cm=
#[instrument]
pub async fn steps_report(Query(q): Query<StepsQuery>) -> Json<StepsReport> {
    Json(StepsReport {
        steps: q.steps,
        calories_burned: calc::calculate_calories_burned(q.steps, q.weight_kg),
        distance_km: calc::steps_to_distance_km(q.steps, q.height_cm),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn steps_report_fills_defaults() {
        let Json(report) = steps_report(Query(StepsQuery {
            steps: 10_000,
            weight_kg: None,
            height_cm: None,
        }))
        .await;
        assert_eq!(report.calories_burned, 350.0);
        assert!((report.distance_km - 7.14).abs() < 1e-9);
    }
}
