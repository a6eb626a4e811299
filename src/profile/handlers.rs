use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{info, instrument};

use crate::error::http_err;
use crate::state::AppState;

use super::dto::ProfileRequest;
use super::model::UserProfile;
use super::services;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/profile",
        get(get_profile).put(put_profile).delete(delete_profile),
    )
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, (StatusCode, String)> {
    match services::load(state.store.as_ref()).await.map_err(http_err)? {
        Some(profile) => Ok(Json(profile)),
        None => Err((StatusCode::NOT_FOUND, "Profile not set".into())),
    }
}

#[instrument(skip(state, payload))]
pub async fn put_profile(
    State(state): State<AppState>,
    Json(payload): Json<ProfileRequest>,
) -> Result<Json<UserProfile>, (StatusCode, String)> {
    let profile = services::save(state.store.as_ref(), payload)
        .await
        .map_err(http_err)?;
    info!(calorie_goal = profile.calorie_goal, "profile saved");
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn delete_profile(
    State(state): State<AppState>,
) -> Result<StatusCode, (StatusCode, String)> {
    services::reset(state.store.as_ref())
        .await
        .map_err(http_err)?;
    Ok(StatusCode::NO_CONTENT)
}
