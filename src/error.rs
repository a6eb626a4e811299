use axum::http::StatusCode;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by the persistence-backed stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation: {0}")]
    Validation(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Maps a store error onto the handler error shape.
pub fn http_err(e: StoreError) -> (StatusCode, String) {
    match e {
        StoreError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
        StoreError::Storage(e) => {
            error!(error = %e, "storage failure");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
