use axum::extract::State;
use axum::http::StatusCode;

use crate::state::AppState;

/// Handler for `GET /readyz` — ready once the database answers a ping.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    match tokio::time::timeout(state.store_timeout, state.db.ping()).await {
        Ok(Ok(())) => StatusCode::OK,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "database ping failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
        Err(_) => {
            tracing::warn!("database ping timed out");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
