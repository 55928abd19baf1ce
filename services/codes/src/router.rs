use axum::{Router, middleware::from_fn, routing::get};
use tower_http::trace::TraceLayer;

use pedalstar_core::health::healthz;
use pedalstar_core::middleware::{cors, propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    codes::{issue_code, list_codes, redeem_code},
    health::readyz,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Venue-facing
        .route("/issue", get(issue_code))
        // Admin
        .route("/redeem", get(redeem_code).post(redeem_code))
        .route("/list", get(list_codes))
        .layer(from_fn(cors))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(state)
}
