use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::domain::types::CodeRecord;
use crate::handlers::codes::CodeRecordResponse;

/// Codes service error variants.
#[derive(Debug, thiserror::Error)]
pub enum CodeServiceError {
    #[error("invalid pedalstar id, expected PS001 format")]
    InvalidVenueId,
    #[error("missing code")]
    MissingCode,
    #[error("unauthorized")]
    Unauthorized,
    #[error("code not found")]
    CodeNotFound,
    #[error("code already used")]
    AlreadyUsed(Box<CodeRecord>),
    #[error("code expired")]
    CodeExpired(Box<CodeRecord>),
    #[error("could not generate a unique code")]
    GenerationCollisionExhausted,
    #[error("store failure")]
    StoreFailure(#[from] anyhow::Error),
}

impl CodeServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidVenueId => "INVALID_VENUE_ID",
            Self::MissingCode => "MISSING_CODE",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::CodeNotFound => "CODE_NOT_FOUND",
            Self::AlreadyUsed(_) => "ALREADY_USED",
            Self::CodeExpired(_) => "CODE_EXPIRED",
            Self::GenerationCollisionExhausted => "GENERATION_COLLISION_EXHAUSTED",
            Self::StoreFailure(_) => "STORE_FAILURE",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidVenueId | Self::MissingCode => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::CodeNotFound => StatusCode::NOT_FOUND,
            Self::AlreadyUsed(_) => StatusCode::CONFLICT,
            Self::CodeExpired(_) => StatusCode::GONE,
            Self::GenerationCollisionExhausted | Self::StoreFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for CodeServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 4xx are expected client outcomes and TraceLayer already records them.
        // 5xx need the anyhow chain so the store failure is traceable.
        match &self {
            Self::StoreFailure(e) => {
                tracing::error!(error = ?e, kind = self.kind(), "store failure");
            }
            Self::GenerationCollisionExhausted => {
                tracing::error!(kind = self.kind(), "code generation kept colliding");
            }
            _ => {}
        }
        let mut body = serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        if let Self::AlreadyUsed(record) | Self::CodeExpired(record) = &self {
            body["row"] = serde_json::json!(CodeRecordResponse::from(record.as_ref()));
        }
        (status, axum::Json(body)).into_response()
    }
}
