//! Admin credential extractor for `/redeem` and `/list`.

use axum::extract::{FromRequestParts, Query};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde::Deserialize;

use crate::error::CodeServiceError;
use crate::state::AppState;

const X_ADMIN_TOKEN: &str = "x-admin-token";

/// Proof that the request presented the configured admin token.
///
/// Accepted from `Authorization: Bearer <token>`, `x-admin-token: <token>` or
/// `?token=<token>`, checked in that order. Rejects with 401 when the token is
/// absent, wrong, or when no admin token is configured.
#[derive(Debug, Clone, Copy)]
pub struct AdminAccess;

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

impl FromRequestParts<AppState> for AdminAccess {
    type Rejection = CodeServiceError;

    // Same shape as axum-core's trait signature: read everything synchronously,
    // hand back a 'static future.
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let presented = presented_token(parts);
        let allowed = token_matches(state.admin_token.as_deref(), presented.as_deref());

        async move {
            if allowed {
                Ok(Self)
            } else {
                Err(CodeServiceError::Unauthorized)
            }
        }
    }
}

/// First non-empty token among the accepted sources. An empty source does not
/// shadow the ones after it.
fn presented_token(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    let header = parts
        .headers
        .get(X_ADMIN_TOKEN)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty());

    bearer.or(header).map(str::to_owned).or_else(|| {
        Query::<TokenQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.token)
            .filter(|t| !t.is_empty())
    })
}

/// Constant-time comparison against the configured secret. No secret, no access.
pub fn token_matches(expected: Option<&str>, presented: Option<&str>) -> bool {
    match (expected, presented) {
        (Some(expected), Some(presented)) if !expected.is_empty() => {
            constant_time_eq::constant_time_eq(expected.as_bytes(), presented.as_bytes())
        }
        _ => false,
    }
}
