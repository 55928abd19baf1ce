use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{CodeRecord, CodeStatus};
use crate::error::CodeServiceError;
use crate::handlers::admin::AdminAccess;
use crate::state::AppState;
use crate::usecase::issue::{IssueCodeInput, IssueCodeUseCase};
use crate::usecase::list::{ListCodesInput, ListCodesUseCase};
use crate::usecase::redeem::RedeemCodeUseCase;

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeRecordResponse {
    pub code: String,
    pub venue_id: String,
    #[serde(serialize_with = "pedalstar_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "pedalstar_core::serde::to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
    #[serde(serialize_with = "pedalstar_core::serde::opt_to_rfc3339_ms")]
    pub used_at: Option<DateTime<Utc>>,
}

impl From<&CodeRecord> for CodeRecordResponse {
    fn from(record: &CodeRecord) -> Self {
        Self {
            code: record.code.clone(),
            venue_id: record.venue_id.clone(),
            created_at: record.created_at,
            expires_at: record.expires_at,
            used_at: record.used_at,
        }
    }
}

#[derive(Serialize)]
pub struct IssueResponse {
    pub ok: bool,
    pub reused: bool,
    #[serde(flatten)]
    pub record: CodeRecordResponse,
}

#[derive(Serialize)]
pub struct RowsResponse {
    pub ok: bool,
    pub rows: Vec<CodeRecordResponse>,
}

impl RowsResponse {
    fn from_records(records: &[CodeRecord]) -> Self {
        Self {
            ok: true,
            rows: records.iter().map(CodeRecordResponse::from).collect(),
        }
    }
}

// ── GET /issue ───────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct IssueQuery {
    pub pedalstar: Option<String>,
    /// Short alias used by older kiosk links.
    pub ps: Option<String>,
}

pub async fn issue_code(
    State(state): State<AppState>,
    Query(query): Query<IssueQuery>,
) -> Result<Json<IssueResponse>, CodeServiceError> {
    let usecase = IssueCodeUseCase {
        codes: state.code_repo(),
        clock: state.clock(),
        rng: state.rng(),
        ttl: state.code_ttl,
    };
    let issued = usecase
        .execute(IssueCodeInput {
            venue_id: query.pedalstar.or(query.ps).unwrap_or_default(),
        })
        .await?;
    Ok(Json(IssueResponse {
        ok: true,
        reused: issued.reused,
        record: CodeRecordResponse::from(&issued.record),
    }))
}

// ── GET|POST /redeem ─────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct RedeemRequest {
    pub code: Option<String>,
}

/// `code` from the JSON body wins over the query string. A missing or
/// unparseable body is treated as empty.
pub async fn redeem_code(
    _admin: AdminAccess,
    State(state): State<AppState>,
    Query(query): Query<RedeemRequest>,
    body: Bytes,
) -> Result<Json<RowsResponse>, CodeServiceError> {
    let from_body = serde_json::from_slice::<RedeemRequest>(&body)
        .ok()
        .and_then(|b| b.code)
        .filter(|c| !c.trim().is_empty());
    let code = from_body.or(query.code).unwrap_or_default();

    let usecase = RedeemCodeUseCase {
        codes: state.code_repo(),
        clock: state.clock(),
    };
    let record = usecase.execute(&code).await?;
    Ok(Json(RowsResponse::from_records(&[record])))
}

// ── GET /list ────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub status: Option<String>,
    #[serde(alias = "venue_id", alias = "pedalstar")]
    pub venue_id: Option<String>,
    pub code: Option<String>,
}

pub async fn list_codes(
    _admin: AdminAccess,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<RowsResponse>, CodeServiceError> {
    let usecase = ListCodesUseCase {
        codes: state.code_repo(),
        clock: state.clock(),
    };
    let records = usecase
        .execute(ListCodesInput {
            status: query
                .status
                .as_deref()
                .map(CodeStatus::from_query)
                .unwrap_or_default(),
            venue_id: query.venue_id,
            code: query.code,
        })
        .await?;
    Ok(Json(RowsResponse::from_records(&records)))
}
