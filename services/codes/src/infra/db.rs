use std::future::Future;
use std::time::Duration;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, SqlErr, sea_query::Expr,
};

use pedalstar_codes_schema::access_codes;

use crate::domain::repository::CodeRepository;
use crate::domain::types::{CodeFilter, CodeRecord, CodeStatus, InsertOutcome};
use crate::error::CodeServiceError;

// ── Access code repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCodeRepository {
    pub db: DatabaseConnection,
    /// Bound on each round trip; elapsed calls surface as `StoreFailure`.
    pub timeout: Duration,
}

impl DbCodeRepository {
    async fn bounded<T>(
        &self,
        what: &'static str,
        fut: impl Future<Output = Result<T, DbErr>>,
    ) -> Result<Result<T, DbErr>, CodeServiceError> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| anyhow::anyhow!("{what}: timed out after {:?}", self.timeout).into())
    }
}

impl CodeRepository for DbCodeRepository {
    async fn find(
        &self,
        filter: &CodeFilter,
        limit: u64,
    ) -> Result<Vec<CodeRecord>, CodeServiceError> {
        let mut query = access_codes::Entity::find();
        if let Some(venue_id) = &filter.venue_id {
            query = query.filter(access_codes::Column::VenueId.eq(venue_id.as_str()));
        }
        if let Some(code) = &filter.code {
            query = query.filter(access_codes::Column::Code.eq(code.as_str()));
        }
        query = match filter.status {
            CodeStatus::All => query,
            CodeStatus::Active => query
                .filter(access_codes::Column::UsedAt.is_null())
                .filter(access_codes::Column::ExpiresAt.gt(filter.now)),
            CodeStatus::Used => query.filter(access_codes::Column::UsedAt.is_not_null()),
        };
        query = query
            .order_by_desc(access_codes::Column::CreatedAt)
            .order_by_desc(access_codes::Column::Code);

        let models = self
            .bounded("find access codes", query.limit(limit).all(&self.db))
            .await?
            .context("find access codes")?;
        Ok(models.into_iter().map(record_from_model).collect())
    }

    async fn insert(&self, record: &CodeRecord) -> Result<InsertOutcome, CodeServiceError> {
        let model = access_codes::ActiveModel {
            code: Set(record.code.clone()),
            venue_id: Set(record.venue_id.clone()),
            created_at: Set(record.created_at),
            expires_at: Set(record.expires_at),
            used_at: Set(None),
        };
        match self.bounded("insert access code", model.insert(&self.db)).await? {
            Ok(model) => Ok(InsertOutcome::Inserted(record_from_model(model))),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(InsertOutcome::Duplicate)
            }
            Err(err) => Err(anyhow::Error::new(err).context("insert access code").into()),
        }
    }

    async fn mark_used_if_unused(
        &self,
        code: &str,
        used_at: DateTime<Utc>,
    ) -> Result<u64, CodeServiceError> {
        // UPDATE access_codes SET used_at = $1 WHERE code = $2 AND used_at IS NULL
        let update = access_codes::Entity::update_many()
            .col_expr(access_codes::Column::UsedAt, Expr::value(used_at))
            .filter(access_codes::Column::Code.eq(code))
            .filter(access_codes::Column::UsedAt.is_null())
            .exec(&self.db);
        let result = self
            .bounded("mark access code used", update)
            .await?
            .context("mark access code used")?;
        Ok(result.rows_affected)
    }
}

fn record_from_model(model: access_codes::Model) -> CodeRecord {
    CodeRecord {
        code: model.code,
        venue_id: model.venue_id,
        created_at: model.created_at,
        expires_at: model.expires_at,
        used_at: model.used_at,
    }
}
