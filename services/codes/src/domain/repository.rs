#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};

use crate::domain::types::{CodeFilter, CodeRecord, InsertOutcome};
use crate::error::CodeServiceError;

/// Persistent table of access codes.
///
/// Implementations are shared by independent service instances, so the only
/// cross-request synchronization is what the store itself guarantees.
pub trait CodeRepository: Send + Sync {
    /// Records matching `filter`, newest `created_at` first (ties broken by
    /// `code`, descending), at most `limit` rows.
    async fn find(
        &self,
        filter: &CodeFilter,
        limit: u64,
    ) -> Result<Vec<CodeRecord>, CodeServiceError>;

    /// Insert a new record. A conflict on `code` is reported as
    /// [`InsertOutcome::Duplicate`], not as an error.
    async fn insert(&self, record: &CodeRecord) -> Result<InsertOutcome, CodeServiceError>;

    /// Set `used_at` on `code` only if it is still null, in one atomic write.
    /// Returns the number of rows changed: 1 for the winner, 0 otherwise.
    async fn mark_used_if_unused(
        &self,
        code: &str,
        used_at: DateTime<Utc>,
    ) -> Result<u64, CodeServiceError>;
}
