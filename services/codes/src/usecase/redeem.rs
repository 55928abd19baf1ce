use tracing::{info, warn};

use crate::domain::clock::Clock;
use crate::domain::code::normalize_code;
use crate::domain::repository::CodeRepository;
use crate::domain::types::{CodeFilter, CodeRecord, CodeState};
use crate::error::CodeServiceError;

/// Claim a code exactly once.
///
/// Re-redeeming a used code is always an [`CodeServiceError::AlreadyUsed`]
/// conflict, never an idempotent success.
pub struct RedeemCodeUseCase<S, C>
where
    S: CodeRepository,
    C: Clock,
{
    pub codes: S,
    pub clock: C,
}

impl<S, C> RedeemCodeUseCase<S, C>
where
    S: CodeRepository,
    C: Clock,
{
    pub async fn execute(&self, raw_code: &str) -> Result<CodeRecord, CodeServiceError> {
        let code = normalize_code(raw_code);
        if code.is_empty() {
            return Err(CodeServiceError::MissingCode);
        }
        let now = self.clock.now();

        let record = self
            .lookup(&code, now)
            .await?
            .ok_or(CodeServiceError::CodeNotFound)?;

        match record.state_at(now) {
            CodeState::Used => return Err(CodeServiceError::AlreadyUsed(Box::new(record))),
            CodeState::Expired => return Err(CodeServiceError::CodeExpired(Box::new(record))),
            CodeState::Active => {}
        }

        // The lookup above is only advisory; this write is the claim.
        let rows = self.codes.mark_used_if_unused(&code, now).await?;
        if rows == 0 {
            warn!(venue_id = %record.venue_id, "lost redemption race to a concurrent claim");
            let current = self
                .lookup(&code, now)
                .await?
                .ok_or(CodeServiceError::CodeNotFound)?;
            return Err(CodeServiceError::AlreadyUsed(Box::new(current)));
        }

        info!(venue_id = %record.venue_id, "code redeemed");
        Ok(CodeRecord {
            used_at: Some(now),
            ..record
        })
    }

    async fn lookup(
        &self,
        code: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Option<CodeRecord>, CodeServiceError> {
        let rows = self
            .codes
            .find(&CodeFilter::by_code(code, now), 1)
            .await?;
        Ok(rows.into_iter().next())
    }
}
