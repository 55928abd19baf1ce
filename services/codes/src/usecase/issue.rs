use chrono::TimeDelta;
use tracing::{info, warn};

use crate::domain::clock::Clock;
use crate::domain::code::{RandomSource, generate_code};
use crate::domain::repository::CodeRepository;
use crate::domain::types::{CodeFilter, CodeRecord, InsertOutcome, MAX_GENERATION_ATTEMPTS};
use crate::domain::venue::VenueId;
use crate::error::CodeServiceError;

pub struct IssueCodeInput {
    /// Venue id as typed by the caller; normalized before use.
    pub venue_id: String,
}

#[derive(Debug)]
pub struct IssuedCode {
    pub record: CodeRecord,
    /// `true` when an already active code was handed out again.
    pub reused: bool,
}

/// Get-or-create the active code of a venue.
///
/// The lookup and the insert are separate round trips. Two first-time requests
/// racing for the same venue can both insert, leaving two valid codes for a
/// while; that is harmless and accepted.
pub struct IssueCodeUseCase<S, C, R>
where
    S: CodeRepository,
    C: Clock,
    R: RandomSource,
{
    pub codes: S,
    pub clock: C,
    pub rng: R,
    pub ttl: TimeDelta,
}

impl<S, C, R> IssueCodeUseCase<S, C, R>
where
    S: CodeRepository,
    C: Clock,
    R: RandomSource,
{
    pub async fn execute(&self, input: IssueCodeInput) -> Result<IssuedCode, CodeServiceError> {
        // 1. Canonical venue id → 400 if malformed
        let venue = VenueId::parse(&input.venue_id)?;
        let now = self.clock.now();

        // 2. Newest still-claimable code of this venue is handed out again
        let active = CodeFilter::active_for_venue(venue.as_str(), now);
        if let Some(record) = self.codes.find(&active, 1).await?.into_iter().next() {
            info!(venue_id = %venue, "reusing active code");
            return Ok(IssuedCode {
                record,
                reused: true,
            });
        }

        // 3. Mint a new one, regenerating on the rare primary-key collision
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| anyhow::anyhow!("code ttl {} overflows expiry", self.ttl))?;
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let record = CodeRecord {
                code: generate_code(&venue, &self.rng),
                venue_id: venue.to_string(),
                created_at: now,
                expires_at,
                used_at: None,
            };
            match self.codes.insert(&record).await? {
                InsertOutcome::Inserted(record) => {
                    info!(venue_id = %venue, expires_at = %record.expires_at, "issued new code");
                    return Ok(IssuedCode {
                        record,
                        reused: false,
                    });
                }
                InsertOutcome::Duplicate => {
                    warn!(venue_id = %venue, attempt, "generated code already exists, retrying");
                }
            }
        }

        Err(CodeServiceError::GenerationCollisionExhausted)
    }
}
