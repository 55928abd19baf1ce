use crate::domain::clock::Clock;
use crate::domain::code::normalize_code;
use crate::domain::repository::CodeRepository;
use crate::domain::types::{CodeFilter, CodeRecord, CodeStatus, LIST_PAGE_SIZE};
use crate::domain::venue::VenueId;
use crate::error::CodeServiceError;

#[derive(Debug, Default)]
pub struct ListCodesInput {
    pub status: CodeStatus,
    /// Free-form venue id; blank means no constraint.
    pub venue_id: Option<String>,
    /// Exact code; blank means no constraint.
    pub code: Option<String>,
}

/// Read-only operational view of the code table, newest first.
pub struct ListCodesUseCase<S, C>
where
    S: CodeRepository,
    C: Clock,
{
    pub codes: S,
    pub clock: C,
}

impl<S, C> ListCodesUseCase<S, C>
where
    S: CodeRepository,
    C: Clock,
{
    pub async fn execute(&self, input: ListCodesInput) -> Result<Vec<CodeRecord>, CodeServiceError> {
        let venue_id = non_blank(input.venue_id)
            .map(|v| VenueId::parse(&v))
            .transpose()?
            .map(|v| v.to_string());
        let code = non_blank(input.code).map(|c| normalize_code(&c));

        let filter = CodeFilter {
            status: input.status,
            venue_id,
            code,
            now: self.clock.now(),
        };
        self.codes.find(&filter, LIST_PAGE_SIZE).await
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
