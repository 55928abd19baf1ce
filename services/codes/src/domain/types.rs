use chrono::{DateTime, Utc};

/// A single-use access code bound to a venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRecord {
    pub code: String,
    pub venue_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

/// Lifecycle state of a code at a given instant. Only `used_at` is stored;
/// expiry is recomputed from time on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeState {
    Active,
    Used,
    Expired,
}

impl CodeRecord {
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    /// The validity window is half-open: a code is dead at exactly `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Unused and not yet expired. Same predicate decides issuance reuse.
    pub fn is_claimable_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_used() && !self.is_expired_at(now)
    }

    /// `Used` wins over `Expired`: a claimed code never expires out of the used state.
    pub fn state_at(&self, now: DateTime<Utc>) -> CodeState {
        if self.is_used() {
            CodeState::Used
        } else if self.is_expired_at(now) {
            CodeState::Expired
        } else {
            CodeState::Active
        }
    }
}

/// Status filter accepted by the listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeStatus {
    #[default]
    All,
    Active,
    Used,
}

impl CodeStatus {
    /// Parse a `status` query value. Unknown values fall back to `All`.
    pub fn from_query(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Self::Active,
            "used" => Self::Used,
            _ => Self::All,
        }
    }
}

/// Store-side filter. All present constraints must hold; `now` anchors the `Active` status.
#[derive(Debug, Clone)]
pub struct CodeFilter {
    pub status: CodeStatus,
    pub venue_id: Option<String>,
    pub code: Option<String>,
    pub now: DateTime<Utc>,
}

impl CodeFilter {
    pub fn all(now: DateTime<Utc>) -> Self {
        Self {
            status: CodeStatus::All,
            venue_id: None,
            code: None,
            now,
        }
    }

    /// Claimable codes of one venue.
    pub fn active_for_venue(venue_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            status: CodeStatus::Active,
            venue_id: Some(venue_id.to_owned()),
            ..Self::all(now)
        }
    }

    /// Exact code lookup regardless of state.
    pub fn by_code(code: &str, now: DateTime<Utc>) -> Self {
        Self {
            code: Some(code.to_owned()),
            ..Self::all(now)
        }
    }

    /// In-process evaluation of the filter, equivalent to the SQL the store runs.
    pub fn matches(&self, record: &CodeRecord) -> bool {
        let status_ok = match self.status {
            CodeStatus::All => true,
            CodeStatus::Active => record.is_claimable_at(self.now),
            CodeStatus::Used => record.is_used(),
        };
        status_ok
            && self.venue_id.as_deref().is_none_or(|v| record.venue_id == v)
            && self.code.as_deref().is_none_or(|c| record.code == c)
    }
}

/// Result of inserting a freshly generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(CodeRecord),
    /// The code already exists (primary-key conflict). Nothing was written.
    Duplicate,
}

/// Maximum rows returned by a listing.
pub const LIST_PAGE_SIZE: u64 = 200;

/// Total insert attempts per issuance before giving up on code collisions.
pub const MAX_GENERATION_ATTEMPTS: usize = 5;
