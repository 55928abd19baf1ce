//! Code strings: generation and canonical form.
//!
//! A code is `{venue}-{suffix}`, e.g. `PS001-AB3F9K`. The suffix is
//! [`CODE_SUFFIX_LEN`] characters drawn uniformly from [`CODE_ALPHABET`], which
//! leaves out `0 O 1 I L` so codes survive being read aloud or retyped.
//! That gives 31^6 ≈ 8.87e8 suffixes per venue; with `n` codes already issued
//! for a venue a new one collides with probability at most `n / 8.87e8`, and a
//! collision only costs a retry (see `usecase::issue`).

use rand::RngExt;

use crate::domain::venue::VenueId;

/// Uppercase letters and digits minus the visually ambiguous ones.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Random characters after the venue prefix.
pub const CODE_SUFFIX_LEN: usize = 6;

/// Uniform index source. Codes are unlock secrets, so production must be a CSPRNG.
pub trait RandomSource: Send + Sync {
    /// Uniform value in `0..upper`. `upper` is never zero.
    fn index(&self, upper: usize) -> usize;
}

/// Thread-local `rand` generator (ChaCha, reseeded from the OS).
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn index(&self, upper: usize) -> usize {
        rand::rng().random_range(0..upper)
    }
}

pub fn generate_code<R: RandomSource + ?Sized>(venue: &VenueId, rng: &R) -> String {
    let suffix: String = (0..CODE_SUFFIX_LEN)
        .map(|_| CODE_ALPHABET[rng.index(CODE_ALPHABET.len())] as char)
        .collect();
    format!("{venue}-{suffix}")
}

/// Canonical form of user-supplied code input: trimmed, upper-case.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}
