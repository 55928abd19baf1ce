//! sea-orm entities owned by the codes service.

pub mod access_codes;
