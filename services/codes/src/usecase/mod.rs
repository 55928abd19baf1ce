pub mod issue;
pub mod list;
pub mod redeem;
