pub mod admin;
pub mod codes;
pub mod health;
