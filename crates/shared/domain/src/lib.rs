//! Domain layer - Core business entities.
//!
//! This crate contains pure domain types with no infrastructure dependencies.

pub mod user;

pub use user::User;
