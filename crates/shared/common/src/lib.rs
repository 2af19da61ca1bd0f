//! Common utilities shared across services.
//!
//! This crate provides:
//! - Unified store error handling
//! - Configuration structures

pub mod config;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult};
