//! Repository layer for data access.

pub mod entities;
mod memory;
mod user_repository;

pub use memory::InMemoryUserStore;
pub use user_repository::{UserRepository, UserStore};

pub(crate) use user_repository::queries;

#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
