//! # Back-office Core
//!
//! Domain entities, repository traits, identifier allocation, and services for
//! the branch back-office.

pub mod domain;
pub mod error;
pub mod repositories;
pub mod sequence;
pub mod services;

// Re-export domain entities
pub use domain::*;
pub use error::DomainError;
pub use sequence::{SequenceAllocator, SequenceScope};
