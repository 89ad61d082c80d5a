//! # Back-office Infrastructure
//!
//! PostgreSQL and in-memory adapters, plus the composition root.

pub mod backoffice;
pub mod database;
pub mod memory;

pub use backoffice::{bootstrap, Adapters, Backoffice, MemoryBackoffice, PgBackoffice};
pub use database::create_pool;
