//! Identifier lookups backing the sequence allocator
//!
//! Implemented by the adapter that owns the identifier column (branch codes,
//! employee codes, invoice numbers).

use async_trait::async_trait;

use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SequenceStore: Send + Sync {
    /// Identifier under `prefix` with the greatest all-digit suffix, compared
    /// numerically. Soft-deleted rows count.
    async fn latest_identifier(&self, prefix: &str) -> Result<Option<String>, DomainError>;

    async fn identifier_exists(&self, identifier: &str) -> Result<bool, DomainError>;
}
