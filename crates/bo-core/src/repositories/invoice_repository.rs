//! Invoice repository trait (port)

use async_trait::async_trait;
use bo_shared::Pagination;
use uuid::Uuid;

use crate::domain::{Invoice, InvoiceStatus};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Invoice>, DomainError>;
    async fn find_by_number(&self, number: &str) -> Result<Option<Invoice>, DomainError>;
    async fn list_by_branch(&self, branch_id: &Uuid, pagination: &Pagination) -> Result<Vec<Invoice>, DomainError>;
    /// Fails with `IdentifierAlreadyExists` when the number is taken.
    async fn create(&self, invoice: &Invoice) -> Result<Invoice, DomainError>;
    /// Persists the new status only if the stored one is still `from`;
    /// otherwise fails with `InvalidStatusTransition`.
    async fn transition(&self, invoice: &Invoice, from: InvoiceStatus) -> Result<Invoice, DomainError>;
}
