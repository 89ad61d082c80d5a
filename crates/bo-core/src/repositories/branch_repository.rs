//! Branch repository trait (port)

use async_trait::async_trait;
use bo_shared::Pagination;
use uuid::Uuid;

use crate::domain::Branch;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BranchRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Branch>, DomainError>;
    async fn find_by_code(&self, code: &str) -> Result<Option<Branch>, DomainError>;
    async fn list(&self, pagination: &Pagination) -> Result<Vec<Branch>, DomainError>;
    /// Fails with `IdentifierAlreadyExists` when the code is taken.
    async fn create(&self, branch: &Branch) -> Result<Branch, DomainError>;
    async fn update(&self, branch: &Branch) -> Result<Branch, DomainError>;
}
