//! Employee repository trait (port)

use async_trait::async_trait;
use bo_shared::Pagination;
use uuid::Uuid;

use crate::domain::Employee;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Employee>, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, DomainError>;
    async fn list_by_branch(&self, branch_id: &Uuid, pagination: &Pagination) -> Result<Vec<Employee>, DomainError>;
    /// Fails with `IdentifierAlreadyExists` or `EmailAlreadyExists` on a unique violation.
    async fn create(&self, employee: &Employee) -> Result<Employee, DomainError>;
    async fn update(&self, employee: &Employee) -> Result<Employee, DomainError>;
}
