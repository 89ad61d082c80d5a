//! Task repository trait (port)

use async_trait::async_trait;
use bo_shared::Pagination;
use uuid::Uuid;

use crate::domain::{Task, TaskStatus};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Task>, DomainError>;
    async fn list_by_branch(&self, branch_id: &Uuid, pagination: &Pagination) -> Result<Vec<Task>, DomainError>;
    async fn create(&self, task: &Task) -> Result<Task, DomainError>;
    /// Writes the task only if the stored status is still `expected`;
    /// otherwise fails with `InvalidStatusTransition`.
    async fn update(&self, task: &Task, expected: TaskStatus) -> Result<Task, DomainError>;
}
