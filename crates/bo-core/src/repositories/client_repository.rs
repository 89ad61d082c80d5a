//! Client repository trait (port)

use async_trait::async_trait;
use bo_shared::Pagination;
use uuid::Uuid;

use crate::domain::Client;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Client>, DomainError>;
    async fn list_by_branch(&self, branch_id: &Uuid, pagination: &Pagination) -> Result<Vec<Client>, DomainError>;
    async fn create(&self, client: &Client) -> Result<Client, DomainError>;
    async fn update(&self, client: &Client) -> Result<Client, DomainError>;
}
