//! Client records per branch

use std::sync::Arc;

use bo_security::{AccessPolicy, Action, Actor, Resource};
use bo_shared::Pagination;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::domain::{Client, NewClient, UpdateClient};
use crate::error::DomainError;
use crate::repositories::{BranchRepository, ClientRepository};
use crate::services::find_active_branch;

pub struct ClientService<B: BranchRepository, C: ClientRepository> {
    branch_repo: Arc<B>,
    client_repo: Arc<C>,
}

impl<B: BranchRepository, C: ClientRepository> ClientService<B, C> {
    pub fn new(branch_repo: Arc<B>, client_repo: Arc<C>) -> Self {
        Self { branch_repo, client_repo }
    }

    pub async fn create_client(&self, actor: &Actor, branch_id: &Uuid, input: NewClient) -> Result<Client, DomainError> {
        AccessPolicy::authorize(actor, Resource::Client, Action::Add, Some(branch_id))?;
        input.validate()?;

        let branch = find_active_branch(self.branch_repo.as_ref(), branch_id).await?;
        let client = self
            .client_repo
            .create(&Client::new(branch.id, input, Some(actor.user_id)))
            .await?;

        info!(client_id = %client.id, branch = %branch.code, "Client created");
        Ok(client)
    }

    pub async fn get_client(&self, actor: &Actor, id: &Uuid) -> Result<Client, DomainError> {
        let client = self.find(id).await?;
        AccessPolicy::authorize(actor, Resource::Client, Action::View, Some(&client.branch_id))?;
        Ok(client)
    }

    pub async fn list_clients(
        &self,
        actor: &Actor,
        branch_id: &Uuid,
        pagination: &Pagination,
    ) -> Result<Vec<Client>, DomainError> {
        AccessPolicy::authorize(actor, Resource::Client, Action::View, Some(branch_id))?;
        self.client_repo.list_by_branch(branch_id, pagination).await
    }

    pub async fn update_client(&self, actor: &Actor, id: &Uuid, update: UpdateClient) -> Result<Client, DomainError> {
        update.validate()?;

        let mut client = self.find(id).await?;
        AccessPolicy::authorize(actor, Resource::Client, Action::Edit, Some(&client.branch_id))?;
        client.apply(update, actor.user_id);
        self.client_repo.update(&client).await
    }

    pub async fn deactivate_client(&self, actor: &Actor, id: &Uuid) -> Result<Client, DomainError> {
        let mut client = self.find(id).await?;
        AccessPolicy::authorize(actor, Resource::Client, Action::Delete, Some(&client.branch_id))?;
        client.soft_delete(actor.user_id);
        self.client_repo.update(&client).await
    }

    async fn find(&self, id: &Uuid) -> Result<Client, DomainError> {
        self.client_repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::ClientNotFound(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MockBranchRepository, MockClientRepository};
    use crate::services::fixtures;
    use bo_security::{AccessError, Role};

    fn new_client() -> NewClient {
        NewClient {
            name: "PT Maju Bersama".to_string(),
            email: Some("Finance@MajuBersama.co.id".to_string()),
            phone: None,
            address: None,
        }
    }

    #[tokio::test]
    async fn test_create_client_in_existing_branch() {
        let branch = fixtures::branch("BR-001");
        let branch_id = branch.id;
        let mut branches = MockBranchRepository::new();
        branches
            .expect_find_by_id()
            .returning(move |_| Ok(Some(branch.clone())));
        let mut clients = MockClientRepository::new();
        clients.expect_create().times(1).returning(|c| Ok(c.clone()));

        let service = ClientService::new(Arc::new(branches), Arc::new(clients));
        let client = service
            .create_client(&fixtures::admin(), &branch_id, new_client())
            .await
            .unwrap();
        assert_eq!(client.branch_id, branch_id);
        assert_eq!(client.email.as_deref(), Some("finance@majubersama.co.id"));
    }

    #[tokio::test]
    async fn test_missing_branch() {
        let mut branches = MockBranchRepository::new();
        branches.expect_find_by_id().returning(|_| Ok(None));
        let mut clients = MockClientRepository::new();
        clients.expect_create().never();

        let service = ClientService::new(Arc::new(branches), Arc::new(clients));
        let result = service
            .create_client(&fixtures::admin(), &Uuid::new_v4(), new_client())
            .await;
        assert!(matches!(result, Err(DomainError::BranchNotFound(_))));
    }

    #[tokio::test]
    async fn test_hr_officer_has_no_client_access() {
        let hr = fixtures::employee(Uuid::new_v4(), Role::HrOfficer);
        let service = ClientService::new(Arc::new(MockBranchRepository::new()), Arc::new(MockClientRepository::new()));
        let result = service
            .list_clients(&fixtures::actor_for(&hr), &hr.branch_id, &Pagination::default())
            .await;
        assert!(matches!(result, Err(DomainError::Forbidden(AccessError::Denied { .. }))));
    }
}
