// ============================================================================
// Back-office Core - Branch Service
// File: crates/bo-core/src/services/branch_service.rs
// ============================================================================
//! Branch lifecycle: creation with a `BR-###` code, updates, deactivation

use std::sync::Arc;

use bo_security::{AccessPolicy, Action, Actor, Resource};
use bo_shared::config::SequenceSettings;
use bo_shared::Pagination;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{Branch, NewBranch, UpdateBranch};
use crate::error::DomainError;
use crate::repositories::{BranchRepository, SequenceStore};
use crate::sequence::{SequenceAllocator, SequenceScope};

pub struct BranchService<R: BranchRepository, S: SequenceStore> {
    branch_repo: Arc<R>,
    allocator: SequenceAllocator<S>,
}

impl<R: BranchRepository, S: SequenceStore> BranchService<R, S> {
    pub fn new(branch_repo: Arc<R>, sequence_store: Arc<S>, settings: SequenceSettings) -> Self {
        Self {
            branch_repo,
            allocator: SequenceAllocator::new(sequence_store, settings),
        }
    }

    /// Create a branch with the next `BR-###` code
    pub async fn create_branch(&self, actor: &Actor, input: NewBranch) -> Result<Branch, DomainError> {
        // 1. Authorize and validate
        AccessPolicy::authorize(actor, Resource::Branch, Action::Add, None)?;
        input.validate()?;

        // 2. Allocate a code and insert, reallocating if the code was claimed meanwhile
        let branch_repo = &self.branch_repo;
        let created_by = Some(actor.user_id);
        let branch = self
            .allocator
            .insert_with_identifier(&SequenceScope::branch(), |code| {
                let branch = Branch::new(code, input.clone(), created_by);
                async move { branch_repo.create(&branch).await }
            })
            .await?;

        info!(branch_id = %branch.id, code = %branch.code, "Branch created");
        Ok(branch)
    }

    pub async fn get_branch(&self, actor: &Actor, id: &Uuid) -> Result<Branch, DomainError> {
        AccessPolicy::authorize(actor, Resource::Branch, Action::View, Some(id))?;
        self.find(id).await
    }

    pub async fn get_branch_by_code(&self, actor: &Actor, code: &str) -> Result<Branch, DomainError> {
        let branch = self
            .branch_repo
            .find_by_code(code)
            .await?
            .ok_or_else(|| DomainError::BranchCodeNotFound(code.to_string()))?;
        AccessPolicy::authorize(actor, Resource::Branch, Action::View, Some(&branch.id))?;
        Ok(branch)
    }

    /// Branch-scoped actors only see their home branch.
    pub async fn list_branches(&self, actor: &Actor, pagination: &Pagination) -> Result<Vec<Branch>, DomainError> {
        AccessPolicy::authorize(actor, Resource::Branch, Action::View, None)?;

        if actor.role.is_global() {
            return self.branch_repo.list(pagination).await;
        }
        match actor.branch_id.as_ref() {
            Some(home) if pagination.page <= 1 => {
                Ok(self.branch_repo.find_by_id(home).await?.into_iter().collect())
            }
            _ => Ok(Vec::new()),
        }
    }

    pub async fn update_branch(
        &self,
        actor: &Actor,
        id: &Uuid,
        update: UpdateBranch,
    ) -> Result<Branch, DomainError> {
        AccessPolicy::authorize(actor, Resource::Branch, Action::Edit, Some(id))?;
        update.validate()?;

        let mut branch = self.find(id).await?;
        branch.apply(update, actor.user_id);
        self.branch_repo.update(&branch).await
    }

    /// Soft delete; the code stays allocated.
    pub async fn deactivate_branch(&self, actor: &Actor, id: &Uuid) -> Result<Branch, DomainError> {
        AccessPolicy::authorize(actor, Resource::Branch, Action::Delete, Some(id))?;

        let mut branch = self.find(id).await?;
        if branch.is_deleted() {
            warn!(branch_id = %id, "Branch already deactivated");
            return Ok(branch);
        }
        branch.soft_delete(actor.user_id);
        let branch = self.branch_repo.update(&branch).await?;

        info!(branch_id = %branch.id, code = %branch.code, "Branch deactivated");
        Ok(branch)
    }

    async fn find(&self, id: &Uuid) -> Result<Branch, DomainError> {
        self.branch_repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::BranchNotFound(*id))
    }
}
