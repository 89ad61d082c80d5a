// ============================================================================
// Back-office Core - Task Service
// File: crates/bo-core/src/services/task_service.rs
// ============================================================================
//! Task assignment and status workflow

use std::sync::Arc;

use bo_security::{AccessError, AccessPolicy, Action, Actor, Resource};
use bo_shared::Pagination;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{Employee, NewTask, Task, TaskStatus};
use crate::error::DomainError;
use crate::repositories::{BranchRepository, ClientRepository, EmployeeRepository, TaskRepository};
use crate::services::{find_active_branch, find_employee};

pub struct TaskService<B, C, E, T>
where
    B: BranchRepository,
    C: ClientRepository,
    E: EmployeeRepository,
    T: TaskRepository,
{
    branch_repo: Arc<B>,
    client_repo: Arc<C>,
    employee_repo: Arc<E>,
    task_repo: Arc<T>,
}

impl<B, C, E, T> TaskService<B, C, E, T>
where
    B: BranchRepository,
    C: ClientRepository,
    E: EmployeeRepository,
    T: TaskRepository,
{
    pub fn new(branch_repo: Arc<B>, client_repo: Arc<C>, employee_repo: Arc<E>, task_repo: Arc<T>) -> Self {
        Self {
            branch_repo,
            client_repo,
            employee_repo,
            task_repo,
        }
    }

    pub async fn create_task(&self, actor: &Actor, branch_id: &Uuid, input: NewTask) -> Result<Task, DomainError> {
        // 1. Authorize and validate
        AccessPolicy::authorize(actor, Resource::Task, Action::Add, Some(branch_id))?;
        input.validate()?;

        // 2. Branch, client and assignee must line up
        let branch = find_active_branch(self.branch_repo.as_ref(), branch_id).await?;
        if let Some(client_id) = input.client_id.as_ref() {
            let client = self
                .client_repo
                .find_by_id(client_id)
                .await?
                .ok_or(DomainError::ClientNotFound(*client_id))?;
            if client.branch_id != branch.id {
                return Err(DomainError::ValidationError(
                    "Client belongs to another branch".to_string(),
                ));
            }
        }
        if let Some(assignee_id) = input.assignee_id.as_ref() {
            self.assignable(assignee_id, &branch.id).await?;
        }

        // 3. Persist
        let task = self.task_repo.create(&Task::new(branch.id, input, Some(actor.user_id))).await?;
        info!(task_id = %task.id, branch = %branch.code, "Task created");
        Ok(task)
    }

    pub async fn assign_task(&self, actor: &Actor, task_id: &Uuid, assignee_id: &Uuid) -> Result<Task, DomainError> {
        let mut task = self.find(task_id).await?;
        AccessPolicy::authorize(actor, Resource::Task, Action::Edit, Some(&task.branch_id))?;
        if actor.role.is_self_service() {
            return Err(AccessError::NotOwner(actor.role).into());
        }

        self.assignable(assignee_id, &task.branch_id).await?;
        task.assign(*assignee_id, actor.user_id)?;
        let task = self.task_repo.update(&task, task.status).await?;

        info!(task_id = %task.id, assignee_id = %assignee_id, "Task assigned");
        Ok(task)
    }

    /// Self-service roles may only move tasks assigned to them.
    pub async fn update_task_status(
        &self,
        actor: &Actor,
        task_id: &Uuid,
        status: TaskStatus,
    ) -> Result<Task, DomainError> {
        let mut task = self.find(task_id).await?;
        match task.assignee_id.as_ref() {
            Some(assignee) => AccessPolicy::authorize_self_service(
                actor,
                Resource::Task,
                Action::Edit,
                Some(&task.branch_id),
                assignee,
            )?,
            None => {
                AccessPolicy::authorize(actor, Resource::Task, Action::Edit, Some(&task.branch_id))?;
                if actor.role.is_self_service() {
                    return Err(AccessError::NotOwner(actor.role).into());
                }
            }
        }

        let from = task.status;
        task.transition(status, actor.user_id)?;
        let task = self.task_repo.update(&task, from).await?;

        info!(task_id = %task.id, from = from.as_str(), to = status.as_str(), "Task status changed");
        Ok(task)
    }

    pub async fn get_task(&self, actor: &Actor, id: &Uuid) -> Result<Task, DomainError> {
        let task = self.find(id).await?;
        AccessPolicy::authorize(actor, Resource::Task, Action::View, Some(&task.branch_id))?;
        Ok(task)
    }

    pub async fn list_tasks(
        &self,
        actor: &Actor,
        branch_id: &Uuid,
        pagination: &Pagination,
    ) -> Result<Vec<Task>, DomainError> {
        AccessPolicy::authorize(actor, Resource::Task, Action::View, Some(branch_id))?;
        self.task_repo.list_by_branch(branch_id, pagination).await
    }

    async fn find(&self, id: &Uuid) -> Result<Task, DomainError> {
        self.task_repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::TaskNotFound(*id))
    }

    async fn assignable(&self, employee_id: &Uuid, branch_id: &Uuid) -> Result<Employee, DomainError> {
        let employee = find_employee(self.employee_repo.as_ref(), employee_id).await?;
        if employee.branch_id != *branch_id {
            warn!(%employee_id, %branch_id, "Assignee works in another branch");
            return Err(DomainError::ValidationError(
                "Assignee belongs to another branch".to_string(),
            ));
        }
        if !employee.is_active() {
            return Err(DomainError::EmployeeInactive(*employee_id));
        }
        Ok(employee)
    }
}
