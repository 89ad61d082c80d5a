// ============================================================================
// Back-office Core - Employee Service
// File: crates/bo-core/src/services/employee_service.rs
// ============================================================================
//! HR records: hiring with an `EMP-<branch>-###` code, updates, termination

use std::sync::Arc;

use bo_security::{AccessPolicy, Action, Actor, Resource};
use bo_shared::config::SequenceSettings;
use bo_shared::Pagination;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{Employee, EmploymentStatus, NewEmployee, UpdateEmployee};
use crate::error::DomainError;
use crate::repositories::{BranchRepository, EmployeeRepository, SequenceStore};
use crate::sequence::{SequenceAllocator, SequenceScope};
use crate::services::{find_active_branch, find_employee};

pub struct EmployeeService<B: BranchRepository, E: EmployeeRepository, S: SequenceStore> {
    branch_repo: Arc<B>,
    employee_repo: Arc<E>,
    allocator: SequenceAllocator<S>,
}

impl<B: BranchRepository, E: EmployeeRepository, S: SequenceStore> EmployeeService<B, E, S> {
    pub fn new(
        branch_repo: Arc<B>,
        employee_repo: Arc<E>,
        sequence_store: Arc<S>,
        settings: SequenceSettings,
    ) -> Self {
        Self {
            branch_repo,
            employee_repo,
            allocator: SequenceAllocator::new(sequence_store, settings),
        }
    }

    /// Hire an employee into a branch
    pub async fn create_employee(
        &self,
        actor: &Actor,
        branch_id: &Uuid,
        input: NewEmployee,
    ) -> Result<Employee, DomainError> {
        // 1. Authorize and validate
        AccessPolicy::authorize(actor, Resource::Employee, Action::Add, Some(branch_id))?;
        input.validate()?;

        // 2. Parent branch must exist before any code is read
        let branch = find_active_branch(self.branch_repo.as_ref(), branch_id).await?;

        // 3. E-mail uniqueness
        let email = input.email.trim().to_lowercase();
        if self.employee_repo.find_by_email(&email).await?.is_some() {
            warn!(email = %bo_shared::utils::mask_email(&email), "Employee e-mail already registered");
            return Err(DomainError::EmailAlreadyExists(email));
        }

        // 4. Allocate the code and insert
        let employee_repo = &self.employee_repo;
        let created_by = Some(actor.user_id);
        let employee = self
            .allocator
            .insert_with_identifier(&SequenceScope::employee(&branch.code), |code| {
                let employee = Employee::new(code, branch.id, input.clone(), created_by);
                async move { employee_repo.create(&employee).await }
            })
            .await?;

        info!(
            employee_id = %employee.id,
            code = %employee.code,
            branch = %branch.code,
            "Employee created"
        );
        Ok(employee)
    }

    pub async fn get_employee(&self, actor: &Actor, id: &Uuid) -> Result<Employee, DomainError> {
        let employee = find_employee(self.employee_repo.as_ref(), id).await?;
        AccessPolicy::authorize(actor, Resource::Employee, Action::View, Some(&employee.branch_id))?;
        Ok(employee)
    }

    pub async fn list_employees(
        &self,
        actor: &Actor,
        branch_id: &Uuid,
        pagination: &Pagination,
    ) -> Result<Vec<Employee>, DomainError> {
        AccessPolicy::authorize(actor, Resource::Employee, Action::View, Some(branch_id))?;
        self.employee_repo.list_by_branch(branch_id, pagination).await
    }

    pub async fn update_employee(
        &self,
        actor: &Actor,
        id: &Uuid,
        update: UpdateEmployee,
    ) -> Result<Employee, DomainError> {
        update.validate()?;

        let mut employee = find_employee(self.employee_repo.as_ref(), id).await?;
        AccessPolicy::authorize(actor, Resource::Employee, Action::Edit, Some(&employee.branch_id))?;

        if update.status == Some(EmploymentStatus::Terminated) {
            return Err(DomainError::ValidationError(
                "Use termination to end employment".to_string(),
            ));
        }
        if !employee.is_active() {
            return Err(DomainError::EmployeeInactive(*id));
        }

        employee.apply(update, actor.user_id);
        self.employee_repo.update(&employee).await
    }

    /// Marks the employee terminated; the code is kept.
    pub async fn terminate_employee(&self, actor: &Actor, id: &Uuid) -> Result<Employee, DomainError> {
        let mut employee = find_employee(self.employee_repo.as_ref(), id).await?;
        AccessPolicy::authorize(actor, Resource::Employee, Action::Delete, Some(&employee.branch_id))?;

        if employee.status == EmploymentStatus::Terminated {
            return Err(DomainError::InvalidStatusTransition {
                entity: "employee",
                from: employee.status.as_str(),
                to: EmploymentStatus::Terminated.as_str(),
            });
        }

        employee.terminate(actor.user_id);
        let employee = self.employee_repo.update(&employee).await?;
        info!(employee_id = %employee.id, code = %employee.code, "Employee terminated");
        Ok(employee)
    }
}
