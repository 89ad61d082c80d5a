//! Domain services (business logic)

pub mod attendance_service;
pub mod branch_service;
pub mod client_service;
pub mod employee_service;
pub mod invoice_service;
pub mod leave_service;
pub mod task_service;

pub use attendance_service::AttendanceService;
pub use branch_service::BranchService;
pub use client_service::ClientService;
pub use employee_service::EmployeeService;
pub use invoice_service::InvoiceService;
pub use leave_service::LeaveService;
pub use task_service::TaskService;

use tracing::warn;
use uuid::Uuid;

use crate::domain::{Branch, Employee};
use crate::error::DomainError;
use crate::repositories::{BranchRepository, EmployeeRepository};

/// Parent branch of a creation flow; checked before any identifier is read.
pub(crate) async fn find_active_branch<B: BranchRepository + ?Sized>(
    branch_repo: &B,
    branch_id: &Uuid,
) -> Result<Branch, DomainError> {
    let branch = branch_repo.find_by_id(branch_id).await?.ok_or_else(|| {
        warn!(%branch_id, "Branch not found");
        DomainError::BranchNotFound(*branch_id)
    })?;

    if !branch.is_active || branch.is_deleted() {
        warn!(%branch_id, code = %branch.code, "Branch is inactive");
        return Err(DomainError::BranchInactive(*branch_id));
    }
    Ok(branch)
}

pub(crate) async fn find_employee<E: EmployeeRepository + ?Sized>(
    employee_repo: &E,
    employee_id: &Uuid,
) -> Result<Employee, DomainError> {
    employee_repo
        .find_by_id(employee_id)
        .await?
        .ok_or(DomainError::EmployeeNotFound(*employee_id))
}
