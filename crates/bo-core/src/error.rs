//! Domain errors

use bo_security::AccessError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Branch not found: {0}")]
    BranchNotFound(Uuid),

    #[error("Branch not found: {0}")]
    BranchCodeNotFound(String),

    #[error("Branch is not active: {0}")]
    BranchInactive(Uuid),

    #[error("Employee not found: {0}")]
    EmployeeNotFound(Uuid),

    #[error("Employee is not active: {0}")]
    EmployeeInactive(Uuid),

    #[error("Client not found: {0}")]
    ClientNotFound(Uuid),

    #[error("Task not found: {0}")]
    TaskNotFound(Uuid),

    #[error("Invoice not found: {0}")]
    InvoiceNotFound(Uuid),

    #[error("Invoice not found: {0}")]
    InvoiceNumberNotFound(String),

    #[error("Leave request not found: {0}")]
    LeaveRequestNotFound(Uuid),

    #[error("Identifier already exists: {0}")]
    IdentifierAlreadyExists(String),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Cannot move {entity} from {from} to {to}")]
    InvalidStatusTransition {
        entity: &'static str,
        from: &'static str,
        to: &'static str,
    },

    #[error("Employee {employee_id} already checked in on {date}")]
    AlreadyCheckedIn { employee_id: Uuid, date: chrono::NaiveDate },

    #[error("Employee {employee_id} has no open attendance on {date}")]
    NotCheckedIn { employee_id: Uuid, date: chrono::NaiveDate },

    #[error("Insufficient leave balance: requested {requested} day(s), {available} available")]
    InsufficientLeaveBalance { requested: i32, available: i32 },

    #[error("Leave overlaps an existing request: {0}")]
    OverlappingLeave(Uuid),

    #[error("Access denied: {0}")]
    Forbidden(#[from] AccessError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(errors.to_string())
    }
}

impl DomainError {
    /// Missing-entity errors, as opposed to conflicts or failures.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::BranchNotFound(_)
                | DomainError::BranchCodeNotFound(_)
                | DomainError::EmployeeNotFound(_)
                | DomainError::ClientNotFound(_)
                | DomainError::TaskNotFound(_)
                | DomainError::InvoiceNotFound(_)
                | DomainError::InvoiceNumberNotFound(_)
                | DomainError::LeaveRequestNotFound(_)
        )
    }
}
