//! Leave repository trait (port)
//!
//! Balance changes are applied as increments in the same unit of work as the
//! request they belong to.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{BalanceDelta, LeaveBalance, LeaveRequest, LeaveStatus, LeaveType};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeaveRepository: Send + Sync {
    async fn find_balance(
        &self,
        employee_id: &Uuid,
        year: i32,
        leave_type: LeaveType,
    ) -> Result<Option<LeaveBalance>, DomainError>;

    /// Inserts the balance, or returns the existing one for the same key.
    async fn create_balance(&self, balance: &LeaveBalance) -> Result<LeaveBalance, DomainError>;

    async fn list_balances(&self, employee_id: &Uuid, year: i32) -> Result<Vec<LeaveBalance>, DomainError>;

    async fn find_request(&self, id: &Uuid) -> Result<Option<LeaveRequest>, DomainError>;

    async fn list_requests(&self, employee_id: &Uuid) -> Result<Vec<LeaveRequest>, DomainError>;

    /// First pending or approved request of the employee intersecting the range.
    async fn find_overlapping(
        &self,
        employee_id: &Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<LeaveRequest>, DomainError>;

    /// Inserts the request and adds its days to the pending balance, as one
    /// unit of work per employee. Fails with `OverlappingLeave` if a pending or
    /// approved request intersects it, and for paid types with
    /// `InsufficientLeaveBalance` if the balance cannot cover it.
    async fn submit_request(&self, request: &LeaveRequest) -> Result<LeaveRequest, DomainError>;

    /// Persists the new status only if the stored one is still `from`, and
    /// applies `delta` to the request's balance.
    async fn transition_request(
        &self,
        request: &LeaveRequest,
        from: LeaveStatus,
        delta: BalanceDelta,
    ) -> Result<LeaveRequest, DomainError>;
}
