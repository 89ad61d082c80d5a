// ============================================================================
// Back-office Core - Leave Service
// File: crates/bo-core/src/services/leave_service.rs
// ============================================================================
//! Leave requests and balance bookkeeping
//!
//! Every request carries its days into the balance as increments: submission
//! holds them as pending, approval moves them to used, rejection and
//! cancellation release them.

use std::sync::Arc;

use bo_security::{AccessPolicy, Action, Actor, Resource};
use bo_shared::config::LeaveSettings;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{Employee, LeaveBalance, LeaveRequest, LeaveType, NewLeaveRequest};
use crate::error::DomainError;
use crate::repositories::{EmployeeRepository, LeaveRepository};
use crate::services::find_employee;

pub struct LeaveService<E: EmployeeRepository, L: LeaveRepository> {
    employee_repo: Arc<E>,
    leave_repo: Arc<L>,
    settings: LeaveSettings,
}

impl<E: EmployeeRepository, L: LeaveRepository> LeaveService<E, L> {
    pub fn new(employee_repo: Arc<E>, leave_repo: Arc<L>, settings: LeaveSettings) -> Self {
        Self {
            employee_repo,
            leave_repo,
            settings,
        }
    }

    /// Submit a leave request for an employee
    pub async fn apply_leave(
        &self,
        actor: &Actor,
        employee_id: &Uuid,
        input: NewLeaveRequest,
    ) -> Result<LeaveRequest, DomainError> {
        // 1. Who may ask, for whom
        let employee = find_employee(self.employee_repo.as_ref(), employee_id).await?;
        AccessPolicy::authorize_self_service(
            actor,
            Resource::Leave,
            Action::Add,
            Some(&employee.branch_id),
            employee_id,
        )?;
        if !employee.is_active() {
            return Err(DomainError::EmployeeInactive(*employee_id));
        }

        // 2. Range and working days
        input.validate()?;
        let days = input.working_days()?;

        // 3. No double booking
        if let Some(existing) = self
            .leave_repo
            .find_overlapping(employee_id, input.start_date, input.end_date)
            .await?
        {
            warn!(%employee_id, existing = %existing.id, "Overlapping leave request");
            return Err(DomainError::OverlappingLeave(existing.id));
        }

        // 4. Balance
        let request = LeaveRequest::new(*employee_id, input, days, Some(actor.user_id));
        let balance = self.ensure_balance(&employee, request.year(), request.leave_type).await?;
        if request.leave_type.is_paid() && days > balance.available() {
            return Err(DomainError::InsufficientLeaveBalance {
                requested: days,
                available: balance.available(),
            });
        }

        // 5. Request and pending hold in one unit of work
        let request = self.leave_repo.submit_request(&request).await?;
        info!(
            request_id = %request.id,
            %employee_id,
            leave_type = request.leave_type.as_str(),
            days,
            "Leave requested"
        );
        Ok(request)
    }

    pub async fn approve_leave(&self, actor: &Actor, request_id: &Uuid) -> Result<LeaveRequest, DomainError> {
        let (mut request, employee) = self.find_with_employee(request_id).await?;
        AccessPolicy::authorize_decision(actor, Resource::Leave, Some(&employee.branch_id), &request.employee_id)?;

        let from = request.status;
        let delta = request.approve(actor.user_id)?;
        let request = self.leave_repo.transition_request(&request, from, delta).await?;

        info!(request_id = %request.id, days = request.days, "Leave approved");
        Ok(request)
    }

    pub async fn reject_leave(&self, actor: &Actor, request_id: &Uuid) -> Result<LeaveRequest, DomainError> {
        let (mut request, employee) = self.find_with_employee(request_id).await?;
        AccessPolicy::authorize_decision(actor, Resource::Leave, Some(&employee.branch_id), &request.employee_id)?;

        let from = request.status;
        let delta = request.reject(actor.user_id)?;
        let request = self.leave_repo.transition_request(&request, from, delta).await?;

        info!(request_id = %request.id, "Leave rejected");
        Ok(request)
    }

    /// Pending requests can always be withdrawn; approved ones until they start.
    pub async fn cancel_leave(&self, actor: &Actor, request_id: &Uuid) -> Result<LeaveRequest, DomainError> {
        let (mut request, employee) = self.find_with_employee(request_id).await?;
        AccessPolicy::authorize_self_service(
            actor,
            Resource::Leave,
            Action::Edit,
            Some(&employee.branch_id),
            &request.employee_id,
        )?;

        let from = request.status;
        let delta = request.cancel(actor.user_id, Utc::now().date_naive())?;
        let request = self.leave_repo.transition_request(&request, from, delta).await?;

        info!(request_id = %request.id, from = from.as_str(), "Leave cancelled");
        Ok(request)
    }

    /// Balances of every leave type for the year, created on first access.
    pub async fn leave_balances(
        &self,
        actor: &Actor,
        employee_id: &Uuid,
        year: i32,
    ) -> Result<Vec<LeaveBalance>, DomainError> {
        let employee = find_employee(self.employee_repo.as_ref(), employee_id).await?;
        AccessPolicy::authorize_self_service(
            actor,
            Resource::Leave,
            Action::View,
            Some(&employee.branch_id),
            employee_id,
        )?;

        for leave_type in [LeaveType::Annual, LeaveType::Sick, LeaveType::Unpaid] {
            self.ensure_balance(&employee, year, leave_type).await?;
        }
        self.leave_repo.list_balances(employee_id, year).await
    }

    pub async fn list_leave_requests(
        &self,
        actor: &Actor,
        employee_id: &Uuid,
    ) -> Result<Vec<LeaveRequest>, DomainError> {
        let employee = find_employee(self.employee_repo.as_ref(), employee_id).await?;
        AccessPolicy::authorize_self_service(
            actor,
            Resource::Leave,
            Action::View,
            Some(&employee.branch_id),
            employee_id,
        )?;
        self.leave_repo.list_requests(employee_id).await
    }

    async fn ensure_balance(
        &self,
        employee: &Employee,
        year: i32,
        leave_type: LeaveType,
    ) -> Result<LeaveBalance, DomainError> {
        if let Some(balance) = self.leave_repo.find_balance(&employee.id, year, leave_type).await? {
            return Ok(balance);
        }
        let balance = LeaveBalance::new(employee.id, year, leave_type, leave_type.entitlement(&self.settings));
        self.leave_repo.create_balance(&balance).await
    }

    async fn find_with_employee(&self, request_id: &Uuid) -> Result<(LeaveRequest, Employee), DomainError> {
        let request = self
            .leave_repo
            .find_request(request_id)
            .await?
            .ok_or(DomainError::LeaveRequestNotFound(*request_id))?;
        let employee = find_employee(self.employee_repo.as_ref(), &request.employee_id).await?;
        Ok((request, employee))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BalanceDelta, LeaveStatus};
    use crate::repositories::{MockEmployeeRepository, MockLeaveRepository};
    use crate::services::fixtures;
    use bo_security::{AccessError, Role};
    use chrono::{Datelike, Duration, NaiveDate, Weekday};

    fn employees_with(list: Vec<Employee>) -> MockEmployeeRepository {
        let mut employees = MockEmployeeRepository::new();
        employees
            .expect_find_by_id()
            .returning(move |id| Ok(list.iter().find(|e| e.id == *id).cloned()));
        employees
    }

    /// A Monday at least a week away whose working week stays in one year.
    fn upcoming_monday() -> NaiveDate {
        let mut day = Utc::now().date_naive() + Duration::days(7);
        while day.weekday() != Weekday::Mon || (day + Duration::days(4)).year() != day.year() {
            day = day + Duration::days(1);
        }
        day
    }

    fn annual(start: NaiveDate, end: NaiveDate) -> NewLeaveRequest {
        NewLeaveRequest {
            leave_type: LeaveType::Annual,
            start_date: start,
            end_date: end,
            reason: None,
        }
    }

    fn service(employees: MockEmployeeRepository, leave: MockLeaveRepository) -> LeaveService<MockEmployeeRepository, MockLeaveRepository> {
        LeaveService::new(Arc::new(employees), Arc::new(leave), LeaveSettings::default())
    }

    #[tokio::test]
    async fn test_apply_creates_balance_and_holds_pending() {
        let staff = fixtures::employee(Uuid::new_v4(), Role::Staff);
        let actor = fixtures::actor_for(&staff);
        let staff_id = staff.id;
        let monday = upcoming_monday();

        let mut leave = MockLeaveRepository::new();
        leave.expect_find_overlapping().returning(|_, _, _| Ok(None));
        leave.expect_find_balance().times(1).returning(|_, _, _| Ok(None));
        leave
            .expect_create_balance()
            .times(1)
            .withf(|b| b.entitled_days == 12 && b.leave_type == LeaveType::Annual)
            .returning(|b| Ok(b.clone()));
        leave
            .expect_submit_request()
            .times(1)
            .withf(|r| r.days == 3 && r.status == LeaveStatus::Pending)
            .returning(|r| Ok(r.clone()));

        let request = service(employees_with(vec![staff]), leave)
            .apply_leave(&actor, &staff_id, annual(monday, monday + Duration::days(2)))
            .await
            .unwrap();
        assert_eq!(request.days, 3);
    }

    #[tokio::test]
    async fn test_insufficient_balance() {
        let staff = fixtures::employee(Uuid::new_v4(), Role::Staff);
        let actor = fixtures::actor_for(&staff);
        let staff_id = staff.id;
        let monday = upcoming_monday();
        let year = monday.year();

        let mut leave = MockLeaveRepository::new();
        leave.expect_find_overlapping().returning(|_, _, _| Ok(None));
        leave.expect_find_balance().returning(move |employee_id, _, leave_type| {
            let mut balance = LeaveBalance::new(*employee_id, year, leave_type, 12);
            balance.used_days = 11;
            Ok(Some(balance))
        });
        leave.expect_submit_request().never();

        let result = service(employees_with(vec![staff]), leave)
            .apply_leave(&actor, &staff_id, annual(monday, monday + Duration::days(1)))
            .await;
        assert!(matches!(
            result,
            Err(DomainError::InsufficientLeaveBalance { requested: 2, available: 1 })
        ));
    }

    #[tokio::test]
    async fn test_overlap_rejected() {
        let staff = fixtures::employee(Uuid::new_v4(), Role::Staff);
        let actor = fixtures::actor_for(&staff);
        let staff_id = staff.id;
        let monday = upcoming_monday();
        let existing = LeaveRequest::new(staff_id, annual(monday, monday), 1, None);
        let existing_id = existing.id;

        let mut leave = MockLeaveRepository::new();
        leave
            .expect_find_overlapping()
            .returning(move |_, _, _| Ok(Some(existing.clone())));
        leave.expect_submit_request().never();

        let result = service(employees_with(vec![staff]), leave)
            .apply_leave(&actor, &staff_id, annual(monday, monday + Duration::days(1)))
            .await;
        assert!(matches!(result, Err(DomainError::OverlappingLeave(id)) if id == existing_id));
    }

    #[tokio::test]
    async fn test_approval_moves_pending_to_used() {
        let branch_id = Uuid::new_v4();
        let staff = fixtures::employee(branch_id, Role::Staff);
        let manager = fixtures::employee(branch_id, Role::BranchManager);
        let monday = upcoming_monday();
        let request = LeaveRequest::new(staff.id, annual(monday, monday + Duration::days(4)), 5, None);
        let request_id = request.id;

        let mut leave = MockLeaveRepository::new();
        leave
            .expect_find_request()
            .returning(move |_| Ok(Some(request.clone())));
        leave
            .expect_transition_request()
            .times(1)
            .withf(|r, from, delta| {
                r.status == LeaveStatus::Approved
                    && *from == LeaveStatus::Pending
                    && *delta == BalanceDelta { pending: -5, used: 5 }
            })
            .returning(|r, _, _| Ok(r.clone()));

        let actor = fixtures::actor_for(&manager);
        let approved = service(employees_with(vec![staff, manager]), leave)
            .approve_leave(&actor, &request_id)
            .await
            .unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(approved.decided_by, Some(actor.user_id));
    }

    #[tokio::test]
    async fn test_self_approval_forbidden() {
        let manager = fixtures::employee(Uuid::new_v4(), Role::BranchManager);
        let monday = upcoming_monday();
        let request = LeaveRequest::new(manager.id, annual(monday, monday), 1, None);
        let request_id = request.id;

        let mut leave = MockLeaveRepository::new();
        leave
            .expect_find_request()
            .returning(move |_| Ok(Some(request.clone())));
        leave.expect_transition_request().never();

        let actor = fixtures::actor_for(&manager);
        let result = service(employees_with(vec![manager]), leave)
            .approve_leave(&actor, &request_id)
            .await;
        assert!(matches!(result, Err(DomainError::Forbidden(AccessError::SelfApproval))));
    }

    #[tokio::test]
    async fn test_staff_cannot_approve() {
        let branch_id = Uuid::new_v4();
        let staff = fixtures::employee(branch_id, Role::Staff);
        let colleague = fixtures::employee(branch_id, Role::Staff);
        let monday = upcoming_monday();
        let request = LeaveRequest::new(colleague.id, annual(monday, monday), 1, None);
        let request_id = request.id;

        let mut leave = MockLeaveRepository::new();
        leave
            .expect_find_request()
            .returning(move |_| Ok(Some(request.clone())));

        let actor = fixtures::actor_for(&staff);
        let result = service(employees_with(vec![staff, colleague]), leave)
            .reject_leave(&actor, &request_id)
            .await;
        assert!(matches!(result, Err(DomainError::Forbidden(AccessError::Denied { .. }))));
    }

    #[tokio::test]
    async fn test_cancel_approved_refunds_used_days() {
        let staff = fixtures::employee(Uuid::new_v4(), Role::Staff);
        let monday = upcoming_monday();
        let mut request = LeaveRequest::new(staff.id, annual(monday, monday + Duration::days(1)), 2, None);
        request.approve(Uuid::new_v4()).unwrap();
        let request_id = request.id;

        let mut leave = MockLeaveRepository::new();
        leave
            .expect_find_request()
            .returning(move |_| Ok(Some(request.clone())));
        leave
            .expect_transition_request()
            .times(1)
            .withf(|_, from, delta| *from == LeaveStatus::Approved && *delta == BalanceDelta { pending: 0, used: -2 })
            .returning(|r, _, _| Ok(r.clone()));

        let actor = fixtures::actor_for(&staff);
        let cancelled = service(employees_with(vec![staff]), leave)
            .cancel_leave(&actor, &request_id)
            .await
            .unwrap();
        assert_eq!(cancelled.status, LeaveStatus::Cancelled);
    }
}
