//! Daily check-in / check-out

use std::sync::Arc;

use bo_security::{AccessPolicy, Action, Actor, Resource};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::AttendanceRecord;
use crate::error::DomainError;
use crate::repositories::{AttendanceRepository, EmployeeRepository};
use crate::services::find_employee;

pub struct AttendanceService<E: EmployeeRepository, A: AttendanceRepository> {
    employee_repo: Arc<E>,
    attendance_repo: Arc<A>,
}

impl<E: EmployeeRepository, A: AttendanceRepository> AttendanceService<E, A> {
    pub fn new(employee_repo: Arc<E>, attendance_repo: Arc<A>) -> Self {
        Self {
            employee_repo,
            attendance_repo,
        }
    }

    pub async fn check_in(
        &self,
        actor: &Actor,
        employee_id: &Uuid,
        at: DateTime<Utc>,
    ) -> Result<AttendanceRecord, DomainError> {
        let employee = find_employee(self.employee_repo.as_ref(), employee_id).await?;
        AccessPolicy::authorize_self_service(
            actor,
            Resource::Attendance,
            Action::Add,
            Some(&employee.branch_id),
            employee_id,
        )?;
        if !employee.is_active() {
            return Err(DomainError::EmployeeInactive(*employee_id));
        }

        let work_date = at.date_naive();
        if self
            .attendance_repo
            .find_by_employee_and_date(employee_id, work_date)
            .await?
            .is_some()
        {
            warn!(%employee_id, %work_date, "Duplicate check-in");
            return Err(DomainError::AlreadyCheckedIn {
                employee_id: *employee_id,
                date: work_date,
            });
        }

        let record = AttendanceRecord::check_in(*employee_id, employee.branch_id, at, Some(actor.user_id));
        let record = self.attendance_repo.create(&record).await?;
        info!(%employee_id, %work_date, "Checked in");
        Ok(record)
    }

    pub async fn check_out(
        &self,
        actor: &Actor,
        employee_id: &Uuid,
        at: DateTime<Utc>,
    ) -> Result<AttendanceRecord, DomainError> {
        let employee = find_employee(self.employee_repo.as_ref(), employee_id).await?;
        AccessPolicy::authorize_self_service(
            actor,
            Resource::Attendance,
            Action::Edit,
            Some(&employee.branch_id),
            employee_id,
        )?;

        let work_date = at.date_naive();
        let mut record = self
            .attendance_repo
            .find_by_employee_and_date(employee_id, work_date)
            .await?
            .filter(AttendanceRecord::is_open)
            .ok_or(DomainError::NotCheckedIn {
                employee_id: *employee_id,
                date: work_date,
            })?;

        record.check_out(at, actor.user_id)?;
        let record = self.attendance_repo.update(&record).await?;
        info!(%employee_id, %work_date, minutes = record.worked_minutes(), "Checked out");
        Ok(record)
    }

    pub async fn list_attendance(
        &self,
        actor: &Actor,
        employee_id: &Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, DomainError> {
        if to < from {
            return Err(DomainError::ValidationError(
                "Range end cannot be before its start".to_string(),
            ));
        }
        let employee = find_employee(self.employee_repo.as_ref(), employee_id).await?;
        AccessPolicy::authorize_self_service(
            actor,
            Resource::Attendance,
            Action::View,
            Some(&employee.branch_id),
            employee_id,
        )?;
        self.attendance_repo.list_by_employee(employee_id, from, to).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MockAttendanceRepository, MockEmployeeRepository};
    use crate::services::fixtures;
    use bo_security::{AccessError, Role};
    use chrono::TimeZone;

    fn employees_with(employee: crate::domain::Employee) -> MockEmployeeRepository {
        let mut employees = MockEmployeeRepository::new();
        employees
            .expect_find_by_id()
            .returning(move |_| Ok(Some(employee.clone())));
        employees
    }

    #[tokio::test]
    async fn test_second_check_in_same_day_rejected() {
        let staff = fixtures::employee(Uuid::new_v4(), Role::Staff);
        let actor = fixtures::actor_for(&staff);
        let at = Utc.with_ymd_and_hms(2025, 6, 16, 8, 0, 0).unwrap();
        let existing = AttendanceRecord::check_in(staff.id, staff.branch_id, at, None);
        let staff_id = staff.id;

        let mut attendance = MockAttendanceRepository::new();
        attendance
            .expect_find_by_employee_and_date()
            .returning(move |_, _| Ok(Some(existing.clone())));
        attendance.expect_create().never();

        let service = AttendanceService::new(Arc::new(employees_with(staff)), Arc::new(attendance));
        let result = service.check_in(&actor, &staff_id, at).await;
        assert!(matches!(result, Err(DomainError::AlreadyCheckedIn { .. })));
    }

    #[tokio::test]
    async fn test_check_out_without_check_in() {
        let staff = fixtures::employee(Uuid::new_v4(), Role::Staff);
        let actor = fixtures::actor_for(&staff);
        let staff_id = staff.id;

        let mut attendance = MockAttendanceRepository::new();
        attendance
            .expect_find_by_employee_and_date()
            .returning(|_, _| Ok(None));

        let service = AttendanceService::new(Arc::new(employees_with(staff)), Arc::new(attendance));
        let at = Utc.with_ymd_and_hms(2025, 6, 16, 17, 0, 0).unwrap();
        let result = service.check_out(&actor, &staff_id, at).await;
        assert!(matches!(result, Err(DomainError::NotCheckedIn { .. })));
    }

    #[tokio::test]
    async fn test_terminated_employee_cannot_check_in() {
        let mut staff = fixtures::employee(Uuid::new_v4(), Role::Staff);
        staff.terminate(Uuid::new_v4());
        let staff_id = staff.id;

        let mut attendance = MockAttendanceRepository::new();
        attendance.expect_find_by_employee_and_date().never();

        let service = AttendanceService::new(Arc::new(employees_with(staff)), Arc::new(attendance));
        let result = service.check_in(&fixtures::admin(), &staff_id, Utc::now()).await;
        assert!(matches!(result, Err(DomainError::EmployeeInactive(_))));
    }

    #[tokio::test]
    async fn test_staff_cannot_check_in_colleague() {
        let branch_id = Uuid::new_v4();
        let staff = fixtures::employee(branch_id, Role::Staff);
        let colleague = fixtures::employee(branch_id, Role::Staff);
        let colleague_id = colleague.id;

        let service = AttendanceService::new(
            Arc::new(employees_with(colleague)),
            Arc::new(MockAttendanceRepository::new()),
        );
        let result = service
            .check_in(&fixtures::actor_for(&staff), &colleague_id, Utc::now())
            .await;
        assert!(matches!(result, Err(DomainError::Forbidden(AccessError::NotOwner(_)))));
    }
}
