//! Attendance repository trait (port)

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::AttendanceRecord;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    async fn find_by_employee_and_date(
        &self,
        employee_id: &Uuid,
        work_date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, DomainError>;
    /// Records with `from <= work_date <= to`, oldest first.
    async fn list_by_employee(
        &self,
        employee_id: &Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, DomainError>;
    /// Fails with `AlreadyCheckedIn` when a record exists for the employee and date.
    async fn create(&self, record: &AttendanceRecord) -> Result<AttendanceRecord, DomainError>;
    async fn update(&self, record: &AttendanceRecord) -> Result<AttendanceRecord, DomainError>;
}
