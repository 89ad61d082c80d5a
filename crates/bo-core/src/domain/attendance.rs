//! Attendance record entity

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// One check-in/check-out pair per employee per work date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub branch_id: Uuid,
    pub work_date: NaiveDate,
    pub check_in: DateTime<Utc>,
    pub check_out: Option<DateTime<Utc>>,

    // Audit
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
}

impl AttendanceRecord {
    pub fn check_in(employee_id: Uuid, branch_id: Uuid, at: DateTime<Utc>, created_by: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            branch_id,
            work_date: at.date_naive(),
            check_in: at,
            check_out: None,
            created_at: Utc::now(),
            created_by,
            modified_at: None,
            modified_by: None,
        }
    }

    pub fn check_out(&mut self, at: DateTime<Utc>, by: Uuid) -> Result<(), DomainError> {
        if self.check_out.is_some() {
            return Err(DomainError::NotCheckedIn {
                employee_id: self.employee_id,
                date: self.work_date,
            });
        }
        if at < self.check_in {
            return Err(DomainError::ValidationError(
                "Check-out cannot be before check-in".to_string(),
            ));
        }
        self.check_out = Some(at);
        self.modified_at = Some(Utc::now());
        self.modified_by = Some(by);
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.check_out.is_none()
    }

    /// Zero while the record is still open.
    pub fn worked_minutes(&self) -> i64 {
        self.check_out
            .map(|out| (out - self.check_in).num_minutes())
            .unwrap_or(0)
    }
}
