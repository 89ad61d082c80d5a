//! In-memory attendance records

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use bo_core::domain::AttendanceRecord;
use bo_core::error::DomainError;
use bo_core::repositories::AttendanceRepository;

/// Keyed by employee and work date, the unique key of the table.
#[derive(Default)]
pub struct MemoryAttendanceRepository {
    records: RwLock<HashMap<(Uuid, NaiveDate), AttendanceRecord>>,
}

impl MemoryAttendanceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttendanceRepository for MemoryAttendanceRepository {
    async fn find_by_employee_and_date(
        &self,
        employee_id: &Uuid,
        work_date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, DomainError> {
        Ok(self.records.read().get(&(*employee_id, work_date)).cloned())
    }

    async fn list_by_employee(
        &self,
        employee_id: &Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, DomainError> {
        let mut records: Vec<AttendanceRecord> = self
            .records
            .read()
            .values()
            .filter(|r| r.employee_id == *employee_id && r.work_date >= from && r.work_date <= to)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.work_date);
        Ok(records)
    }

    async fn create(&self, record: &AttendanceRecord) -> Result<AttendanceRecord, DomainError> {
        let mut records = self.records.write();
        let key = (record.employee_id, record.work_date);
        if records.contains_key(&key) {
            return Err(DomainError::AlreadyCheckedIn {
                employee_id: record.employee_id,
                date: record.work_date,
            });
        }
        records.insert(key, record.clone());
        Ok(record.clone())
    }

    async fn update(&self, record: &AttendanceRecord) -> Result<AttendanceRecord, DomainError> {
        let mut records = self.records.write();
        let not_checked_in = DomainError::NotCheckedIn {
            employee_id: record.employee_id,
            date: record.work_date,
        };
        let stored = records
            .get_mut(&(record.employee_id, record.work_date))
            .filter(|r| r.check_out.is_none())
            .ok_or(not_checked_in)?;
        stored.check_out = record.check_out;
        stored.modified_at = record.modified_at;
        stored.modified_by = record.modified_by;
        Ok(stored.clone())
    }
}
