//! PostgreSQL attendance repository

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use bo_core::domain::AttendanceRecord;
use bo_core::error::DomainError;
use bo_core::repositories::AttendanceRepository;

use super::{db_error, unique_violation};

pub struct PgAttendanceRepository {
    pool: PgPool,
}

impl PgAttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AttendanceRow {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub branch_id: Uuid,
    pub work_date: NaiveDate,
    pub check_in: DateTime<Utc>,
    pub check_out: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
}

impl From<AttendanceRow> for AttendanceRecord {
    fn from(row: AttendanceRow) -> Self {
        AttendanceRecord {
            id: row.id,
            employee_id: row.employee_id,
            branch_id: row.branch_id,
            work_date: row.work_date,
            check_in: row.check_in,
            check_out: row.check_out,
            created_at: row.created_at,
            created_by: row.created_by,
            modified_at: row.modified_at,
            modified_by: row.modified_by,
        }
    }
}

#[async_trait]
impl AttendanceRepository for PgAttendanceRepository {
    async fn find_by_employee_and_date(
        &self,
        employee_id: &Uuid,
        work_date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, DomainError> {
        let row: Option<AttendanceRow> = sqlx::query_as(
            r#"
            SELECT
                id, employee_id, branch_id, work_date, check_in, check_out,
                created_at, created_by, modified_at, modified_by
            FROM attendance_records
            WHERE employee_id = $1 AND work_date = $2
            "#,
        )
        .bind(employee_id)
        .bind(work_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding attendance", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list_by_employee(
        &self,
        employee_id: &Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, DomainError> {
        let rows: Vec<AttendanceRow> = sqlx::query_as(
            r#"
            SELECT
                id, employee_id, branch_id, work_date, check_in, check_out,
                created_at, created_by, modified_at, modified_by
            FROM attendance_records
            WHERE employee_id = $1 AND work_date BETWEEN $2 AND $3
            ORDER BY work_date
            "#,
        )
        .bind(employee_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing attendance", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, record: &AttendanceRecord) -> Result<AttendanceRecord, DomainError> {
        let row: AttendanceRow = sqlx::query_as(
            r#"
            INSERT INTO attendance_records (
                id, employee_id, branch_id, work_date, check_in, check_out,
                created_at, created_by, modified_at, modified_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING
                id, employee_id, branch_id, work_date, check_in, check_out,
                created_at, created_by, modified_at, modified_by
            "#,
        )
        .bind(record.id)
        .bind(record.employee_id)
        .bind(record.branch_id)
        .bind(record.work_date)
        .bind(record.check_in)
        .bind(record.check_out)
        .bind(record.created_at)
        .bind(record.created_by)
        .bind(record.modified_at)
        .bind(record.modified_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(_) => DomainError::AlreadyCheckedIn {
                employee_id: record.employee_id,
                date: record.work_date,
            },
            None => db_error("creating attendance", e),
        })?;

        Ok(row.into())
    }

    async fn update(&self, record: &AttendanceRecord) -> Result<AttendanceRecord, DomainError> {
        // Guarded so two concurrent check-outs cannot both land.
        let row: Option<AttendanceRow> = sqlx::query_as(
            r#"
            UPDATE attendance_records
            SET check_out = $2, modified_at = $3, modified_by = $4
            WHERE id = $1 AND check_out IS NULL
            RETURNING
                id, employee_id, branch_id, work_date, check_in, check_out,
                created_at, created_by, modified_at, modified_by
            "#,
        )
        .bind(record.id)
        .bind(record.check_out)
        .bind(record.modified_at)
        .bind(record.modified_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("updating attendance", e))?;

        row.map(Into::into).ok_or(DomainError::NotCheckedIn {
            employee_id: record.employee_id,
            date: record.work_date,
        })
    }
}
