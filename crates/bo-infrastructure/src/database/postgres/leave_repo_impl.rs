// ============================================================================
// Back-office Infrastructure - PostgreSQL Leave Repository
// File: crates/bo-infrastructure/src/database/postgres/leave_repo_impl.rs
// Description: Leave requests and balances, changed together in transactions
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgExecutor, PgPool, Postgres, Transaction};
use tracing::{info, warn};
use uuid::Uuid;

use bo_core::domain::{BalanceDelta, LeaveBalance, LeaveRequest, LeaveStatus, LeaveType};
use bo_core::error::DomainError;
use bo_core::repositories::LeaveRepository;

use super::db_error;

pub struct PgLeaveRepository {
    pool: PgPool,
}

impl PgLeaveRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct LeaveBalanceRow {
    pub employee_id: Uuid,
    pub year: i32,
    pub leave_type: String,
    pub entitled_days: i32,
    pub used_days: i32,
    pub pending_days: i32,
}

impl TryFrom<LeaveBalanceRow> for LeaveBalance {
    type Error = DomainError;

    fn try_from(row: LeaveBalanceRow) -> Result<Self, Self::Error> {
        Ok(LeaveBalance {
            employee_id: row.employee_id,
            year: row.year,
            leave_type: parse_leave_type(&row.leave_type)?,
            entitled_days: row.entitled_days,
            used_days: row.used_days,
            pending_days: row.pending_days,
        })
    }
}

#[derive(Debug, FromRow)]
struct LeaveRequestRow {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: i32,
    pub reason: Option<String>,
    pub status: String,
    pub decided_by: Option<Uuid>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
}

impl TryFrom<LeaveRequestRow> for LeaveRequest {
    type Error = DomainError;

    fn try_from(row: LeaveRequestRow) -> Result<Self, Self::Error> {
        Ok(LeaveRequest {
            id: row.id,
            employee_id: row.employee_id,
            leave_type: parse_leave_type(&row.leave_type)?,
            start_date: row.start_date,
            end_date: row.end_date,
            days: row.days,
            reason: row.reason,
            status: LeaveStatus::from_str(&row.status).unwrap_or_default(),
            decided_by: row.decided_by,
            decided_at: row.decided_at,
            created_at: row.created_at,
            created_by: row.created_by,
            modified_at: row.modified_at,
            modified_by: row.modified_by,
        })
    }
}

fn parse_leave_type(value: &str) -> Result<LeaveType, DomainError> {
    LeaveType::from_str(value)
        .ok_or_else(|| DomainError::InternalError(format!("Unknown leave type: {}", value)))
}

const REQUEST_COLUMNS: &str = r#"
    id, employee_id, leave_type, start_date, end_date, days, reason, status,
    decided_by, decided_at, created_at, created_by, modified_at, modified_by
"#;

/// Adds `delta` to a balance inside `tx`.
async fn apply_delta(
    tx: &mut Transaction<'_, Postgres>,
    request: &LeaveRequest,
    delta: BalanceDelta,
) -> Result<(), DomainError> {
    if delta == BalanceDelta::default() {
        return Ok(());
    }

    let result = sqlx::query(
        r#"
        UPDATE leave_balances
        SET pending_days = pending_days + $4, used_days = used_days + $5
        WHERE employee_id = $1 AND year = $2 AND leave_type = $3
        "#,
    )
    .bind(request.employee_id)
    .bind(request.year())
    .bind(request.leave_type.as_str())
    .bind(delta.pending)
    .bind(delta.used)
    .execute(&mut **tx)
    .await
    .map_err(|e| db_error("updating leave balance", e))?;

    if result.rows_affected() == 0 {
        return Err(DomainError::InternalError(format!(
            "No {} balance for employee {} in {}",
            request.leave_type.as_str(),
            request.employee_id,
            request.year()
        )));
    }
    Ok(())
}

/// First pending or approved request of the employee intersecting the range.
async fn overlapping<'e, X>(
    executor: X,
    employee_id: &Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Option<LeaveRequest>, DomainError>
where
    X: PgExecutor<'e>,
{
    let row: Option<LeaveRequestRow> = sqlx::query_as(&format!(
        r#"
        SELECT {}
        FROM leave_requests
        WHERE employee_id = $1
          AND status IN ('pending', 'approved')
          AND start_date <= $3 AND $2 <= end_date
        ORDER BY start_date
        LIMIT 1
        "#,
        REQUEST_COLUMNS
    ))
    .bind(employee_id)
    .bind(start)
    .bind(end)
    .fetch_optional(executor)
    .await
    .map_err(|e| db_error("finding overlapping leave", e))?;

    row.map(LeaveRequest::try_from).transpose()
}

#[async_trait]
impl LeaveRepository for PgLeaveRepository {
    async fn find_balance(
        &self,
        employee_id: &Uuid,
        year: i32,
        leave_type: LeaveType,
    ) -> Result<Option<LeaveBalance>, DomainError> {
        let row: Option<LeaveBalanceRow> = sqlx::query_as(
            r#"
            SELECT employee_id, year, leave_type, entitled_days, used_days, pending_days
            FROM leave_balances
            WHERE employee_id = $1 AND year = $2 AND leave_type = $3
            "#,
        )
        .bind(employee_id)
        .bind(year)
        .bind(leave_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding leave balance", e))?;

        row.map(LeaveBalance::try_from).transpose()
    }

    async fn create_balance(&self, balance: &LeaveBalance) -> Result<LeaveBalance, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO leave_balances (employee_id, year, leave_type, entitled_days, used_days, pending_days)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (employee_id, year, leave_type) DO NOTHING
            "#,
        )
        .bind(balance.employee_id)
        .bind(balance.year)
        .bind(balance.leave_type.as_str())
        .bind(balance.entitled_days)
        .bind(balance.used_days)
        .bind(balance.pending_days)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("creating leave balance", e))?;

        self.find_balance(&balance.employee_id, balance.year, balance.leave_type)
            .await?
            .ok_or_else(|| DomainError::InternalError("Leave balance vanished after insert".to_string()))
    }

    async fn list_balances(&self, employee_id: &Uuid, year: i32) -> Result<Vec<LeaveBalance>, DomainError> {
        let rows: Vec<LeaveBalanceRow> = sqlx::query_as(
            r#"
            SELECT employee_id, year, leave_type, entitled_days, used_days, pending_days
            FROM leave_balances
            WHERE employee_id = $1 AND year = $2
            ORDER BY leave_type
            "#,
        )
        .bind(employee_id)
        .bind(year)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing leave balances", e))?;

        rows.into_iter().map(LeaveBalance::try_from).collect()
    }

    async fn find_request(&self, id: &Uuid) -> Result<Option<LeaveRequest>, DomainError> {
        let row: Option<LeaveRequestRow> = sqlx::query_as(&format!(
            "SELECT {} FROM leave_requests WHERE id = $1",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding leave request", e))?;

        row.map(LeaveRequest::try_from).transpose()
    }

    async fn list_requests(&self, employee_id: &Uuid) -> Result<Vec<LeaveRequest>, DomainError> {
        let rows: Vec<LeaveRequestRow> = sqlx::query_as(&format!(
            "SELECT {} FROM leave_requests WHERE employee_id = $1 ORDER BY start_date DESC",
            REQUEST_COLUMNS
        ))
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing leave requests", e))?;

        rows.into_iter().map(LeaveRequest::try_from).collect()
    }

    async fn find_overlapping(
        &self,
        employee_id: &Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<LeaveRequest>, DomainError> {
        overlapping(&self.pool, employee_id, start, end).await
    }

    async fn submit_request(&self, request: &LeaveRequest) -> Result<LeaveRequest, DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| db_error("starting transaction", e))?;

        // 1. Serialize submissions per employee, then refuse double booking
        sqlx::query("SELECT id FROM employees WHERE id = $1 FOR UPDATE")
            .bind(request.employee_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("locking employee for leave", e))?;

        if let Some(existing) = overlapping(&mut *tx, &request.employee_id, request.start_date, request.end_date).await? {
            warn!(employee_id = %request.employee_id, existing = %existing.id, "Overlapping leave request");
            return Err(DomainError::OverlappingLeave(existing.id));
        }

        // 2. Hold the days, refusing paid leave the balance cannot cover
        let held = sqlx::query(
            r#"
            UPDATE leave_balances
            SET pending_days = pending_days + $4
            WHERE employee_id = $1 AND year = $2 AND leave_type = $3
              AND (NOT $5 OR entitled_days - used_days - pending_days >= $4)
            "#,
        )
        .bind(request.employee_id)
        .bind(request.year())
        .bind(request.leave_type.as_str())
        .bind(request.days)
        .bind(request.leave_type.is_paid())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("holding leave days", e))?;

        if held.rows_affected() == 0 {
            let available: Option<i32> = sqlx::query_scalar(
                r#"
                SELECT entitled_days - used_days - pending_days
                FROM leave_balances
                WHERE employee_id = $1 AND year = $2 AND leave_type = $3
                "#,
            )
            .bind(request.employee_id)
            .bind(request.year())
            .bind(request.leave_type.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| db_error("reading leave balance", e))?;

            warn!(employee_id = %request.employee_id, days = request.days, "Leave balance exhausted");
            return Err(DomainError::InsufficientLeaveBalance {
                requested: request.days,
                available: available.unwrap_or(0),
            });
        }

        // 3. Record the request
        let row: LeaveRequestRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO leave_requests (
                id, employee_id, leave_type, start_date, end_date, days, reason, status,
                decided_by, decided_at, created_at, created_by, modified_at, modified_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(request.id)
        .bind(request.employee_id)
        .bind(request.leave_type.as_str())
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.days)
        .bind(&request.reason)
        .bind(request.status.as_str())
        .bind(request.decided_by)
        .bind(request.decided_at)
        .bind(request.created_at)
        .bind(request.created_by)
        .bind(request.modified_at)
        .bind(request.modified_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("creating leave request", e))?;

        tx.commit().await.map_err(|e| db_error("committing leave request", e))?;

        info!("Leave request stored: {}", row.id);
        row.try_into()
    }

    async fn transition_request(
        &self,
        request: &LeaveRequest,
        from: LeaveStatus,
        delta: BalanceDelta,
    ) -> Result<LeaveRequest, DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| db_error("starting transaction", e))?;

        let row: Option<LeaveRequestRow> = sqlx::query_as(&format!(
            r#"
            UPDATE leave_requests
            SET status = $2, decided_by = $3, decided_at = $4, modified_at = $5, modified_by = $6
            WHERE id = $1 AND status = $7
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(request.id)
        .bind(request.status.as_str())
        .bind(request.decided_by)
        .bind(request.decided_at)
        .bind(request.modified_at)
        .bind(request.modified_by)
        .bind(from.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("updating leave request", e))?;

        // A concurrent decision got there first; the transaction rolls back on drop.
        let row = row.ok_or(DomainError::InvalidStatusTransition {
            entity: "leave request",
            from: from.as_str(),
            to: request.status.as_str(),
        })?;

        apply_delta(&mut tx, request, delta).await?;
        tx.commit().await.map_err(|e| db_error("committing leave decision", e))?;

        row.try_into()
    }
}
