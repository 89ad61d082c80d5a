// ============================================================================
// Back-office Infrastructure - PostgreSQL Employee Repository
// File: crates/bo-infrastructure/src/database/postgres/employee_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use bo_security::Role;
use bo_shared::Pagination;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use bo_core::domain::{Employee, EmploymentStatus};
use bo_core::error::DomainError;
use bo_core::repositories::{EmployeeRepository, SequenceStore};

use super::{db_error, unique_violation};

pub struct PgEmployeeRepository {
    pool: PgPool,
}

impl PgEmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EmployeeRow {
    pub id: Uuid,
    pub code: String,
    pub branch_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub role: String,
    pub hired_on: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Employee {
            id: row.id,
            code: row.code,
            branch_id: row.branch_id,
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            position: row.position,
            role: Role::from_str(&row.role).unwrap_or_default(),
            hired_on: row.hired_on,
            status: EmploymentStatus::from_str(&row.status).unwrap_or_default(),
            created_at: row.created_at,
            created_by: row.created_by,
            modified_at: row.modified_at,
            modified_by: row.modified_by,
            removed_at: row.removed_at,
            removed_by: row.removed_by,
        }
    }
}

const EMPLOYEE_COLUMNS: &str = r#"
    id, code, branch_id, full_name, email, phone, position, role, hired_on, status,
    created_at, created_by, modified_at, modified_by, removed_at, removed_by
"#;

#[async_trait]
impl EmployeeRepository for PgEmployeeRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Employee>, DomainError> {
        let row: Option<EmployeeRow> = sqlx::query_as(&format!(
            "SELECT {} FROM employees WHERE id = $1",
            EMPLOYEE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding employee by id", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, DomainError> {
        let row: Option<EmployeeRow> = sqlx::query_as(&format!(
            "SELECT {} FROM employees WHERE LOWER(email) = LOWER($1)",
            EMPLOYEE_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding employee by email", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list_by_branch(&self, branch_id: &Uuid, pagination: &Pagination) -> Result<Vec<Employee>, DomainError> {
        let rows: Vec<EmployeeRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM employees
            WHERE branch_id = $1 AND removed_at IS NULL
            ORDER BY code
            LIMIT $2 OFFSET $3
            "#,
            EMPLOYEE_COLUMNS
        ))
        .bind(branch_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing employees", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, employee: &Employee) -> Result<Employee, DomainError> {
        let row: EmployeeRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO employees (
                id, code, branch_id, full_name, email, phone, position, role, hired_on, status,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {}
            "#,
            EMPLOYEE_COLUMNS
        ))
        .bind(employee.id)
        .bind(&employee.code)
        .bind(employee.branch_id)
        .bind(&employee.full_name)
        .bind(&employee.email)
        .bind(&employee.phone)
        .bind(&employee.position)
        .bind(employee.role.as_str())
        .bind(employee.hired_on)
        .bind(employee.status.as_str())
        .bind(employee.created_at)
        .bind(employee.created_by)
        .bind(employee.modified_at)
        .bind(employee.modified_by)
        .bind(employee.removed_at)
        .bind(employee.removed_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(constraint) if constraint.contains("email") => {
                DomainError::EmailAlreadyExists(employee.email.clone())
            }
            Some(_) => DomainError::IdentifierAlreadyExists(employee.code.clone()),
            None => db_error("creating employee", e),
        })?;

        info!("Employee created: {} ({})", row.code, row.id);
        Ok(row.into())
    }

    async fn update(&self, employee: &Employee) -> Result<Employee, DomainError> {
        let row: Option<EmployeeRow> = sqlx::query_as(&format!(
            r#"
            UPDATE employees
            SET
                full_name = $2,
                phone = $3,
                position = $4,
                role = $5,
                status = $6,
                modified_at = $7,
                modified_by = $8,
                removed_at = $9,
                removed_by = $10
            WHERE id = $1
            RETURNING {}
            "#,
            EMPLOYEE_COLUMNS
        ))
        .bind(employee.id)
        .bind(&employee.full_name)
        .bind(&employee.phone)
        .bind(&employee.position)
        .bind(employee.role.as_str())
        .bind(employee.status.as_str())
        .bind(employee.modified_at)
        .bind(employee.modified_by)
        .bind(employee.removed_at)
        .bind(employee.removed_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("updating employee", e))?;

        row.map(Into::into).ok_or(DomainError::EmployeeNotFound(employee.id))
    }
}

#[async_trait]
impl SequenceStore for PgEmployeeRepository {
    async fn latest_identifier(&self, prefix: &str) -> Result<Option<String>, DomainError> {
        super::latest_identifier(&self.pool, "employees", "code", prefix).await
    }

    async fn identifier_exists(&self, identifier: &str) -> Result<bool, DomainError> {
        super::identifier_exists(&self.pool, "employees", "code", identifier).await
    }
}
