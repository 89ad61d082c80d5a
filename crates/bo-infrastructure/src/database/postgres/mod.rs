//! PostgreSQL repository implementations

pub mod attendance_repo_impl;
pub mod branch_repo_impl;
pub mod client_repo_impl;
pub mod employee_repo_impl;
pub mod invoice_repo_impl;
pub mod leave_repo_impl;
pub mod task_repo_impl;

pub use attendance_repo_impl::PgAttendanceRepository;
pub use branch_repo_impl::PgBranchRepository;
pub use client_repo_impl::PgClientRepository;
pub use employee_repo_impl::PgEmployeeRepository;
pub use invoice_repo_impl::PgInvoiceRepository;
pub use leave_repo_impl::PgLeaveRepository;
pub use task_repo_impl::PgTaskRepository;

use bo_core::error::DomainError;
use sqlx::PgPool;
use tracing::error;

/// Logs and wraps a driver error.
pub(crate) fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    error!("Database error {}: {}", context, e);
    DomainError::DatabaseError(e.to_string())
}

/// Name of the unique constraint `e` violated, if any.
pub(crate) fn unique_violation(e: &sqlx::Error) -> Option<String> {
    e.as_database_error()
        .filter(|db| db.is_unique_violation())
        .map(|db| db.constraint().unwrap_or_default().to_string())
}

/// Identifier under `prefix` with the largest all-digit suffix.
///
/// `table` and `column` are compile-time names, never user input.
pub(crate) async fn latest_identifier(
    pool: &PgPool,
    table: &'static str,
    column: &'static str,
    prefix: &str,
) -> Result<Option<String>, DomainError> {
    let sql = format!(
        r#"
        SELECT {column}
        FROM {table}
        WHERE starts_with({column}, $1)
          AND substr({column}, $2) ~ '^[0-9]+$'
        ORDER BY CAST(substr({column}, $2) AS numeric) DESC
        LIMIT 1
        "#,
        column = column,
        table = table,
    );
    let suffix_start = prefix.chars().count() as i32 + 1;

    sqlx::query_scalar::<_, String>(&sql)
        .bind(prefix)
        .bind(suffix_start)
        .fetch_optional(pool)
        .await
        .map_err(|e| db_error("reading latest identifier", e))
}

pub(crate) async fn identifier_exists(
    pool: &PgPool,
    table: &'static str,
    column: &'static str,
    identifier: &str,
) -> Result<bool, DomainError> {
    let sql = format!(
        "SELECT EXISTS (SELECT 1 FROM {table} WHERE {column} = $1)",
        table = table,
        column = column,
    );

    sqlx::query_scalar::<_, bool>(&sql)
        .bind(identifier)
        .fetch_one(pool)
        .await
        .map_err(|e| db_error("checking identifier", e))
}
