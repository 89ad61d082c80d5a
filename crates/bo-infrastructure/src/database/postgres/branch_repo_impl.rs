// ============================================================================
// Back-office Infrastructure - PostgreSQL Branch Repository
// File: crates/bo-infrastructure/src/database/postgres/branch_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use bo_shared::Pagination;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use bo_core::domain::Branch;
use bo_core::error::DomainError;
use bo_core::repositories::{BranchRepository, SequenceStore};

use super::{db_error, unique_violation};

pub struct PgBranchRepository {
    pool: PgPool,
}

impl PgBranchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct BranchRow {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl From<BranchRow> for Branch {
    fn from(row: BranchRow) -> Self {
        Branch {
            id: row.id,
            code: row.code,
            name: row.name,
            address: row.address,
            phone: row.phone,
            email: row.email,
            is_active: row.is_active,
            created_at: row.created_at,
            created_by: row.created_by,
            modified_at: row.modified_at,
            modified_by: row.modified_by,
            removed_at: row.removed_at,
            removed_by: row.removed_by,
        }
    }
}

const BRANCH_COLUMNS: &str = r#"
    id, code, name, address, phone, email, is_active,
    created_at, created_by, modified_at, modified_by, removed_at, removed_by
"#;

#[async_trait]
impl BranchRepository for PgBranchRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Branch>, DomainError> {
        let row: Option<BranchRow> = sqlx::query_as(&format!(
            "SELECT {} FROM branches WHERE id = $1",
            BRANCH_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding branch by id", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Branch>, DomainError> {
        let row: Option<BranchRow> = sqlx::query_as(&format!(
            "SELECT {} FROM branches WHERE code = $1",
            BRANCH_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding branch by code", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list(&self, pagination: &Pagination) -> Result<Vec<Branch>, DomainError> {
        let rows: Vec<BranchRow> = sqlx::query_as(&format!(
            "SELECT {} FROM branches WHERE removed_at IS NULL ORDER BY code LIMIT $1 OFFSET $2",
            BRANCH_COLUMNS
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing branches", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, branch: &Branch) -> Result<Branch, DomainError> {
        let row: BranchRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO branches (
                id, code, name, address, phone, email, is_active,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            BRANCH_COLUMNS
        ))
        .bind(branch.id)
        .bind(&branch.code)
        .bind(&branch.name)
        .bind(&branch.address)
        .bind(&branch.phone)
        .bind(&branch.email)
        .bind(branch.is_active)
        .bind(branch.created_at)
        .bind(branch.created_by)
        .bind(branch.modified_at)
        .bind(branch.modified_by)
        .bind(branch.removed_at)
        .bind(branch.removed_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(_) => DomainError::IdentifierAlreadyExists(branch.code.clone()),
            None => db_error("creating branch", e),
        })?;

        info!("Branch created: {} ({})", row.code, row.id);
        Ok(row.into())
    }

    async fn update(&self, branch: &Branch) -> Result<Branch, DomainError> {
        let row: Option<BranchRow> = sqlx::query_as(&format!(
            r#"
            UPDATE branches
            SET
                name = $2,
                address = $3,
                phone = $4,
                email = $5,
                is_active = $6,
                modified_at = $7,
                modified_by = $8,
                removed_at = $9,
                removed_by = $10
            WHERE id = $1
            RETURNING {}
            "#,
            BRANCH_COLUMNS
        ))
        .bind(branch.id)
        .bind(&branch.name)
        .bind(&branch.address)
        .bind(&branch.phone)
        .bind(&branch.email)
        .bind(branch.is_active)
        .bind(branch.modified_at)
        .bind(branch.modified_by)
        .bind(branch.removed_at)
        .bind(branch.removed_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("updating branch", e))?;

        row.map(Into::into).ok_or(DomainError::BranchNotFound(branch.id))
    }
}

#[async_trait]
impl SequenceStore for PgBranchRepository {
    async fn latest_identifier(&self, prefix: &str) -> Result<Option<String>, DomainError> {
        super::latest_identifier(&self.pool, "branches", "code", prefix).await
    }

    async fn identifier_exists(&self, identifier: &str) -> Result<bool, DomainError> {
        super::identifier_exists(&self.pool, "branches", "code", identifier).await
    }
}
