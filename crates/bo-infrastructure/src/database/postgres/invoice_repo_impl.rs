// ============================================================================
// Back-office Infrastructure - PostgreSQL Invoice Repository
// File: crates/bo-infrastructure/src/database/postgres/invoice_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use bo_shared::Pagination;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use bo_core::domain::{Invoice, InvoiceItem, InvoiceStatus};
use bo_core::error::DomainError;
use bo_core::repositories::{InvoiceRepository, SequenceStore};

use super::{db_error, unique_violation};

pub struct PgInvoiceRepository {
    pool: PgPool,
}

impl PgInvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Line items live in a JSONB column
#[derive(Debug, FromRow)]
struct InvoiceRow {
    pub id: Uuid,
    pub number: String,
    pub branch_id: Uuid,
    pub client_id: Uuid,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub items: Json<Vec<InvoiceItem>>,
    pub subtotal: i64,
    pub tax_rate_bps: i32,
    pub tax_amount: i64,
    pub total: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl From<InvoiceRow> for Invoice {
    fn from(row: InvoiceRow) -> Self {
        Invoice {
            id: row.id,
            number: row.number,
            branch_id: row.branch_id,
            client_id: row.client_id,
            issue_date: row.issue_date,
            due_date: row.due_date,
            items: row.items.0,
            subtotal: row.subtotal,
            tax_rate_bps: row.tax_rate_bps,
            tax_amount: row.tax_amount,
            total: row.total,
            status: InvoiceStatus::from_str(&row.status).unwrap_or_default(),
            created_at: row.created_at,
            created_by: row.created_by,
            modified_at: row.modified_at,
            modified_by: row.modified_by,
            removed_at: row.removed_at,
            removed_by: row.removed_by,
        }
    }
}

const INVOICE_COLUMNS: &str = r#"
    id, number, branch_id, client_id, issue_date, due_date, items,
    subtotal, tax_rate_bps, tax_amount, total, status,
    created_at, created_by, modified_at, modified_by, removed_at, removed_by
"#;

#[async_trait]
impl InvoiceRepository for PgInvoiceRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Invoice>, DomainError> {
        let row: Option<InvoiceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM invoices WHERE id = $1",
            INVOICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding invoice by id", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_number(&self, number: &str) -> Result<Option<Invoice>, DomainError> {
        let row: Option<InvoiceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM invoices WHERE number = $1",
            INVOICE_COLUMNS
        ))
        .bind(number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding invoice by number", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list_by_branch(&self, branch_id: &Uuid, pagination: &Pagination) -> Result<Vec<Invoice>, DomainError> {
        let rows: Vec<InvoiceRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM invoices
            WHERE branch_id = $1 AND removed_at IS NULL
            ORDER BY issue_date DESC, number DESC
            LIMIT $2 OFFSET $3
            "#,
            INVOICE_COLUMNS
        ))
        .bind(branch_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing invoices", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, invoice: &Invoice) -> Result<Invoice, DomainError> {
        let row: InvoiceRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO invoices (
                id, number, branch_id, client_id, issue_date, due_date, items,
                subtotal, tax_rate_bps, tax_amount, total, status,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING {}
            "#,
            INVOICE_COLUMNS
        ))
        .bind(invoice.id)
        .bind(&invoice.number)
        .bind(invoice.branch_id)
        .bind(invoice.client_id)
        .bind(invoice.issue_date)
        .bind(invoice.due_date)
        .bind(Json(&invoice.items))
        .bind(invoice.subtotal)
        .bind(invoice.tax_rate_bps)
        .bind(invoice.tax_amount)
        .bind(invoice.total)
        .bind(invoice.status.as_str())
        .bind(invoice.created_at)
        .bind(invoice.created_by)
        .bind(invoice.modified_at)
        .bind(invoice.modified_by)
        .bind(invoice.removed_at)
        .bind(invoice.removed_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(_) => DomainError::IdentifierAlreadyExists(invoice.number.clone()),
            None => db_error("creating invoice", e),
        })?;

        info!("Invoice created: {} ({})", row.number, row.id);
        Ok(row.into())
    }

    /// Only status and audit columns change after creation.
    async fn transition(&self, invoice: &Invoice, from: InvoiceStatus) -> Result<Invoice, DomainError> {
        let row: Option<InvoiceRow> = sqlx::query_as(&format!(
            r#"
            UPDATE invoices
            SET
                status = $2,
                modified_at = $3,
                modified_by = $4,
                removed_at = $5,
                removed_by = $6
            WHERE id = $1 AND status = $7
            RETURNING {}
            "#,
            INVOICE_COLUMNS
        ))
        .bind(invoice.id)
        .bind(invoice.status.as_str())
        .bind(invoice.modified_at)
        .bind(invoice.modified_by)
        .bind(invoice.removed_at)
        .bind(invoice.removed_by)
        .bind(from.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("updating invoice", e))?;

        if let Some(row) = row {
            return Ok(row.into());
        }

        // Missing, or moved on since it was read
        let current: Option<String> = sqlx::query_scalar("SELECT status FROM invoices WHERE id = $1")
            .bind(invoice.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("reading invoice status", e))?;

        match current {
            None => Err(DomainError::InvoiceNotFound(invoice.id)),
            Some(current) => Err(DomainError::InvalidStatusTransition {
                entity: "invoice",
                from: InvoiceStatus::from_str(&current).unwrap_or(from).as_str(),
                to: invoice.status.as_str(),
            }),
        }
    }
}

#[async_trait]
impl SequenceStore for PgInvoiceRepository {
    async fn latest_identifier(&self, prefix: &str) -> Result<Option<String>, DomainError> {
        super::latest_identifier(&self.pool, "invoices", "number", prefix).await
    }

    async fn identifier_exists(&self, identifier: &str) -> Result<bool, DomainError> {
        super::identifier_exists(&self.pool, "invoices", "number", identifier).await
    }
}
