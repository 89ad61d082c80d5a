//! PostgreSQL client repository

use async_trait::async_trait;
use bo_shared::Pagination;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use bo_core::domain::Client;
use bo_core::error::DomainError;
use bo_core::repositories::ClientRepository;

use super::db_error;

pub struct PgClientRepository {
    pool: PgPool,
}

impl PgClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ClientRow {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: row.id,
            branch_id: row.branch_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
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

#[async_trait]
impl ClientRepository for PgClientRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Client>, DomainError> {
        let row: Option<ClientRow> = sqlx::query_as(
            r#"
            SELECT
                id, branch_id, name, email, phone, address, is_active,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            FROM clients
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding client by id", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list_by_branch(&self, branch_id: &Uuid, pagination: &Pagination) -> Result<Vec<Client>, DomainError> {
        let rows: Vec<ClientRow> = sqlx::query_as(
            r#"
            SELECT
                id, branch_id, name, email, phone, address, is_active,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            FROM clients
            WHERE branch_id = $1 AND removed_at IS NULL
            ORDER BY name
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(branch_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing clients", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, client: &Client) -> Result<Client, DomainError> {
        let row: ClientRow = sqlx::query_as(
            r#"
            INSERT INTO clients (
                id, branch_id, name, email, phone, address, is_active,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING
                id, branch_id, name, email, phone, address, is_active,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            "#,
        )
        .bind(client.id)
        .bind(client.branch_id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address)
        .bind(client.is_active)
        .bind(client.created_at)
        .bind(client.created_by)
        .bind(client.modified_at)
        .bind(client.modified_by)
        .bind(client.removed_at)
        .bind(client.removed_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("creating client", e))?;

        Ok(row.into())
    }

    async fn update(&self, client: &Client) -> Result<Client, DomainError> {
        let row: Option<ClientRow> = sqlx::query_as(
            r#"
            UPDATE clients
            SET
                name = $2,
                email = $3,
                phone = $4,
                address = $5,
                is_active = $6,
                modified_at = $7,
                modified_by = $8,
                removed_at = $9,
                removed_by = $10
            WHERE id = $1
            RETURNING
                id, branch_id, name, email, phone, address, is_active,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            "#,
        )
        .bind(client.id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address)
        .bind(client.is_active)
        .bind(client.modified_at)
        .bind(client.modified_by)
        .bind(client.removed_at)
        .bind(client.removed_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("updating client", e))?;

        row.map(Into::into).ok_or(DomainError::ClientNotFound(client.id))
    }
}
