//! PostgreSQL task repository

use async_trait::async_trait;
use bo_shared::Pagination;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use bo_core::domain::{Task, TaskStatus};
use bo_core::error::DomainError;
use bo_core::repositories::TaskRepository;

use super::db_error;

pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TaskRow {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub client_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: row.id,
            branch_id: row.branch_id,
            client_id: row.client_id,
            assignee_id: row.assignee_id,
            title: row.title,
            description: row.description,
            status: TaskStatus::from_str(&row.status).unwrap_or_default(),
            due_date: row.due_date,
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
impl TaskRepository for PgTaskRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Task>, DomainError> {
        let row: Option<TaskRow> = sqlx::query_as(
            r#"
            SELECT
                id, branch_id, client_id, assignee_id, title, description, status, due_date,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            FROM tasks
            WHERE id = $1 AND removed_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding task by id", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list_by_branch(&self, branch_id: &Uuid, pagination: &Pagination) -> Result<Vec<Task>, DomainError> {
        let rows: Vec<TaskRow> = sqlx::query_as(
            r#"
            SELECT
                id, branch_id, client_id, assignee_id, title, description, status, due_date,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            FROM tasks
            WHERE branch_id = $1 AND removed_at IS NULL
            ORDER BY due_date NULLS LAST, created_at
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(branch_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing tasks", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, task: &Task) -> Result<Task, DomainError> {
        let row: TaskRow = sqlx::query_as(
            r#"
            INSERT INTO tasks (
                id, branch_id, client_id, assignee_id, title, description, status, due_date,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING
                id, branch_id, client_id, assignee_id, title, description, status, due_date,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            "#,
        )
        .bind(task.id)
        .bind(task.branch_id)
        .bind(task.client_id)
        .bind(task.assignee_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.due_date)
        .bind(task.created_at)
        .bind(task.created_by)
        .bind(task.modified_at)
        .bind(task.modified_by)
        .bind(task.removed_at)
        .bind(task.removed_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("creating task", e))?;

        Ok(row.into())
    }

    async fn update(&self, task: &Task, expected: TaskStatus) -> Result<Task, DomainError> {
        let row: Option<TaskRow> = sqlx::query_as(
            r#"
            UPDATE tasks
            SET
                client_id = $2,
                assignee_id = $3,
                title = $4,
                description = $5,
                status = $6,
                due_date = $7,
                modified_at = $8,
                modified_by = $9,
                removed_at = $10,
                removed_by = $11
            WHERE id = $1 AND status = $12
            RETURNING
                id, branch_id, client_id, assignee_id, title, description, status, due_date,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            "#,
        )
        .bind(task.id)
        .bind(task.client_id)
        .bind(task.assignee_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.due_date)
        .bind(task.modified_at)
        .bind(task.modified_by)
        .bind(task.removed_at)
        .bind(task.removed_by)
        .bind(expected.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("updating task", e))?;

        if let Some(row) = row {
            return Ok(row.into());
        }

        // Missing, or moved on since it was read
        let current: Option<String> = sqlx::query_scalar("SELECT status FROM tasks WHERE id = $1")
            .bind(task.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("reading task status", e))?;

        match current {
            None => Err(DomainError::TaskNotFound(task.id)),
            Some(current) => Err(DomainError::InvalidStatusTransition {
                entity: "task",
                from: TaskStatus::from_str(&current).unwrap_or(expected).as_str(),
                to: task.status.as_str(),
            }),
        }
    }
}
