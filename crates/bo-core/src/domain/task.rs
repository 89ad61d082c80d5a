// ============================================================================
// Back-office Core - Task Entity
// File: crates/bo-core/src/domain/task.rs
// Description: Branch work items and their status workflow
// ============================================================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::DomainError;

/// Task status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    InProgress,
    Done,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "open" => Some(TaskStatus::Open),
            "in_progress" => Some(TaskStatus::InProgress),
            "done" => Some(TaskStatus::Done),
            "cancelled" => Some(TaskStatus::Cancelled),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Open, InProgress) | (InProgress, Done) | (InProgress, Open) | (Open, Cancelled) | (InProgress, Cancelled)
        )
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Open
    }
}

/// Task entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub client_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewTask {
    #[validate(length(min = 3, max = 200, message = "Title must be between 3 and 200 characters"))]
    pub title: String,

    #[validate(length(max = 2000, message = "Description too long"))]
    pub description: Option<String>,

    pub client_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
}

impl Task {
    pub fn new(branch_id: Uuid, input: NewTask, created_by: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            branch_id,
            client_id: input.client_id,
            assignee_id: input.assignee_id,
            title: input.title.trim().to_string(),
            description: input.description.map(|d| d.trim().to_string()),
            status: TaskStatus::Open,
            due_date: input.due_date,
            created_at: Utc::now(),
            created_by,
            modified_at: None,
            modified_by: None,
            removed_at: None,
            removed_by: None,
        }
    }

    pub fn transition(&mut self, next: TaskStatus, modified_by: Uuid) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidStatusTransition {
                entity: "task",
                from: self.status.as_str(),
                to: next.as_str(),
            });
        }
        self.status = next;
        self.touch(modified_by);
        Ok(())
    }

    pub fn assign(&mut self, assignee_id: Uuid, modified_by: Uuid) -> Result<(), DomainError> {
        if self.is_closed() {
            return Err(DomainError::ValidationError(format!(
                "Task is {} and cannot be reassigned",
                self.status.as_str()
            )));
        }
        self.assignee_id = Some(assignee_id);
        self.touch(modified_by);
        Ok(())
    }

    pub fn is_assigned_to(&self, employee_id: &Uuid) -> bool {
        self.assignee_id.as_ref() == Some(employee_id)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.status, TaskStatus::Done | TaskStatus::Cancelled)
    }

    fn touch(&mut self, modified_by: Uuid) {
        self.modified_at = Some(Utc::now());
        self.modified_by = Some(modified_by);
    }
}
