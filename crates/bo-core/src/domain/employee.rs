// ============================================================================
// Back-office Core - Employee Entity
// File: crates/bo-core/src/domain/employee.rs
// Description: HR record owning an `EMP-<branch>-###` code
// ============================================================================

use bo_security::Role;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Employment status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    Active,
    OnLeave,
    Terminated,
}

impl EmploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentStatus::Active => "active",
            EmploymentStatus::OnLeave => "on_leave",
            EmploymentStatus::Terminated => "terminated",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(EmploymentStatus::Active),
            "on_leave" => Some(EmploymentStatus::OnLeave),
            "terminated" => Some(EmploymentStatus::Terminated),
            _ => None,
        }
    }
}

impl Default for EmploymentStatus {
    fn default() -> Self {
        EmploymentStatus::Active
    }
}

/// Employee entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    /// Allocated once at creation; stays with the employee for life.
    pub code: String,
    pub branch_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub role: Role,
    pub hired_on: NaiveDate,
    pub status: EmploymentStatus,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

/// Employee creation input
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewEmployee {
    #[validate(length(min = 2, max = 150, message = "Full name must be between 2 and 150 characters"))]
    pub full_name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(max = 30, message = "Phone number too long"))]
    pub phone: Option<String>,

    #[validate(length(max = 100, message = "Position too long"))]
    pub position: Option<String>,

    #[serde(default)]
    pub role: Role,

    /// Defaults to today when omitted.
    pub hired_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEmployee {
    #[validate(length(min = 2, max = 150, message = "Full name must be between 2 and 150 characters"))]
    pub full_name: Option<String>,

    #[validate(length(max = 30, message = "Phone number too long"))]
    pub phone: Option<String>,

    #[validate(length(max = 100, message = "Position too long"))]
    pub position: Option<String>,

    pub role: Option<Role>,
    pub status: Option<EmploymentStatus>,
}

impl Employee {
    pub fn new(code: String, branch_id: Uuid, input: NewEmployee, created_by: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code,
            branch_id,
            full_name: input.full_name.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            phone: input.phone.map(|p| p.trim().to_string()),
            position: input.position.map(|p| p.trim().to_string()),
            role: input.role,
            hired_on: input.hired_on.unwrap_or_else(|| now.date_naive()),
            status: EmploymentStatus::Active,
            created_at: now,
            created_by,
            modified_at: None,
            modified_by: None,
            removed_at: None,
            removed_by: None,
        }
    }

    pub fn apply(&mut self, update: UpdateEmployee, modified_by: Uuid) {
        if let Some(full_name) = update.full_name {
            self.full_name = full_name.trim().to_string();
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone.trim().to_string());
        }
        if let Some(position) = update.position {
            self.position = Some(position.trim().to_string());
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        self.modified_at = Some(Utc::now());
        self.modified_by = Some(modified_by);
    }

    pub fn terminate(&mut self, terminated_by: Uuid) {
        let now = Utc::now();
        self.status = EmploymentStatus::Terminated;
        self.removed_at = Some(now);
        self.removed_by = Some(terminated_by);
        self.modified_at = Some(now);
        self.modified_by = Some(terminated_by);
    }

    pub fn is_active(&self) -> bool {
        self.status != EmploymentStatus::Terminated && self.removed_at.is_none()
    }
}
