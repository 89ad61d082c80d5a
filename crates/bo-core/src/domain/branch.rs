// ============================================================================
// Back-office Core - Branch Entity
// File: crates/bo-core/src/domain/branch.rs
// Description: Branch office owning a `BR-###` code
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Branch entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub id: Uuid,
    /// Allocated once at creation, never changed or reused.
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

/// Branch creation input
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewBranch {
    #[validate(length(min = 2, max = 100, message = "Branch name must be between 2 and 100 characters"))]
    pub name: String,

    #[validate(length(max = 500, message = "Address too long"))]
    pub address: Option<String>,

    #[validate(length(max = 30, message = "Phone number too long"))]
    pub phone: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
}

/// Partial branch update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBranch {
    #[validate(length(min = 2, max = 100, message = "Branch name must be between 2 and 100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "Address too long"))]
    pub address: Option<String>,

    #[validate(length(max = 30, message = "Phone number too long"))]
    pub phone: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
}

impl Branch {
    pub fn new(code: String, input: NewBranch, created_by: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            code,
            name: input.name.trim().to_string(),
            address: input.address.map(|a| a.trim().to_string()),
            phone: input.phone.map(|p| p.trim().to_string()),
            email: input.email.map(|e| e.trim().to_lowercase()),
            is_active: true,
            created_at: Utc::now(),
            created_by,
            modified_at: None,
            modified_by: None,
            removed_at: None,
            removed_by: None,
        }
    }

    pub fn apply(&mut self, update: UpdateBranch, modified_by: Uuid) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(address) = update.address {
            self.address = Some(address.trim().to_string());
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone.trim().to_string());
        }
        if let Some(email) = update.email {
            self.email = Some(email.trim().to_lowercase());
        }
        self.modified_at = Some(Utc::now());
        self.modified_by = Some(modified_by);
    }

    pub fn soft_delete(&mut self, deleted_by: Uuid) {
        self.removed_at = Some(Utc::now());
        self.removed_by = Some(deleted_by);
        self.is_active = false;
    }

    pub fn is_deleted(&self) -> bool {
        self.removed_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_branch() -> NewBranch {
        NewBranch {
            name: "  Jakarta Selatan ".to_string(),
            address: Some("Jl. Sudirman 1".to_string()),
            phone: None,
            email: Some("JKT@Example.com".to_string()),
        }
    }

    #[test]
    fn test_create_branch_normalises_input() {
        let branch = Branch::new("BR-001".to_string(), new_branch(), None);
        assert_eq!(branch.code, "BR-001");
        assert_eq!(branch.name, "Jakarta Selatan");
        assert_eq!(branch.email.as_deref(), Some("jkt@example.com"));
        assert!(branch.is_active);
    }

    #[test]
    fn test_invalid_branch_input() {
        let mut input = new_branch();
        input.name = "X".to_string();
        input.email = Some("not-an-email".to_string());
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_soft_delete_keeps_code() {
        let mut branch = Branch::new("BR-004".to_string(), new_branch(), None);
        branch.soft_delete(Uuid::new_v4());
        assert!(branch.is_deleted());
        assert!(!branch.is_active);
        assert_eq!(branch.code, "BR-004");
    }
}
