//! Back-office roles

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    BranchManager,
    HrOfficer,
    Accountant,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::BranchManager => "branch_manager",
            Role::HrOfficer => "hr_officer",
            Role::Accountant => "accountant",
            Role::Staff => "staff",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "super_admin" => Some(Role::SuperAdmin),
            "admin" => Some(Role::Admin),
            "branch_manager" => Some(Role::BranchManager),
            "hr_officer" => Some(Role::HrOfficer),
            "accountant" => Some(Role::Accountant),
            "staff" => Some(Role::Staff),
            _ => None,
        }
    }

    /// Global roles act across every branch.
    pub fn is_global(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }

    /// Self-service roles may only act on their own employee record.
    pub fn is_self_service(&self) -> bool {
        matches!(self, Role::Staff)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Staff
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for role in [
            Role::SuperAdmin,
            Role::Admin,
            Role::BranchManager,
            Role::HrOfficer,
            Role::Accountant,
            Role::Staff,
        ] {
            assert_eq!(Role::from_str(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_str("owner"), None);
    }

    #[test]
    fn test_serde_name_matches_as_str() {
        let json = serde_json::to_string(&Role::BranchManager).unwrap();
        assert_eq!(json, "\"branch_manager\"");
    }
}
