// ============================================================================
// Back-office Security - Permission Matrix
// File: crates/bo-security/src/permission.rs
// Description: Role → resource permission flags
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Data areas guarded by the permission matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Branch,
    Employee,
    Client,
    Task,
    Invoice,
    Attendance,
    Leave,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Branch => "branch",
            Resource::Employee => "employee",
            Resource::Client => "client",
            Resource::Task => "task",
            Resource::Invoice => "invoice",
            Resource::Attendance => "attendance",
            Resource::Leave => "leave",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Add,
    Edit,
    Delete,
    Approve,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Add => "add",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Approve => "approve",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission flags for one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Permissions {
    pub is_view: bool,
    pub is_add: bool,
    pub is_edit: bool,
    pub is_delete: bool,
    pub is_approve: bool,
}

impl Permissions {
    pub fn full_access() -> Self {
        Self {
            is_view: true,
            is_add: true,
            is_edit: true,
            is_delete: true,
            is_approve: true,
        }
    }

    pub fn read_only() -> Self {
        Self {
            is_view: true,
            ..Self::default()
        }
    }

    pub fn no_access() -> Self {
        Self::default()
    }

    /// View, add and edit; no delete or approve.
    pub fn contributor() -> Self {
        Self {
            is_view: true,
            is_add: true,
            is_edit: true,
            ..Self::default()
        }
    }

    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::View => self.is_view,
            Action::Add => self.is_add,
            Action::Edit => self.is_edit,
            Action::Delete => self.is_delete,
            Action::Approve => self.is_approve,
        }
    }

    pub fn has_any_permission(&self) -> bool {
        self.is_view || self.is_add || self.is_edit || self.is_delete || self.is_approve
    }
}

/// The role → permission matrix.
pub fn permissions_for(role: Role, resource: Resource) -> Permissions {
    use Resource::*;

    match role {
        Role::SuperAdmin => Permissions::full_access(),
        Role::Admin => match resource {
            Branch => Permissions::contributor(),
            _ => Permissions::full_access(),
        },
        Role::BranchManager => match resource {
            Branch => Permissions::read_only(),
            Employee => Permissions::contributor(),
            Client | Task => Permissions::full_access(),
            Invoice => Permissions {
                is_approve: true,
                ..Permissions::contributor()
            },
            Attendance | Leave => Permissions {
                is_view: true,
                is_edit: true,
                is_approve: true,
                ..Permissions::default()
            },
        },
        Role::HrOfficer => match resource {
            Branch => Permissions::read_only(),
            Employee | Attendance | Leave => Permissions::full_access(),
            Task => Permissions::read_only(),
            Client | Invoice => Permissions::no_access(),
        },
        Role::Accountant => match resource {
            Branch => Permissions::read_only(),
            Invoice => Permissions::full_access(),
            Client => Permissions::contributor(),
            Employee | Task | Attendance | Leave => Permissions::no_access(),
        },
        Role::Staff => match resource {
            Branch => Permissions::read_only(),
            Task => Permissions {
                is_view: true,
                is_edit: true,
                ..Permissions::default()
            },
            Attendance => Permissions {
                is_view: true,
                is_add: true,
                is_edit: true,
                ..Permissions::default()
            },
            Leave => Permissions::contributor(),
            Employee | Client | Invoice => Permissions::no_access(),
        },
    }
}
