//! The authenticated principal performing an operation

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
    /// Home branch; required for branch-scoped roles.
    pub branch_id: Option<Uuid>,
    /// Linked employee record, if the user is also an employee.
    pub employee_id: Option<Uuid>,
}

impl Actor {
    pub fn new(user_id: Uuid, role: Role, branch_id: Option<Uuid>, employee_id: Option<Uuid>) -> Self {
        Self { user_id, role, branch_id, employee_id }
    }

    pub fn global(role: Role) -> Self {
        Self::new(Uuid::new_v4(), role, None, None)
    }

    pub fn is_self(&self, employee_id: &Uuid) -> bool {
        self.employee_id.as_ref() == Some(employee_id)
    }
}
