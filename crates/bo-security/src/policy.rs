//! Access policy: matrix check plus branch and ownership scoping

use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::actor::Actor;
use crate::permission::{permissions_for, Action, Resource};
use crate::role::Role;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("Role {role} may not {action} {resource}")]
    Denied { role: Role, resource: Resource, action: Action },

    #[error("Resource belongs to another branch")]
    OutsideBranch,

    #[error("Role {0} may only act on its own records")]
    NotOwner(Role),

    #[error("Approvers may not decide their own requests")]
    SelfApproval,
}

pub struct AccessPolicy;

impl AccessPolicy {
    /// Checks the permission matrix, then branch scoping for branch-scoped roles.
    pub fn authorize(
        actor: &Actor,
        resource: Resource,
        action: Action,
        target_branch: Option<&Uuid>,
    ) -> Result<(), AccessError> {
        if !permissions_for(actor.role, resource).allows(action) {
            warn!(
                user_id = %actor.user_id,
                role = %actor.role,
                %resource,
                %action,
                "Access denied by permission matrix"
            );
            return Err(AccessError::Denied { role: actor.role, resource, action });
        }

        if actor.role.is_global() {
            return Ok(());
        }

        match (actor.branch_id.as_ref(), target_branch) {
            (Some(home), Some(target)) if home == target => Ok(()),
            (Some(_), None) => Ok(()),
            _ => {
                warn!(
                    user_id = %actor.user_id,
                    role = %actor.role,
                    %resource,
                    "Access denied outside home branch"
                );
                Err(AccessError::OutsideBranch)
            }
        }
    }

    /// As [`AccessPolicy::authorize`]; self-service roles must also own `subject`.
    pub fn authorize_self_service(
        actor: &Actor,
        resource: Resource,
        action: Action,
        target_branch: Option<&Uuid>,
        subject: &Uuid,
    ) -> Result<(), AccessError> {
        Self::authorize(actor, resource, action, target_branch)?;

        if actor.role.is_self_service() && !actor.is_self(subject) {
            warn!(user_id = %actor.user_id, %resource, "Self-service actor targeted another employee");
            return Err(AccessError::NotOwner(actor.role));
        }
        Ok(())
    }

    /// Approve permission for the branch, and never on the actor's own request.
    pub fn authorize_decision(
        actor: &Actor,
        resource: Resource,
        target_branch: Option<&Uuid>,
        subject: &Uuid,
    ) -> Result<(), AccessError> {
        Self::authorize(actor, resource, Action::Approve, target_branch)?;

        if actor.is_self(subject) {
            warn!(user_id = %actor.user_id, %resource, "Approver attempted to decide own request");
            return Err(AccessError::SelfApproval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branch_actor(role: Role, branch: Uuid) -> Actor {
        Actor::new(Uuid::new_v4(), role, Some(branch), Some(Uuid::new_v4()))
    }

    #[test]
    fn test_global_role_crosses_branches() {
        let actor = Actor::global(Role::Admin);
        let branch = Uuid::new_v4();
        assert!(AccessPolicy::authorize(&actor, Resource::Invoice, Action::Add, Some(&branch)).is_ok());
    }

    #[test]
    fn test_branch_scoped_role_stays_home() {
        let home = Uuid::new_v4();
        let actor = branch_actor(Role::BranchManager, home);

        assert!(AccessPolicy::authorize(&actor, Resource::Client, Action::Add, Some(&home)).is_ok());
        assert_eq!(
            AccessPolicy::authorize(&actor, Resource::Client, Action::Add, Some(&Uuid::new_v4())),
            Err(AccessError::OutsideBranch)
        );
    }

    #[test]
    fn test_branch_scoped_role_without_branch_is_rejected() {
        let actor = Actor::new(Uuid::new_v4(), Role::HrOfficer, None, None);
        let branch = Uuid::new_v4();
        assert_eq!(
            AccessPolicy::authorize(&actor, Resource::Employee, Action::Add, Some(&branch)),
            Err(AccessError::OutsideBranch)
        );
    }

    #[test]
    fn test_matrix_denial() {
        let home = Uuid::new_v4();
        let actor = branch_actor(Role::Accountant, home);
        assert!(matches!(
            AccessPolicy::authorize(&actor, Resource::Leave, Action::Approve, Some(&home)),
            Err(AccessError::Denied { role: Role::Accountant, .. })
        ));
    }

    #[test]
    fn test_staff_self_service() {
        let home = Uuid::new_v4();
        let actor = branch_actor(Role::Staff, home);
        let me = actor.employee_id.unwrap();

        assert!(AccessPolicy::authorize_self_service(&actor, Resource::Leave, Action::Add, Some(&home), &me).is_ok());
        assert_eq!(
            AccessPolicy::authorize_self_service(&actor, Resource::Leave, Action::Add, Some(&home), &Uuid::new_v4()),
            Err(AccessError::NotOwner(Role::Staff))
        );
    }

    #[test]
    fn test_no_self_approval() {
        let home = Uuid::new_v4();
        let actor = branch_actor(Role::HrOfficer, home);
        let me = actor.employee_id.unwrap();

        assert_eq!(
            AccessPolicy::authorize_decision(&actor, Resource::Leave, Some(&home), &me),
            Err(AccessError::SelfApproval)
        );
        assert!(AccessPolicy::authorize_decision(&actor, Resource::Leave, Some(&home), &Uuid::new_v4()).is_ok());
    }

    #[test]
    fn test_hr_officer_acts_for_others() {
        let home = Uuid::new_v4();
        let actor = branch_actor(Role::HrOfficer, home);
        assert!(AccessPolicy::authorize_self_service(
            &actor,
            Resource::Leave,
            Action::Add,
            Some(&home),
            &Uuid::new_v4()
        )
        .is_ok());
    }
}
