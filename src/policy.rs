//! Authorization rules. Each check is a pure function of the caller and the
//! target record, evaluated before any write.

use uuid::Uuid;

use crate::database::models::{Project, User};
use crate::error::ApiError;
use crate::types::Role;

pub type Decision = Result<(), ApiError>;

fn deny(message: &str) -> Decision {
    Err(ApiError::forbidden(message))
}

fn is_self(caller: &User, target: Uuid) -> bool {
    caller.id == target
}

pub fn admin_only(caller: &User) -> Decision {
    if caller.is_admin() {
        Ok(())
    } else {
        deny("Not authorized")
    }
}

/// Read, profile update and password change.
pub fn admin_or_self(caller: &User, target: Uuid) -> Decision {
    if caller.is_admin() || is_self(caller, target) {
        Ok(())
    } else {
        deny("Not authorized")
    }
}

/// Only admins change roles; resending the current role is not a change.
pub fn role_change(caller: &User, target: &User, requested: Option<Role>) -> Decision {
    match requested {
        Some(role) if role != target.role && !caller.is_admin() => deny("Not authorized to change roles"),
        _ => Ok(()),
    }
}

/// Admin only; nobody deletes themselves.
pub fn user_delete(caller: &User, target: Uuid) -> Decision {
    admin_only(caller)?;
    if is_self(caller, target) {
        return Err(ApiError::bad_request("Cannot delete yourself"));
    }
    Ok(())
}

pub fn project_create(caller: &User) -> Decision {
    if caller.role == Role::Manager {
        Ok(())
    } else {
        deny("Only managers can create projects")
    }
}

pub fn project_read(caller: &User, project: &Project) -> Decision {
    if project.has_member(caller.id) {
        Ok(())
    } else {
        deny("Not authorized to access this project")
    }
}

pub fn project_update(caller: &User, project: &Project) -> Decision {
    if project.is_manager(caller.id) {
        Ok(())
    } else {
        deny("Only project manager can update project")
    }
}

pub fn project_delete(caller: &User, project: &Project) -> Decision {
    if project.is_manager(caller.id) {
        Ok(())
    } else {
        deny("Only project manager can delete project")
    }
}

/// Budget access that follows project membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetAction {
    Read,
    Create,
    Update,
    Delete,
}

/// `project` is `None` when the parent project no longer resolves; that is
/// treated as no access.
pub fn budget_access(caller: &User, project: Option<&Project>, action: BudgetAction) -> Decision {
    let allowed = match (project, action) {
        (Some(p), BudgetAction::Delete) => p.is_manager(caller.id),
        (Some(p), _) => p.has_member(caller.id),
        (None, _) => false,
    };
    if allowed {
        return Ok(());
    }
    deny(match action {
        BudgetAction::Read => "Not authorized to access this project",
        BudgetAction::Create => "Not authorized to add budgets to this project",
        BudgetAction::Update => "Not authorized to update this budget",
        BudgetAction::Delete => "Not authorized to delete this budget",
    })
}
