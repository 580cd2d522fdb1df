use serde_json::Value;

use super::{Checker, Need, ValidationErrors};
use crate::auth::password::MIN_PASSWORD_LENGTH;
use crate::types::Role;

const EMAIL_MESSAGE: &str = "Please include a valid email";
const PASSWORD_MESSAGE: &str = "Please enter a password with 8 or more characters";

#[derive(Debug, Clone, PartialEq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Profile update. `role` is only honored for admins.
#[derive(Debug, Clone, PartialEq)]
pub struct UserUpdate {
    pub name: String,
    pub email: String,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PasswordChange {
    pub current_password: Option<String>,
    pub new_password: String,
}

/// Raw password; only the length is checked, whitespace is significant.
fn password(c: &mut Checker<'_>, path: &str, need: Need) -> Option<String> {
    let raw = match c.lookup(path) {
        Some(value) => value.as_str().map(str::to_string),
        None if need == Need::Optional => return None,
        None => None,
    };
    match raw {
        Some(p) if p.chars().count() >= MIN_PASSWORD_LENGTH => Some(p),
        _ => {
            c.fail(path, PASSWORD_MESSAGE);
            None
        }
    }
}

pub fn login(body: &Value) -> Result<LoginRequest, ValidationErrors> {
    let mut c = Checker::new(body);
    let email = c.email("email", Need::Required, EMAIL_MESSAGE);
    let password = c
        .lookup("password")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
        .map(str::to_string);
    if password.is_none() {
        c.fail("password", "Password is required");
    }

    match (email, password) {
        (Some(email), Some(password)) => c.finish(LoginRequest { email, password }),
        _ => Err(c.reject()),
    }
}

pub fn new_user(body: &Value) -> Result<NewUser, ValidationErrors> {
    let mut c = Checker::new(body);
    let name = c.text("name", Need::Required, "Name is required");
    let email = c.email("email", Need::Required, EMAIL_MESSAGE);
    let password = password(&mut c, "password", Need::Required);
    let role = c.choice::<Role>("role", Need::Required, "Role is required");

    match (name, email, password, role) {
        (Some(name), Some(email), Some(password), Some(role)) => c.finish(NewUser {
            name,
            email,
            password,
            role,
        }),
        _ => Err(c.reject()),
    }
}

pub fn user_update(body: &Value) -> Result<UserUpdate, ValidationErrors> {
    let mut c = Checker::new(body);
    let name = c.text("name", Need::Required, "Name is required");
    let email = c.email("email", Need::Required, EMAIL_MESSAGE);
    let role = c.choice::<Role>("role", Need::Optional, "Role is required");

    match (name, email) {
        (Some(name), Some(email)) => c.finish(UserUpdate { name, email, role }),
        _ => Err(c.reject()),
    }
}

pub fn password_change(body: &Value) -> Result<PasswordChange, ValidationErrors> {
    let mut c = Checker::new(body);
    let current_password = c.lookup("currentPassword").and_then(Value::as_str).map(str::to_string);
    let new_password = password(&mut c, "newPassword", Need::Required);

    match new_password {
        Some(new_password) => c.finish(PasswordChange {
            current_password,
            new_password,
        }),
        None => Err(c.reject()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_user_reports_all_fields() {
        let err = new_user(&json!({ "email": "nope", "password": "short", "role": "owner" })).unwrap_err();
        let fields: Vec<&str> = err.fields().collect();
        assert_eq!(fields, vec!["name", "email", "password", "role"]);
        assert_eq!(err.0[2].message, PASSWORD_MESSAGE);
    }

    #[test]
    fn new_user_accepts_every_role() {
        for role in Role::ALL {
            let body = json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "password123",
                "role": role.as_str(),
            });
            assert_eq!(new_user(&body).unwrap().role, *role);
        }
    }

    #[test]
    fn update_role_is_optional_but_closed() {
        let ok = user_update(&json!({ "name": "Ada", "email": "ada@example.com" })).unwrap();
        assert_eq!(ok.role, None);

        let err = user_update(&json!({ "name": "Ada", "email": "ada@example.com", "role": "root" })).unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["role"]);
    }

    #[test]
    fn login_needs_both_fields() {
        let err = login(&json!({ "email": "ada@example.com" })).unwrap_err();
        assert_eq!(err.0, vec![super::super::FieldError::new("password", "Password is required")]);
    }

    #[test]
    fn password_change_keeps_whitespace() {
        let change = password_change(&json!({ "currentPassword": "  old pass ", "newPassword": "  spaced  " })).unwrap();
        assert_eq!(change.new_password, "  spaced  ");
        assert_eq!(change.current_password.as_deref(), Some("  old pass "));
        assert_eq!(change.current_password, None);
    }
}
