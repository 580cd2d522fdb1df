use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::types::Role;

/// Stored user record. `password` holds the bcrypt hash and is never serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub password_changed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password: password_hash,
            role,
            password_changed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Replace the stored hash and record when it happened.
    pub fn set_password_hash(&mut self, hash: String, now: DateTime<Utc>) {
        self.password = hash;
        self.password_changed_at = Some(now);
        self.updated_at = now;
    }

    /// True when the password changed after a token issued at `iat` (unix seconds).
    pub fn changed_password_after(&self, iat: i64) -> bool {
        match self.password_changed_at {
            Some(changed_at) => iat < changed_at.timestamp(),
            None => false,
        }
    }
}

/// Public subset of a user embedded in project and budget responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserSummary {
    pub fn with_email(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: Some(user.email.clone()),
        }
    }

    pub fn name_only(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user() -> User {
        User::new("Ada".into(), "ada@example.com".into(), "$2b$hash".into(), Role::Developer)
    }

    #[test]
    fn password_is_never_serialized() {
        let value = serde_json::to_value(user()).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["email"], "ada@example.com");
        assert_eq!(value["role"], "developer");
        assert!(value.get("passwordChangedAt").is_some());
    }

    #[test]
    fn tokens_before_password_change_are_stale() {
        let mut u = user();
        let issued = Utc::now() - Duration::seconds(30);
        assert!(!u.changed_password_after(issued.timestamp()));

        u.set_password_hash("$2b$other".into(), Utc::now());
        assert!(u.changed_password_after(issued.timestamp()));
        assert!(!u.changed_password_after((Utc::now() + Duration::seconds(5)).timestamp()));
    }
}
