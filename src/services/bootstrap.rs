use serde_json::json;
use tracing::info;

use crate::auth::hash_password;
use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;
use crate::types::Role;
use crate::validation;

/// Result of an admin seeding attempt.
#[derive(Debug, Clone)]
pub enum Seeded {
    Created(User),
    AlreadyPresent,
}

/// Create an admin account unless the email is already registered.
/// Inputs go through the same checks as the user registration endpoint.
pub async fn create_admin(state: &AppState, name: &str, email: &str, password: &str) -> Result<Seeded, ApiError> {
    let body = json!({ "name": name, "email": email, "password": password, "role": Role::Admin.as_str() });
    let draft = validation::user::new_user(&body)?;

    if state.store.find_user_by_email(&draft.email).await?.is_some() {
        return Ok(Seeded::AlreadyPresent);
    }

    let hash = hash_password(&draft.password, state.config.security.bcrypt_cost).await?;
    let admin = User::new(draft.name, draft.email, hash, Role::Admin);
    state.store.insert_user(&admin).await?;
    info!("Bootstrap admin {} created", admin.id);
    Ok(Seeded::Created(admin))
}

const DEFAULT_ADMIN_NAME: &str = "Administrator";

/// Seed the admin named by the `BOOTSTRAP_ADMIN_*` settings when email and
/// password are both set.
pub async fn seed_from_config(state: &AppState) -> Result<Option<Seeded>, ApiError> {
    let bootstrap = &state.config.bootstrap;
    let (Some(email), Some(password)) = (bootstrap.admin_email.as_deref(), bootstrap.admin_password.as_deref()) else {
        return Ok(None);
    };
    let name = bootstrap.admin_name.as_deref().unwrap_or(DEFAULT_ADMIN_NAME);
    create_admin(state, name, email, password).await.map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let mut config = AppConfig::for_tests();
        config.bootstrap.admin_name = Some("Root".into());
        config.bootstrap.admin_email = Some("root@example.com".into());
        config.bootstrap.admin_password = Some("super-secret".into());
        let state = AppState::in_memory(config).unwrap();

        let first = seed_from_config(&state).await.unwrap();
        assert!(matches!(first, Some(Seeded::Created(ref u)) if u.role == Role::Admin));
        assert!(matches!(seed_from_config(&state).await.unwrap(), Some(Seeded::AlreadyPresent)));
    }

    #[tokio::test]
    async fn nothing_to_seed_without_settings() {
        let state = AppState::in_memory(AppConfig::for_tests()).unwrap();
        assert!(seed_from_config(&state).await.unwrap().is_none());
        assert!(state.store.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn short_passwords_are_refused() {
        let state = AppState::in_memory(AppConfig::for_tests()).unwrap();
        let err = create_admin(&state, "Root", "root@example.com", "short").await.unwrap_err();
        assert_eq!(err.status_code().as_u16(), 400);
    }
}
