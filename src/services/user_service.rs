use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{hash_password, verify_password};
use crate::database::models::User;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::policy;
use crate::state::AppState;
use crate::validation;

const USER_NOT_FOUND: &str = "User not found";
const USER_EXISTS: &str = "User already exists";

fn map_conflict(err: DatabaseError) -> ApiError {
    match err {
        DatabaseError::Conflict(_) => ApiError::bad_request(USER_EXISTS),
        other => other.into(),
    }
}

async fn load(state: &AppState, id: Uuid) -> Result<User, ApiError> {
    state
        .store
        .find_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))
}

pub async fn list(state: &AppState, caller: &User) -> Result<Vec<User>, ApiError> {
    policy::admin_only(caller)?;
    Ok(state.store.list_users().await?)
}

pub async fn get(state: &AppState, caller: &User, id: Uuid) -> Result<User, ApiError> {
    let user = load(state, id).await?;
    policy::admin_or_self(caller, id)?;
    Ok(user)
}

pub async fn create(state: &AppState, caller: &User, body: &Value) -> Result<User, ApiError> {
    policy::admin_only(caller)?;
    let draft = validation::user::new_user(body)?;

    if state.store.find_user_by_email(&draft.email).await?.is_some() {
        return Err(ApiError::bad_request(USER_EXISTS));
    }

    let hash = hash_password(&draft.password, state.config.security.bcrypt_cost).await?;
    let user = User::new(draft.name, draft.email, hash, draft.role);
    state.store.insert_user(&user).await.map_err(map_conflict)?;

    info!("User {} created by {} with role {}", user.id, caller.id, user.role);
    Ok(user)
}

/// Name and email for admin or self; role for admins only.
pub async fn update(state: &AppState, caller: &User, id: Uuid, body: &Value) -> Result<User, ApiError> {
    let mut user = load(state, id).await?;
    policy::admin_or_self(caller, id)?;
    let update = validation::user::user_update(body)?;
    policy::role_change(caller, &user, update.role)?;

    user.name = update.name;
    user.email = update.email;
    if let (true, Some(role)) = (caller.is_admin(), update.role) {
        user.role = role;
    }
    user.updated_at = Utc::now();
    state.store.update_user(&user).await.map_err(map_conflict)?;
    Ok(user)
}

/// Non-admins must prove the current password first.
pub async fn change_password(state: &AppState, caller: &User, id: Uuid, body: &Value) -> Result<(), ApiError> {
    let mut user = load(state, id).await?;
    policy::admin_or_self(caller, id)?;
    let change = validation::user::password_change(body)?;

    if !caller.is_admin() {
        let current = change.current_password.as_deref().unwrap_or_default();
        if !verify_password(current, &user.password).await? {
            warn!("Password change for {} rejected: current password mismatch", user.id);
            return Err(ApiError::bad_request("Current password is incorrect"));
        }
    }

    let hash = hash_password(&change.new_password, state.config.security.bcrypt_cost).await?;
    user.set_password_hash(hash, Utc::now());
    state.store.update_user(&user).await?;

    info!("Password changed for user {}", user.id);
    Ok(())
}

pub async fn delete(state: &AppState, caller: &User, id: Uuid) -> Result<(), ApiError> {
    policy::user_delete(caller, id)?;
    load(state, id).await?;
    if !state.store.delete_user(id).await? {
        return Err(ApiError::not_found(USER_NOT_FOUND));
    }
    info!("User {} removed by {}", id, caller.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::types::Role;
    use serde_json::json;

    async fn seeded() -> (AppState, User, User) {
        let state = AppState::in_memory(AppConfig::for_tests()).unwrap();
        let admin_hash = hash_password("admin-pass", 4).await.unwrap();
        let admin = User::new("Root".into(), "root@example.com".into(), admin_hash, Role::Admin);
        let dev_hash = hash_password("dev-password", 4).await.unwrap();
        let dev = User::new("Dev".into(), "dev@example.com".into(), dev_hash, Role::Developer);
        state.store.insert_user(&admin).await.unwrap();
        state.store.insert_user(&dev).await.unwrap();
        (state, admin, dev)
    }

    fn status(err: ApiError) -> u16 {
        err.status_code().as_u16()
    }

    #[tokio::test]
    async fn admin_creates_users_and_duplicates_are_refused() {
        let (state, admin, dev) = seeded().await;
        let body = json!({ "name": "Mia", "email": "mia@example.com", "password": "password123", "role": "manager" });

        let created = create(&state, &admin, &body).await.unwrap();
        assert_eq!(created.role, Role::Manager);
        assert_ne!(created.password, "password123");

        assert_eq!(status(create(&state, &admin, &body).await.unwrap_err()), 400);
        assert_eq!(status(create(&state, &dev, &body).await.unwrap_err()), 403);
    }

    #[tokio::test]
    async fn self_deletion_leaves_the_record() {
        let (state, admin, _) = seeded().await;
        assert_eq!(status(delete(&state, &admin, admin.id).await.unwrap_err()), 400);
        assert!(state.store.find_user(admin.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn non_admin_needs_current_password() {
        let (state, _, dev) = seeded().await;
        let wrong = json!({ "currentPassword": "nope", "newPassword": "brand-new-pass" });
        let err = change_password(&state, &dev, dev.id, &wrong).await.unwrap_err();
        assert_eq!(err.to_string(), "Current password is incorrect");

        let right = json!({ "currentPassword": "dev-password", "newPassword": "brand-new-pass" });
        change_password(&state, &dev, dev.id, &right).await.unwrap();
        let stored = state.store.find_user(dev.id).await.unwrap().unwrap();
        assert!(stored.password_changed_at.is_some());
        assert!(verify_password("brand-new-pass", &stored.password).await.unwrap());
    }

    #[tokio::test]
    async fn current_password_keeps_surrounding_spaces() {
        let (state, _, _) = seeded().await;
        let hash = hash_password("  padded pw  ", 4).await.unwrap();
        let dev = User::new("Pad".into(), "pad@example.com".into(), hash, Role::Developer);
        state.store.insert_user(&dev).await.unwrap();

        let trimmed = json!({ "currentPassword": "padded pw", "newPassword": "brand-new-pass" });
        let err = change_password(&state, &dev, dev.id, &trimmed).await.unwrap_err();
        assert_eq!(err.to_string(), "Current password is incorrect");

        let exact = json!({ "currentPassword": "  padded pw  ", "newPassword": "brand-new-pass" });
        change_password(&state, &dev, dev.id, &exact).await.unwrap();
        let stored = state.store.find_user(dev.id).await.unwrap().unwrap();
        assert!(verify_password("brand-new-pass", &stored.password).await.unwrap());
    }

    #[tokio::test]
    async fn role_is_kept_when_a_user_edits_themselves() {
        let (state, admin, dev) = seeded().await;
        let escalate = json!({ "name": "Dev", "email": "dev@example.com", "role": "admin" });
        assert_eq!(status(update(&state, &dev, dev.id, &escalate).await.unwrap_err()), 403);

        let promoted = update(&state, &admin, dev.id, &json!({ "name": "Dev", "email": "dev@example.com", "role": "manager" }))
            .await
            .unwrap();
        assert_eq!(promoted.role, Role::Manager);
    }

    #[tokio::test]
    async fn strangers_cannot_read_each_other() {
        let (state, admin, dev) = seeded().await;
        assert_eq!(status(get(&state, &dev, admin.id).await.unwrap_err()), 403);
        assert_eq!(get(&state, &admin, dev.id).await.unwrap().id, dev.id);
        assert_eq!(status(get(&state, &admin, Uuid::new_v4()).await.unwrap_err()), 404);
    }
}
