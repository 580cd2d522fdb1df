mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::TestServer;
use project_budget_api::types::Role;

#[tokio::test]
async fn admin_manages_users() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, admin) = server.user_with_token("Root", "root@example.com", Role::Admin).await?;

    let new_user = json!({ "name": "Mia", "email": "mia@example.com", "password": "password123", "role": "manager" });
    let (status, created) = server.post("/api/users", &admin, new_user.clone()).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["role"], "manager");
    assert!(created.get("password").is_none());

    let (status, body) = server.post("/api/users", &admin, new_user).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "User already exists");

    let (status, list) = server.get("/api/users", &admin).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(2));

    let id = created["id"].as_str().unwrap();
    let (status, updated) = server
        .put(
            &format!("/api/users/{}", id),
            &admin,
            json!({ "name": "Mia R", "email": "mia@example.com", "role": "developer" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Mia R");
    assert_eq!(updated["role"], "developer");

    let (status, body) = server.delete(&format!("/api/users/{}", id), &admin).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "User removed");
    Ok(())
}

#[tokio::test]
async fn non_admins_are_limited_to_themselves() -> Result<()> {
    let server = TestServer::start().await?;
    let (admin, _) = server.user_with_token("Root", "root@example.com", Role::Admin).await?;
    let (dev, token) = server.user_with_token("Dev", "dev@example.com", Role::Developer).await?;

    let (status, body) = server.get("/api/users", &token).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "msg": "Not authorized" }));

    let (status, _) = server.get(&format!("/api/users/{}", admin.id), &token).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, me) = server.get(&format!("/api/users/{}", dev.id), &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "dev@example.com");

    let (status, body) = server
        .put(
            &format!("/api/users/{}", dev.id),
            &token,
            json!({ "name": "Dev", "email": "dev@example.com", "role": "admin" }),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["msg"], "Not authorized to change roles");

    let (status, _) = server.delete(&format!("/api/users/{}", admin.id), &token).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn admin_cannot_delete_themselves() -> Result<()> {
    let server = TestServer::start().await?;
    let (admin, token) = server.user_with_token("Root", "root@example.com", Role::Admin).await?;

    let (status, body) = server.delete(&format!("/api/users/{}", admin.id), &token).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "Cannot delete yourself");

    let (status, _) = server.get(&format!("/api/users/{}", admin.id), &token).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn unknown_users_are_404() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, token) = server.user_with_token("Root", "root@example.com", Role::Admin).await?;

    for id in ["not-a-uuid", "6f1c2a4e-9a57-4f53-9d2b-1f1f1f1f1f1f"] {
        let (status, body) = server.get(&format!("/api/users/{}", id), &token).await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["msg"], "User not found");
    }
    Ok(())
}

#[tokio::test]
async fn password_change_checks_current_password() -> Result<()> {
    let server = TestServer::start().await?;
    let (dev, token) = server.user_with_token("Dev", "dev@example.com", Role::Developer).await?;
    let path = format!("/api/users/{}/password", dev.id);

    let (status, body) = server
        .put(&path, &token, json!({ "currentPassword": "wrong", "newPassword": "another-password" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "Current password is incorrect");

    let (status, body) = server
        .put(&path, &token, json!({ "currentPassword": "password123", "newPassword": "short" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["message"], "Please enter a password with 8 or more characters");
    Ok(())
}
