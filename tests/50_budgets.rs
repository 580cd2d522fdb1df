mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use common::{budget_body, project_body, TestServer};
use project_budget_api::types::Role;

struct Setup {
    server: TestServer,
    manager: String,
    member: String,
    outsider: String,
    project: String,
}

async fn setup() -> Result<Setup> {
    let server = TestServer::start().await?;
    let (_, manager) = server.user_with_token("Mia", "mia@example.com", Role::Manager).await?;
    let (dev, member) = server.user_with_token("Dev", "dev@example.com", Role::Developer).await?;
    let (_, outsider) = server.user_with_token("Out", "out@example.com", Role::Developer).await?;

    let mut body = project_body("Alpha", 1000.0);
    body["team"] = json!([{ "user": dev.id.to_string(), "role": "Developer" }]);
    let (status, project) = server.post("/api/projects", &manager, body).await?;
    anyhow::ensure!(status == StatusCode::CREATED, "project setup failed: {}", project);
    let project = project["id"].as_str().unwrap_or_default().to_string();

    Ok(Setup { server, manager, member, outsider, project })
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn member_adds_line_item_with_derived_fields() -> Result<()> {
    let s = setup().await?;
    let (status, budget) = s.server.post("/api/budgets", &s.member, budget_body(&s.project, 100.0, 120.0)).await?;

    assert_eq!(status, StatusCode::CREATED);
    assert!(budget["serviceIcon"].as_str().unwrap_or_default().ends_with("/amazonaws.svg"));
    assert_eq!(budget["serviceColor"], "#FF9900");
    assert_eq!(budget["variance"], 20.0);
    assert_eq!(budget["status"], "Active");
    assert_eq!(budget["period"], json!({ "start": "2024-01-01", "end": "2024-01-31" }));
    assert_eq!(budget["project"]["name"], "Alpha");
    assert_eq!(budget["createdBy"]["name"], "Dev");
    Ok(())
}

#[tokio::test]
async fn listing_needs_project_and_membership() -> Result<()> {
    let s = setup().await?;
    s.server.post("/api/budgets", &s.manager, budget_body(&s.project, 50.0, 40.0)).await?;

    let (status, body) = s.server.get("/api/budgets", &s.manager).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "Project ID is required");

    let path = format!("/api/budgets?project={}", s.project);
    let (status, list) = s.server.get(&path, &s.member).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    assert_eq!(list[0]["variance"], -10.0);

    let (status, body) = s.server.get(&path, &s.outsider).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["msg"], "Not authorized to access this project");

    let (status, _) = s.server.get("/api/budgets?project=not-an-id", &s.manager).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn validation_errors_are_batched() -> Result<()> {
    let s = setup().await?;
    let (status, body) = s
        .server
        .post(
            "/api/budgets",
            &s.manager,
            json!({ "service": "Mainframe", "usage": { "value": -1 }, "project": "nope" }),
        )
        .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let messages: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["message"].as_str())
        .collect();
    assert!(messages.contains(&"Service is required"), "{:?}", messages);
    assert!(messages.contains(&"Valid usage value is required"), "{:?}", messages);
    assert!(messages.contains(&"Valid project ID is required"), "{:?}", messages);
    Ok(())
}

#[tokio::test]
async fn period_end_before_start_cites_period_end() -> Result<()> {
    let s = setup().await?;
    let mut body = budget_body(&s.project, 10.0, 10.0);
    body["period"] = json!({ "start": "2024-02-01", "end": "2024-01-01" });

    let (status, reply) = s.server.post("/api/budgets", &s.manager, body).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(reply["errors"][0]["field"], "period.end");
    Ok(())
}

#[tokio::test]
async fn update_rederives_style_and_keeps_owner() -> Result<()> {
    let s = setup().await?;
    let (_, budget) = s.server.post("/api/budgets", &s.member, budget_body(&s.project, 100.0, 120.0)).await?;
    let path = format!("/api/budgets/{}", id_of(&budget));

    let (status, updated) = s
        .server
        .put(&path, &s.manager, json!({ "service": "Azure", "actualCost": 90, "status": "Archived" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["serviceIcon"].as_str().unwrap_or_default().ends_with("/microsoftazure.svg"));
    assert_eq!(updated["serviceColor"], "#0078D4");
    assert_eq!(updated["variance"], -10.0);
    assert_eq!(updated["status"], "Archived");
    assert_eq!(updated["createdBy"]["name"], "Dev");

    let (status, _) = s.server.put(&path, &s.manager, json!({ "status": "Pending Review" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = s.server.put(&path, &s.outsider, json!({ "notes": "x" })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["msg"], "Not authorized to update this budget");
    Ok(())
}

#[tokio::test]
async fn only_the_manager_deletes() -> Result<()> {
    let s = setup().await?;
    let (_, budget) = s.server.post("/api/budgets", &s.member, budget_body(&s.project, 100.0, 120.0)).await?;
    let path = format!("/api/budgets/{}", id_of(&budget));

    let (status, body) = s.server.delete(&path, &s.member).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["msg"], "Not authorized to delete this budget");

    let (status, still) = s.server.get(&path, &s.manager).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(still["id"], budget["id"]);

    let (status, body) = s.server.delete(&path, &s.manager).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "Budget removed");

    let (status, body) = s.server.call(Method::GET, &path, Some(&s.manager), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["msg"], "Budget not found");
    Ok(())
}
