#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use project_budget_api::auth::hash_password;
use project_budget_api::config::AppConfig;
use project_budget_api::database::models::User;
use project_budget_api::types::Role;
use project_budget_api::{app, AppState};

/// An in-process server on its own port, backed by a fresh in-memory store.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub state: AppState,
    client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = AppState::in_memory(AppConfig::for_tests())?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        let router = app(state.clone());
        tokio::spawn(async move { axum::serve(listener, router).await });

        let server = Self {
            port,
            base_url,
            state,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/api/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Insert a user straight into the store.
    pub async fn seed_user(&self, name: &str, email: &str, password: &str, role: Role) -> Result<User> {
        let hash = hash_password(password, 4).await?;
        let user = User::new(name.to_string(), email.to_string(), hash, role);
        self.state.store.insert_user(&user).await?;
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let (status, body) = self
            .call(Method::POST, "/api/auth", None, Some(json!({ "email": email, "password": password })))
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed with {}: {}", status, body);
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("login response carried no token")
    }

    /// Seed a user and log them in.
    pub async fn user_with_token(&self, name: &str, email: &str, role: Role) -> Result<(User, String)> {
        let user = self.seed_user(name, email, "password123", role).await?;
        let token = self.login(email, "password123").await?;
        Ok((user, token))
    }

    pub async fn call(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut request = self.client.request(method, self.url(path));
        if let Some(token) = token {
            request = request.header("x-auth-token", token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let value = if text.is_empty() { Value::Null } else { serde_json::from_str(&text)? };
        Ok((status, value))
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.call(Method::GET, path, Some(token), None).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::POST, path, Some(token), Some(body)).await
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::PUT, path, Some(token), Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.call(Method::DELETE, path, Some(token), None).await
    }
}

pub fn project_body(name: &str, allocated: f64) -> Value {
    json!({
        "name": name,
        "description": "Test project",
        "startDate": "2024-01-01",
        "budget": { "allocated": allocated },
    })
}

pub fn budget_body(project: &str, monthly: f64, actual: f64) -> Value {
    json!({
        "service": "AWS",
        "type": "Compute",
        "usage": { "value": 100, "unit": "Hours" },
        "period": { "start": "2024-01-01", "end": "2024-01-31" },
        "monthlyCost": monthly,
        "actualCost": actual,
        "project": project,
    })
}
