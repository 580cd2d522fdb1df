pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::types::ProjectStatus;
use models::{Budget, Project, User};

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Filter and window for the "projects I belong to" listing.
#[derive(Debug, Clone)]
pub struct ProjectQuery {
    /// Only projects this user manages or is on the team of.
    pub member: Uuid,
    pub status: Option<ProjectStatus>,
    pub manager: Option<Uuid>,
    pub search: Option<String>,
    pub offset: u64,
    pub limit: u64,
}

/// The external store. Every method is a single-record (or single-query)
/// operation; there are no cross-record transactions.
///
/// Unique constraints (user email, project name) surface as
/// [`DatabaseError::Conflict`]; updates of missing rows as
/// [`DatabaseError::NotFound`].
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<(), DatabaseError>;

    // Users
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, DatabaseError>;
    async fn list_users(&self) -> Result<Vec<User>, DatabaseError>;
    async fn insert_user(&self, user: &User) -> Result<(), DatabaseError>;
    async fn update_user(&self, user: &User) -> Result<(), DatabaseError>;
    async fn delete_user(&self, id: Uuid) -> Result<bool, DatabaseError>;

    // Projects
    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, DatabaseError>;
    async fn find_project_by_name(&self, name: &str) -> Result<Option<Project>, DatabaseError>;
    /// Newest first, plus the total number of matches ignoring the window.
    async fn list_projects(&self, query: &ProjectQuery) -> Result<(Vec<Project>, u64), DatabaseError>;
    async fn insert_project(&self, project: &Project) -> Result<(), DatabaseError>;
    async fn update_project(&self, project: &Project) -> Result<(), DatabaseError>;
    async fn delete_project(&self, id: Uuid) -> Result<bool, DatabaseError>;

    // Budgets
    async fn find_budget(&self, id: Uuid) -> Result<Option<Budget>, DatabaseError>;
    async fn list_budgets(&self, project: Uuid) -> Result<Vec<Budget>, DatabaseError>;
    async fn insert_budget(&self, budget: &Budget) -> Result<(), DatabaseError>;
    async fn update_budget(&self, budget: &Budget) -> Result<(), DatabaseError>;
    async fn delete_budget(&self, id: Uuid) -> Result<bool, DatabaseError>;
    async fn delete_project_budgets(&self, project: Uuid) -> Result<u64, DatabaseError>;
}
