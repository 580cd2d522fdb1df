use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{Budget, Project, User};
use super::{DatabaseError, ProjectQuery, Store};

/// In-process store used when no `DATABASE_URL` is configured, and by tests.
///
/// Each map sits behind its own lock; an operation holds one lock for its
/// whole check-then-write so uniqueness checks cannot race.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    projects: RwLock<HashMap<Uuid, Project>>,
    budgets: RwLock<HashMap<Uuid, Budget>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, DatabaseError> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }

    async fn insert_user(&self, user: &User) -> Result<(), DatabaseError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(DatabaseError::Conflict(format!("email {}", user.email)));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), DatabaseError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email && u.id != user.id) {
            return Err(DatabaseError::Conflict(format!("email {}", user.email)));
        }
        match users.get_mut(&user.id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(())
            }
            None => Err(DatabaseError::NotFound(format!("user {}", user.id))),
        }
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.users.write().await.remove(&id).is_some())
    }

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, DatabaseError> {
        Ok(self.projects.read().await.get(&id).cloned())
    }

    async fn find_project_by_name(&self, name: &str) -> Result<Option<Project>, DatabaseError> {
        let projects = self.projects.read().await;
        Ok(projects.values().find(|p| p.name == name).cloned())
    }

    async fn list_projects(&self, query: &ProjectQuery) -> Result<(Vec<Project>, u64), DatabaseError> {
        let projects = self.projects.read().await;
        let mut matches: Vec<&Project> = projects
            .values()
            .filter(|p| p.has_member(query.member))
            .filter(|p| query.status.map_or(true, |s| p.status == s))
            .filter(|p| query.manager.map_or(true, |m| p.manager == m))
            .filter(|p| query.search.as_deref().map_or(true, |s| p.matches_search(s)))
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matches.len() as u64;
        let page = matches
            .into_iter()
            .skip(usize::try_from(query.offset).unwrap_or(usize::MAX))
            .take(query.limit as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn insert_project(&self, project: &Project) -> Result<(), DatabaseError> {
        let mut projects = self.projects.write().await;
        if projects.values().any(|p| p.name == project.name) {
            return Err(DatabaseError::Conflict(format!("project name {}", project.name)));
        }
        projects.insert(project.id, project.clone());
        Ok(())
    }

    async fn update_project(&self, project: &Project) -> Result<(), DatabaseError> {
        let mut projects = self.projects.write().await;
        if projects.values().any(|p| p.name == project.name && p.id != project.id) {
            return Err(DatabaseError::Conflict(format!("project name {}", project.name)));
        }
        match projects.get_mut(&project.id) {
            Some(slot) => {
                *slot = project.clone();
                Ok(())
            }
            None => Err(DatabaseError::NotFound(format!("project {}", project.id))),
        }
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.projects.write().await.remove(&id).is_some())
    }

    async fn find_budget(&self, id: Uuid) -> Result<Option<Budget>, DatabaseError> {
        Ok(self.budgets.read().await.get(&id).cloned())
    }

    async fn list_budgets(&self, project: Uuid) -> Result<Vec<Budget>, DatabaseError> {
        let budgets = self.budgets.read().await;
        let mut rows: Vec<Budget> = budgets.values().filter(|b| b.project == project).cloned().collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    async fn insert_budget(&self, budget: &Budget) -> Result<(), DatabaseError> {
        self.budgets.write().await.insert(budget.id, budget.clone());
        Ok(())
    }

    async fn update_budget(&self, budget: &Budget) -> Result<(), DatabaseError> {
        let mut budgets = self.budgets.write().await;
        match budgets.get_mut(&budget.id) {
            Some(slot) => {
                *slot = budget.clone();
                Ok(())
            }
            None => Err(DatabaseError::NotFound(format!("budget {}", budget.id))),
        }
    }

    async fn delete_budget(&self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.budgets.write().await.remove(&id).is_some())
    }

    async fn delete_project_budgets(&self, project: Uuid) -> Result<u64, DatabaseError> {
        let mut budgets = self.budgets.write().await;
        let before = budgets.len();
        budgets.retain(|_, b| b.project != project);
        Ok((before - budgets.len()) as u64)
    }
}
