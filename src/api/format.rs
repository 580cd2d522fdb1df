use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::database::models::{
    Budget, Milestone, Progress, Project, ProjectBudget, Risk, Usage, User, UserSummary,
};
use crate::database::{DatabaseError, Store};
use crate::types::{BudgetStatus, BudgetType, ProjectStatus, RiskLevel, TeamRole};

/// A user reference: populated when the user still exists, the bare id otherwise.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum UserRef {
    Populated(UserSummary),
    Id(Uuid),
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamMemberView {
    pub user: UserRef,
    pub role: TeamRole,
    pub allocation: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemarkView {
    pub text: Option<String>,
    pub created_by: Option<UserRef>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView {
    pub name: Option<String>,
    pub url: Option<String>,
    pub uploaded_by: Option<UserRef>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub budget: ProjectBudget,
    pub progress: Progress,
    pub risk_level: RiskLevel,
    pub risks: Vec<Risk>,
    pub manager: UserRef,
    pub team: Vec<TeamMemberView>,
    pub milestones: Vec<Milestone>,
    pub remarks: Vec<RemarkView>,
    pub documents: Vec<DocumentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodView {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetView {
    pub id: Uuid,
    pub service: String,
    pub service_icon: String,
    pub service_color: String,
    #[serde(rename = "type")]
    pub budget_type: BudgetType,
    pub usage: Usage,
    pub period: PeriodView,
    pub monthly_cost: f64,
    pub actual_cost: f64,
    pub variance: f64,
    pub project: ProjectRef,
    pub created_by: UserRef,
    pub notes: Option<String>,
    pub status: BudgetStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Paginated listing envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T: Serialize> {
    pub docs: Vec<T>,
    pub total_docs: u64,
    pub limit: u64,
    pub page: u64,
    pub total_pages: u64,
    pub has_prev_page: bool,
    pub has_next_page: bool,
    pub prev_page: Option<u64>,
    pub next_page: Option<u64>,
}

impl<T: Serialize> Page<T> {
    pub fn new(docs: Vec<T>, total_docs: u64, page: u64, limit: u64) -> Self {
        let total_pages = if limit == 0 { 1 } else { total_docs.div_ceil(limit).max(1) };
        let has_prev_page = page > 1;
        let has_next_page = page < total_pages;
        Self {
            docs,
            total_docs,
            limit,
            page,
            total_pages,
            has_prev_page,
            has_next_page,
            prev_page: has_prev_page.then(|| page - 1),
            next_page: has_next_page.then(|| page + 1),
        }
    }
}

/// Wire form of budget period dates.
pub fn day(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

type Directory = HashMap<Uuid, User>;

async fn directory(store: &dyn Store, ids: HashSet<Uuid>) -> Result<Directory, DatabaseError> {
    let ids: Vec<Uuid> = ids.into_iter().collect();
    let users = store.find_users(&ids).await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

fn with_email(users: &Directory, id: Uuid) -> UserRef {
    users
        .get(&id)
        .map(|u| UserRef::Populated(UserSummary::with_email(u)))
        .unwrap_or(UserRef::Id(id))
}

fn name_only(users: &Directory, id: Uuid) -> UserRef {
    users
        .get(&id)
        .map(|u| UserRef::Populated(UserSummary::name_only(u)))
        .unwrap_or(UserRef::Id(id))
}

fn referenced_users(project: &Project) -> impl Iterator<Item = Uuid> + '_ {
    std::iter::once(project.manager)
        .chain(project.team.iter().map(|m| m.user))
        .chain(project.remarks.iter().filter_map(|r| r.created_by))
        .chain(project.documents.iter().filter_map(|d| d.uploaded_by))
}

fn shape_project(project: Project, users: &Directory) -> ProjectView {
    ProjectView {
        id: project.id,
        name: project.name,
        description: project.description,
        status: project.status,
        start_date: project.start_date,
        end_date: project.end_date,
        budget: project.budget,
        progress: project.progress,
        risk_level: project.risk_level,
        risks: project.risks,
        manager: with_email(users, project.manager),
        team: project
            .team
            .into_iter()
            .map(|m| TeamMemberView {
                user: with_email(users, m.user),
                role: m.role,
                allocation: m.allocation,
            })
            .collect(),
        milestones: project.milestones,
        remarks: project
            .remarks
            .into_iter()
            .map(|r| RemarkView {
                text: r.text,
                created_by: r.created_by.map(|id| with_email(users, id)),
                created_at: r.created_at,
            })
            .collect(),
        documents: project
            .documents
            .into_iter()
            .map(|d| DocumentView {
                name: d.name,
                url: d.url,
                uploaded_by: d.uploaded_by.map(|id| with_email(users, id)),
                uploaded_at: d.uploaded_at,
            })
            .collect(),
        created_at: project.created_at,
        updated_at: project.updated_at,
    }
}

/// Projects with manager, team and authors populated in one user lookup.
pub async fn project_views(store: &dyn Store, projects: Vec<Project>) -> Result<Vec<ProjectView>, DatabaseError> {
    let ids = projects.iter().flat_map(referenced_users).collect();
    let users = directory(store, ids).await?;
    Ok(projects.into_iter().map(|p| shape_project(p, &users)).collect())
}

pub async fn project_view(store: &dyn Store, project: Project) -> Result<ProjectView, DatabaseError> {
    let users = directory(store, referenced_users(&project).collect()).await?;
    Ok(shape_project(project, &users))
}

fn shape_budget(budget: Budget, project: &Project, users: &Directory) -> BudgetView {
    BudgetView {
        id: budget.id,
        variance: budget.variance(),
        service: budget.service,
        service_icon: budget.service_icon,
        service_color: budget.service_color,
        budget_type: budget.budget_type,
        usage: budget.usage,
        period: PeriodView {
            start: day(&budget.period.start),
            end: day(&budget.period.end),
        },
        monthly_cost: budget.monthly_cost,
        actual_cost: budget.actual_cost,
        project: ProjectRef {
            id: project.id,
            name: project.name.clone(),
        },
        created_by: name_only(users, budget.created_by),
        notes: budget.notes,
        status: budget.status,
        created_at: budget.created_at,
        updated_at: budget.updated_at,
    }
}

/// Budgets of one project with the creator's name populated.
pub async fn budget_views(
    store: &dyn Store,
    budgets: Vec<Budget>,
    project: &Project,
) -> Result<Vec<BudgetView>, DatabaseError> {
    let users = directory(store, budgets.iter().map(|b| b.created_by).collect()).await?;
    Ok(budgets.into_iter().map(|b| shape_budget(b, project, &users)).collect())
}

pub async fn budget_view(store: &dyn Store, budget: Budget, project: &Project) -> Result<BudgetView, DatabaseError> {
    let users = directory(store, HashSet::from([budget.created_by])).await?;
    Ok(shape_budget(budget, project, &users))
}
