use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{types::Json, FromRow, PgPool, Postgres, QueryBuilder};
use std::str::FromStr;
use uuid::Uuid;

use super::models::{
    Budget, Document, Milestone, Period, Progress, Project, ProjectBudget, Remark, Risk, TeamMember,
    Usage, User,
};
use super::{DatabaseError, DatabaseManager, ProjectQuery, Store};

const PROJECT_COLUMNS: &str = "id, name, description, status, start_date, end_date, \
    budget_allocated, budget_used, budget_remaining, progress_percentage, progress_last_updated, \
    risk_level, risks, manager_id, team, milestones, remarks, documents, created_at, updated_at";

const BUDGET_COLUMNS: &str = "id, service, service_icon, service_color, budget_type, usage_value, \
    usage_unit, period_start, period_end, monthly_cost, actual_cost, project_id, created_by, notes, \
    status, created_at, updated_at";

/// Postgres-backed store. Nested project lists live in JSONB columns.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn parse_enum<T: FromStr>(column: &str, raw: &str) -> Result<T, DatabaseError> {
    raw.parse()
        .map_err(|_| DatabaseError::Corrupt(format!("{} = {:?}", column, raw)))
}

/// Unique violations become conflicts; everything else passes through.
fn map_write_error(err: sqlx::Error) -> DatabaseError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DatabaseError::Conflict(db.constraint().unwrap_or("unique").to_string())
        }
        _ => DatabaseError::Sqlx(err),
    }
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('%');
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password: String,
    role: String,
    password_changed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DatabaseError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password: row.password,
            role: parse_enum("users.role", &row.role)?,
            password_changed_at: row.password_changed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct ProjectRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    status: String,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    budget_allocated: f64,
    budget_used: f64,
    budget_remaining: f64,
    progress_percentage: f64,
    progress_last_updated: Option<DateTime<Utc>>,
    risk_level: String,
    risks: Json<Vec<Risk>>,
    manager_id: Uuid,
    team: Json<Vec<TeamMember>>,
    milestones: Json<Vec<Milestone>>,
    remarks: Json<Vec<Remark>>,
    documents: Json<Vec<Document>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = DatabaseError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Project {
            id: row.id,
            name: row.name,
            description: row.description,
            status: parse_enum("projects.status", &row.status)?,
            start_date: row.start_date,
            end_date: row.end_date,
            budget: ProjectBudget {
                allocated: row.budget_allocated,
                used: row.budget_used,
                remaining: row.budget_remaining,
            },
            progress: Progress {
                percentage: row.progress_percentage,
                last_updated: row.progress_last_updated,
            },
            risk_level: parse_enum("projects.risk_level", &row.risk_level)?,
            risks: row.risks.0,
            manager: row.manager_id,
            team: row.team.0,
            milestones: row.milestones.0,
            remarks: row.remarks.0,
            documents: row.documents.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct BudgetRow {
    id: Uuid,
    service: String,
    service_icon: String,
    service_color: String,
    budget_type: String,
    usage_value: f64,
    usage_unit: String,
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
    monthly_cost: f64,
    actual_cost: f64,
    project_id: Uuid,
    created_by: Uuid,
    notes: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BudgetRow> for Budget {
    type Error = DatabaseError;

    fn try_from(row: BudgetRow) -> Result<Self, Self::Error> {
        Ok(Budget {
            id: row.id,
            service: row.service,
            service_icon: row.service_icon,
            service_color: row.service_color,
            budget_type: parse_enum("budgets.budget_type", &row.budget_type)?,
            usage: Usage {
                value: row.usage_value,
                unit: parse_enum("budgets.usage_unit", &row.usage_unit)?,
            },
            period: Period {
                start: row.period_start,
                end: row.period_end,
            },
            monthly_cost: row.monthly_cost,
            actual_cost: row.actual_cost,
            project: row.project_id,
            created_by: row.created_by,
            notes: row.notes,
            status: parse_enum("budgets.status", &row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Appends the WHERE clause shared by the listing and its count.
fn push_project_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ProjectQuery) {
    builder
        .push(" WHERE (manager_id = ")
        .push_bind(query.member)
        .push(" OR team @> ")
        .push_bind(Json(json!([{ "user": query.member }])))
        .push(")");

    if let Some(status) = query.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(manager) = query.manager {
        builder.push(" AND manager_id = ").push_bind(manager);
    }
    if let Some(search) = query.search.as_deref() {
        let pattern = escape_like(search);
        builder
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR EXISTS (SELECT 1 FROM jsonb_array_elements(risks) r WHERE r->>'description' ILIKE ")
            .push_bind(pattern.clone())
            .push(") OR EXISTS (SELECT 1 FROM jsonb_array_elements(remarks) m WHERE m->>'text' ILIKE ")
            .push_bind(pattern)
            .push("))");
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn insert_user(&self, user: &User) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO users (id, name, email, password, role, password_changed_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.role.as_str())
        .bind(user.password_changed_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE users SET name = $2, email = $3, password = $4, role = $5, \
             password_changed_at = $6, updated_at = $7 WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.role.as_str())
        .bind(user.password_changed_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {}", user.id)));
        }
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, DatabaseError> {
        let sql = format!("SELECT {} FROM projects WHERE id = $1", PROJECT_COLUMNS);
        sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Project::try_from)
            .transpose()
    }

    async fn find_project_by_name(&self, name: &str) -> Result<Option<Project>, DatabaseError> {
        let sql = format!("SELECT {} FROM projects WHERE name = $1", PROJECT_COLUMNS);
        sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .map(Project::try_from)
            .transpose()
    }

    async fn list_projects(&self, query: &ProjectQuery) -> Result<(Vec<Project>, u64), DatabaseError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM projects");
        push_project_filters(&mut count, query);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM projects", PROJECT_COLUMNS));
        push_project_filters(&mut select, query);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(query.limit as i64)
            .push(" OFFSET ")
            .push_bind(i64::try_from(query.offset).unwrap_or(i64::MAX));

        let projects = select
            .build_query_as::<ProjectRow>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Project::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((projects, total.max(0) as u64))
    }

    async fn insert_project(&self, project: &Project) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO projects (id, name, description, status, start_date, end_date, \
             budget_allocated, budget_used, budget_remaining, progress_percentage, progress_last_updated, \
             risk_level, risks, manager_id, team, milestones, remarks, documents, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)",
        )
        .bind(project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.status.as_str())
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.budget.allocated)
        .bind(project.budget.used)
        .bind(project.budget.remaining)
        .bind(project.progress.percentage)
        .bind(project.progress.last_updated)
        .bind(project.risk_level.as_str())
        .bind(Json(&project.risks))
        .bind(project.manager)
        .bind(Json(&project.team))
        .bind(Json(&project.milestones))
        .bind(Json(&project.remarks))
        .bind(Json(&project.documents))
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(())
    }

    async fn update_project(&self, project: &Project) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE projects SET name = $2, description = $3, status = $4, start_date = $5, end_date = $6, \
             budget_allocated = $7, budget_used = $8, budget_remaining = $9, progress_percentage = $10, \
             progress_last_updated = $11, risk_level = $12, risks = $13, manager_id = $14, team = $15, \
             milestones = $16, remarks = $17, documents = $18, updated_at = $19 WHERE id = $1",
        )
        .bind(project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.status.as_str())
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.budget.allocated)
        .bind(project.budget.used)
        .bind(project.budget.remaining)
        .bind(project.progress.percentage)
        .bind(project.progress.last_updated)
        .bind(project.risk_level.as_str())
        .bind(Json(&project.risks))
        .bind(project.manager)
        .bind(Json(&project.team))
        .bind(Json(&project.milestones))
        .bind(Json(&project.remarks))
        .bind(Json(&project.documents))
        .bind(project.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("project {}", project.id)));
        }
        Ok(())
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_budget(&self, id: Uuid) -> Result<Option<Budget>, DatabaseError> {
        let sql = format!("SELECT {} FROM budgets WHERE id = $1", BUDGET_COLUMNS);
        sqlx::query_as::<_, BudgetRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Budget::try_from)
            .transpose()
    }

    async fn list_budgets(&self, project: Uuid) -> Result<Vec<Budget>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM budgets WHERE project_id = $1 ORDER BY created_at",
            BUDGET_COLUMNS
        );
        sqlx::query_as::<_, BudgetRow>(&sql)
            .bind(project)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Budget::try_from)
            .collect()
    }

    async fn insert_budget(&self, budget: &Budget) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO budgets (id, service, service_icon, service_color, budget_type, usage_value, \
             usage_unit, period_start, period_end, monthly_cost, actual_cost, project_id, created_by, \
             notes, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
        )
        .bind(budget.id)
        .bind(&budget.service)
        .bind(&budget.service_icon)
        .bind(&budget.service_color)
        .bind(budget.budget_type.as_str())
        .bind(budget.usage.value)
        .bind(budget.usage.unit.as_str())
        .bind(budget.period.start)
        .bind(budget.period.end)
        .bind(budget.monthly_cost)
        .bind(budget.actual_cost)
        .bind(budget.project)
        .bind(budget.created_by)
        .bind(&budget.notes)
        .bind(budget.status.as_str())
        .bind(budget.created_at)
        .bind(budget.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(())
    }

    async fn update_budget(&self, budget: &Budget) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE budgets SET service = $2, service_icon = $3, service_color = $4, budget_type = $5, \
             usage_value = $6, usage_unit = $7, period_start = $8, period_end = $9, monthly_cost = $10, \
             actual_cost = $11, notes = $12, status = $13, updated_at = $14 WHERE id = $1",
        )
        .bind(budget.id)
        .bind(&budget.service)
        .bind(&budget.service_icon)
        .bind(&budget.service_color)
        .bind(budget.budget_type.as_str())
        .bind(budget.usage.value)
        .bind(budget.usage.unit.as_str())
        .bind(budget.period.start)
        .bind(budget.period.end)
        .bind(budget.monthly_cost)
        .bind(budget.actual_cost)
        .bind(&budget.notes)
        .bind(budget.status.as_str())
        .bind(budget.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("budget {}", budget.id)));
        }
        Ok(())
    }

    async fn delete_budget(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM budgets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_project_budgets(&self, project: Uuid) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM budgets WHERE project_id = $1")
            .bind(project)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
