use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{ProjectStatus, RiskLevel, TeamRole};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectBudget {
    pub allocated: f64,
    pub used: f64,
    pub remaining: f64,
}

impl ProjectBudget {
    /// Fresh budget: nothing used yet.
    pub fn allocate(allocated: f64) -> Self {
        Self {
            allocated,
            used: 0.0,
            remaining: allocated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub percentage: f64,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub description: Option<String>,
    pub impact: Option<String>,
    pub mitigation: Option<String>,
    pub date_identified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub user: Uuid,
    pub role: TeamRole,
    pub allocation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub name: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed: bool,
    pub completion_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Remark {
    pub text: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub name: Option<String>,
    pub url: Option<String>,
    pub uploaded_by: Option<Uuid>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
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
    pub manager: Uuid,
    pub team: Vec<TeamMember>,
    pub milestones: Vec<Milestone>,
    pub remarks: Vec<Remark>,
    pub documents: Vec<Document>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn is_manager(&self, user_id: Uuid) -> bool {
        self.manager == user_id
    }

    pub fn is_team_member(&self, user_id: Uuid) -> bool {
        self.team.iter().any(|member| member.user == user_id)
    }

    /// Manager or team member.
    pub fn has_member(&self, user_id: Uuid) -> bool {
        self.is_manager(user_id) || self.is_team_member(user_id)
    }

    /// Derivations applied before every write.
    pub fn prepare_save(&mut self, now: DateTime<Utc>) {
        self.budget.remaining = self.budget.allocated - self.budget.used;
        self.updated_at = now;
    }

    pub fn set_progress(&mut self, percentage: f64, now: DateTime<Utc>) {
        self.progress.percentage = percentage;
        self.progress.last_updated = Some(now);
    }

    /// Case-insensitive match over name, description, risk descriptions and remark texts.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        let hit = |s: &str| s.to_lowercase().contains(&needle);

        hit(&self.name)
            || self.description.as_deref().is_some_and(hit)
            || self.risks.iter().filter_map(|r| r.description.as_deref()).any(hit)
            || self.remarks.iter().filter_map(|r| r.text.as_deref()).any(hit)
    }
}
