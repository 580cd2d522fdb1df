use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::{Checker, Need, ValidationErrors};
use crate::database::models::{
    Document, Milestone, Progress, Project, ProjectBudget, Remark, Risk, TeamMember,
};
use crate::types::{ProjectStatus, RiskLevel, TeamRole};

pub const NAME_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 500;

const STATUS_MESSAGE: &str = "Invalid status";
const RISK_LEVEL_MESSAGE: &str = "Invalid risk level";
const PROGRESS_MESSAGE: &str = "Progress must be between 0-100";

/// Body of a project creation request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub allocated: f64,
    pub progress: Option<f64>,
    pub risk_level: RiskLevel,
    pub risks: Vec<Risk>,
    pub team: Vec<TeamMember>,
    pub milestones: Vec<Milestone>,
    pub remarks: Vec<Remark>,
    pub documents: Vec<Document>,
}

impl NewProject {
    /// The creator becomes the manager; nothing of the allocation is used yet.
    pub fn into_project(self, manager: Uuid, now: DateTime<Utc>) -> Project {
        let mut project = Project {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            status: self.status,
            start_date: self.start_date,
            end_date: self.end_date,
            budget: ProjectBudget::allocate(self.allocated),
            progress: Progress::default(),
            risk_level: self.risk_level,
            risks: self.risks,
            manager,
            team: self.team,
            milestones: self.milestones,
            remarks: self
                .remarks
                .into_iter()
                .map(|r| Remark {
                    created_by: r.created_by.or(Some(manager)),
                    ..r
                })
                .collect(),
            documents: self.documents,
            created_at: now,
            updated_at: now,
        };
        if let Some(percentage) = self.progress {
            project.set_progress(percentage, now);
        }
        project.prepare_save(now);
        project
    }
}

/// Fields a manager may change through the generic update. Budget, manager
/// and team are not part of it and are ignored when sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub progress: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    pub risks: Option<Vec<Risk>>,
    pub milestones: Option<Vec<Milestone>>,
    pub remarks: Option<Vec<Remark>>,
    pub documents: Option<Vec<Document>>,
}

impl ProjectPatch {
    pub fn apply(self, project: &mut Project, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if let Some(description) = self.description {
            project.description = Some(description);
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        if let Some(start) = self.start_date {
            project.start_date = start;
        }
        if let Some(end) = self.end_date {
            project.end_date = Some(end);
        }
        if let Some(percentage) = self.progress {
            project.set_progress(percentage, now);
        }
        if let Some(level) = self.risk_level {
            project.risk_level = level;
        }
        if let Some(risks) = self.risks {
            project.risks = risks;
        }
        if let Some(milestones) = self.milestones {
            project.milestones = milestones;
        }
        if let Some(remarks) = self.remarks {
            project.remarks = remarks;
        }
        if let Some(documents) = self.documents {
            project.documents = documents;
        }
        project.prepare_save(now);
    }
}

fn name_and_description(c: &mut Checker<'_>, name_need: Need) -> (Option<String>, Option<String>) {
    let name = c.text("name", name_need, "Name is required");
    c.max_chars("name", name.as_ref(), NAME_MAX, "Project name cannot exceed 100 characters");
    let description = c.free_text("description", "Description must be text");
    c.max_chars(
        "description",
        description.as_ref(),
        DESCRIPTION_MAX,
        "Description cannot exceed 500 characters",
    );
    (name, description)
}

fn progress(c: &mut Checker<'_>) -> Option<f64> {
    if c.lookup("progress").is_some_and(|p| !p.is_object()) {
        c.fail("progress", PROGRESS_MESSAGE);
        return None;
    }
    c.number("progress.percentage", Need::Optional, Some(0.0), Some(100.0), PROGRESS_MESSAGE)
}

fn risks(c: &mut Checker<'_>, now: DateTime<Utc>) -> Option<Vec<Risk>> {
    let len = c.array_len("risks", "Risks must be a list")?;
    let items = (0..len)
        .map(|i| Risk {
            description: c.free_text(&format!("risks[{i}].description"), "Description must be text"),
            impact: c.free_text(&format!("risks[{i}].impact"), "Impact must be text"),
            mitigation: c.free_text(&format!("risks[{i}].mitigation"), "Mitigation must be text"),
            date_identified: c
                .date(&format!("risks[{i}].dateIdentified"), Need::Optional, "Valid date is required")
                .unwrap_or(now),
        })
        .collect();
    Some(items)
}

fn team(c: &mut Checker<'_>) -> Vec<TeamMember> {
    let Some(len) = c.array_len("team", "Team must be a list") else {
        return Vec::new();
    };
    (0..len)
        .filter_map(|i| {
            let user = c.id(&format!("team[{i}].user"), Need::Required, "Team member is required");
            let role = c.choice::<TeamRole>(&format!("team[{i}].role"), Need::Required, "Role is required");
            let allocation = c
                .number(
                    &format!("team[{i}].allocation"),
                    Need::Optional,
                    Some(0.0),
                    Some(100.0),
                    "Allocation must be between 0-100",
                )
                .unwrap_or(100.0);
            Some(TeamMember {
                user: user?,
                role: role?,
                allocation,
            })
        })
        .collect()
}

fn milestones(c: &mut Checker<'_>) -> Option<Vec<Milestone>> {
    let len = c.array_len("milestones", "Milestones must be a list")?;
    let items = (0..len)
        .map(|i| Milestone {
            name: c.free_text(&format!("milestones[{i}].name"), "Name must be text"),
            description: c.free_text(&format!("milestones[{i}].description"), "Description must be text"),
            due_date: c.date(&format!("milestones[{i}].dueDate"), Need::Optional, "Valid due date is required"),
            completed: c
                .boolean(&format!("milestones[{i}].completed"), "Completed must be true or false")
                .unwrap_or(false),
            completion_date: c.date(
                &format!("milestones[{i}].completionDate"),
                Need::Optional,
                "Valid completion date is required",
            ),
        })
        .collect();
    Some(items)
}

fn remarks(c: &mut Checker<'_>, now: DateTime<Utc>) -> Option<Vec<Remark>> {
    let len = c.array_len("remarks", "Remarks must be a list")?;
    let items = (0..len)
        .map(|i| Remark {
            text: c.free_text(&format!("remarks[{i}].text"), "Text must be text"),
            created_by: c.id(&format!("remarks[{i}].createdBy"), Need::Optional, "Valid user ID is required"),
            created_at: c
                .date(&format!("remarks[{i}].createdAt"), Need::Optional, "Valid date is required")
                .unwrap_or(now),
        })
        .collect();
    Some(items)
}

fn documents(c: &mut Checker<'_>, now: DateTime<Utc>) -> Option<Vec<Document>> {
    let len = c.array_len("documents", "Documents must be a list")?;
    let items = (0..len)
        .map(|i| Document {
            name: c.free_text(&format!("documents[{i}].name"), "Name must be text"),
            url: c.free_text(&format!("documents[{i}].url"), "URL must be text"),
            uploaded_by: c.id(&format!("documents[{i}].uploadedBy"), Need::Optional, "Valid user ID is required"),
            uploaded_at: c
                .date(&format!("documents[{i}].uploadedAt"), Need::Optional, "Valid date is required")
                .unwrap_or(now),
        })
        .collect();
    Some(items)
}

pub fn new_project(body: &Value, now: DateTime<Utc>) -> Result<NewProject, ValidationErrors> {
    let mut c = Checker::new(body);
    let (name, description) = name_and_description(&mut c, Need::Required);
    let status = c.choice("status", Need::Optional, STATUS_MESSAGE);
    let start_date = c.date("startDate", Need::Required, "Valid start date is required");
    let end_date = c.date("endDate", Need::Optional, "Valid end date is required");
    let allocated = c.number("budget.allocated", Need::Required, Some(0.0), None, "Valid budget is required");
    let progress = progress(&mut c);
    let risk_level = c.choice("riskLevel", Need::Optional, RISK_LEVEL_MESSAGE);
    let risks = risks(&mut c, now).unwrap_or_default();
    let team = team(&mut c);
    let milestones = milestones(&mut c).unwrap_or_default();
    let remarks = remarks(&mut c, now).unwrap_or_default();
    let documents = documents(&mut c, now).unwrap_or_default();

    let (Some(name), Some(start_date), Some(allocated)) = (name, start_date, allocated) else {
        return Err(c.reject());
    };
    c.finish(NewProject {
        name,
        description,
        status: status.unwrap_or(ProjectStatus::Planning),
        start_date,
        end_date,
        allocated,
        progress,
        risk_level: risk_level.unwrap_or(RiskLevel::Low),
        risks,
        team,
        milestones,
        remarks,
        documents,
    })
}

pub fn project_patch(body: &Value, now: DateTime<Utc>) -> Result<ProjectPatch, ValidationErrors> {
    let mut c = Checker::new(body);
    let (name, description) = name_and_description(&mut c, Need::Optional);
    let patch = ProjectPatch {
        name,
        description,
        status: c.choice("status", Need::Optional, STATUS_MESSAGE),
        start_date: c.date("startDate", Need::Optional, "Valid start date is required"),
        end_date: c.date("endDate", Need::Optional, "Valid end date is required"),
        progress: progress(&mut c),
        risk_level: c.choice("riskLevel", Need::Optional, RISK_LEVEL_MESSAGE),
        risks: risks(&mut c, now),
        milestones: milestones(&mut c),
        remarks: remarks(&mut c, now),
        documents: documents(&mut c, now),
    };
    c.finish(patch)
}

/// Rules spanning fields, checked on the record about to be written.
pub fn check_project(project: &Project) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    if project.end_date.is_some_and(|end| end < project.start_date) {
        errors.push(super::FieldError::new("endDate", "End date must be after start date"));
    }
    if project.budget.allocated < 0.0 {
        errors.push(super::FieldError::new("budget.allocated", "Budget cannot be negative"));
    }
    if project.budget.used < 0.0 {
        errors.push(super::FieldError::new("budget.used", "Used budget cannot be negative"));
    }
    if project.budget.remaining < 0.0 {
        errors.push(super::FieldError::new("budget.remaining", "Remaining budget cannot be negative"));
    }
    if !(0.0..=100.0).contains(&project.progress.percentage) {
        errors.push(super::FieldError::new("progress.percentage", PROGRESS_MESSAGE));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn alpha() -> Value {
        json!({
            "name": "  Alpha  ",
            "description": "Billing migration",
            "startDate": "2024-01-01",
            "budget": { "allocated": 1000 },
        })
    }

    #[test]
    fn creation_applies_defaults() {
        let now = Utc::now();
        let manager = Uuid::new_v4();
        let project = new_project(&alpha(), now).unwrap().into_project(manager, now);

        assert_eq!(project.name, "Alpha");
        assert_eq!(project.status, ProjectStatus::Planning);
        assert_eq!(project.risk_level, RiskLevel::Low);
        assert_eq!(project.budget, ProjectBudget { allocated: 1000.0, used: 0.0, remaining: 1000.0 });
        assert_eq!(project.manager, manager);
        assert!(project.progress.last_updated.is_none());
    }

    #[test]
    fn creation_collects_missing_fields() {
        let err = new_project(&json!({ "status": "Paused" }), Utc::now()).unwrap_err();
        let fields: Vec<&str> = err.fields().collect();
        assert_eq!(fields, vec!["name", "status", "startDate", "budget.allocated"]);
    }

    #[test]
    fn long_names_are_rejected() {
        let mut body = alpha();
        body["name"] = json!("x".repeat(101));
        let err = new_project(&body, Utc::now()).unwrap_err();
        assert_eq!(err.0[0].message, "Project name cannot exceed 100 characters");
    }

    #[test]
    fn team_members_default_to_full_allocation() {
        let mut body = alpha();
        let dev = Uuid::new_v4();
        body["team"] = json!([{ "user": dev.to_string(), "role": "QA" }]);
        let draft = new_project(&body, Utc::now()).unwrap();
        assert_eq!(draft.team, vec![TeamMember { user: dev, role: TeamRole::Qa, allocation: 100.0 }]);

        body["team"] = json!([{ "user": "nobody", "role": "Tester", "allocation": 120 }]);
        let err = new_project(&body, Utc::now()).unwrap_err();
        let fields: Vec<&str> = err.fields().collect();
        assert_eq!(fields, vec!["team[0].user", "team[0].role", "team[0].allocation"]);
    }

    #[test]
    fn end_before_start_cites_end_date() {
        let now = Utc::now();
        let mut body = alpha();
        body["endDate"] = json!("2023-12-31");
        let project = new_project(&body, now).unwrap().into_project(Uuid::new_v4(), now);
        let err = check_project(&project).unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["endDate"]);
    }

    #[test]
    fn patch_stamps_progress_and_ignores_budget() {
        let now = Utc::now();
        let mut project = new_project(&alpha(), now).unwrap().into_project(Uuid::new_v4(), now);
        let patch = project_patch(
            &json!({ "progress": { "percentage": 40 }, "budget": { "allocated": 5 }, "status": "On Hold" }),
            now,
        )
        .unwrap();
        patch.apply(&mut project, now);

        assert_eq!(project.progress.percentage, 40.0);
        assert_eq!(project.progress.last_updated, Some(now));
        assert_eq!(project.status, ProjectStatus::OnHold);
        assert_eq!(project.budget.allocated, 1000.0);
    }

    #[test]
    fn patch_rejects_out_of_range_progress() {
        let err = project_patch(&json!({ "progress": { "percentage": 101 } }), Utc::now()).unwrap_err();
        assert_eq!(err.0[0].message, PROGRESS_MESSAGE);
    }
}
