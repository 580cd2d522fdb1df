use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::{Checker, FieldError, Need, ValidationErrors};
use crate::catalog::ServiceCatalog;
use crate::database::models::{Budget, Period, Usage};
use crate::types::{BudgetStatus, BudgetType, UsageUnit};

const SERVICE_MESSAGE: &str = "Service is required";
const TYPE_MESSAGE: &str = "Type is required";
const USAGE_VALUE_MESSAGE: &str = "Valid usage value is required";
const USAGE_UNIT_MESSAGE: &str = "Usage unit is required";
const START_MESSAGE: &str = "Valid start date is required";
const END_MESSAGE: &str = "Valid end date is required";
const MONTHLY_MESSAGE: &str = "Valid monthly cost is required";
const ACTUAL_MESSAGE: &str = "Valid actual cost is required";
const STATUS_MESSAGE: &str = "Invalid status";

#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    pub service: String,
    pub budget_type: BudgetType,
    pub usage: Usage,
    pub period: Period,
    pub monthly_cost: f64,
    pub actual_cost: f64,
    pub project: Uuid,
    pub notes: Option<String>,
    pub status: BudgetStatus,
}

impl NewBudget {
    pub fn into_budget(self, created_by: Uuid, catalog: &ServiceCatalog, now: DateTime<Utc>) -> Budget {
        let style = catalog.lookup(&self.service);
        Budget {
            id: Uuid::new_v4(),
            service: self.service,
            service_icon: style.icon,
            service_color: style.color,
            budget_type: self.budget_type,
            usage: self.usage,
            period: self.period,
            monthly_cost: self.monthly_cost,
            actual_cost: self.actual_cost,
            project: self.project,
            created_by,
            notes: self.notes,
            status: self.status,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Budget update. The owning project and creator never change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetPatch {
    pub service: Option<String>,
    pub budget_type: Option<BudgetType>,
    pub usage_value: Option<f64>,
    pub usage_unit: Option<UsageUnit>,
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
    pub monthly_cost: Option<f64>,
    pub actual_cost: Option<f64>,
    pub notes: Option<String>,
    pub status: Option<BudgetStatus>,
}

impl BudgetPatch {
    pub fn apply(self, budget: &mut Budget, catalog: &ServiceCatalog, now: DateTime<Utc>) {
        if let Some(service) = self.service {
            if service != budget.service {
                budget.set_service(service, catalog);
            }
        }
        if let Some(kind) = self.budget_type {
            budget.budget_type = kind;
        }
        if let Some(value) = self.usage_value {
            budget.usage.value = value;
        }
        if let Some(unit) = self.usage_unit {
            budget.usage.unit = unit;
        }
        if let Some(start) = self.period_start {
            budget.period.start = start;
        }
        if let Some(end) = self.period_end {
            budget.period.end = end;
        }
        if let Some(cost) = self.monthly_cost {
            budget.monthly_cost = cost;
        }
        if let Some(cost) = self.actual_cost {
            budget.actual_cost = cost;
        }
        if let Some(notes) = self.notes {
            budget.notes = Some(notes);
        }
        if let Some(status) = self.status {
            budget.status = status;
        }
        budget.updated_at = now;
    }
}

fn service(c: &mut Checker<'_>, need: Need, catalog: &ServiceCatalog) -> Option<String> {
    let name = c.text("service", need, SERVICE_MESSAGE)?;
    if catalog.contains(&name) {
        Some(name)
    } else {
        c.fail("service", SERVICE_MESSAGE);
        None
    }
}

pub fn new_budget(body: &Value, catalog: &ServiceCatalog) -> Result<NewBudget, ValidationErrors> {
    let mut c = Checker::new(body);
    let service = service(&mut c, Need::Required, catalog);
    let budget_type = c.choice("type", Need::Required, TYPE_MESSAGE);
    let usage_value = c.number("usage.value", Need::Required, Some(0.0), None, USAGE_VALUE_MESSAGE);
    let usage_unit = c.choice("usage.unit", Need::Required, USAGE_UNIT_MESSAGE);
    let start = c.date("period.start", Need::Required, START_MESSAGE);
    let end = c.date("period.end", Need::Required, END_MESSAGE);
    let monthly_cost = c.number("monthlyCost", Need::Required, Some(0.0), None, MONTHLY_MESSAGE);
    let actual_cost = c.number("actualCost", Need::Required, Some(0.0), None, ACTUAL_MESSAGE);
    let project = c.id("project", Need::Required, "Valid project ID is required");
    let notes = c.free_text("notes", "Notes must be text");
    let status = c.choice("status", Need::Optional, STATUS_MESSAGE);

    let (
        Some(service),
        Some(budget_type),
        Some(value),
        Some(unit),
        Some(start),
        Some(end),
        Some(monthly_cost),
        Some(actual_cost),
        Some(project),
    ) = (service, budget_type, usage_value, usage_unit, start, end, monthly_cost, actual_cost, project)
    else {
        return Err(c.reject());
    };

    c.finish(NewBudget {
        service,
        budget_type,
        usage: Usage { value, unit },
        period: Period { start, end },
        monthly_cost,
        actual_cost,
        project,
        notes,
        status: status.unwrap_or(BudgetStatus::Active),
    })
}

/// `project` and `createdBy` in the body are ignored.
pub fn budget_patch(body: &Value, catalog: &ServiceCatalog) -> Result<BudgetPatch, ValidationErrors> {
    let mut c = Checker::new(body);
    let patch = BudgetPatch {
        service: service(&mut c, Need::Optional, catalog),
        budget_type: c.choice("type", Need::Optional, TYPE_MESSAGE),
        usage_value: c.number("usage.value", Need::Optional, Some(0.0), None, USAGE_VALUE_MESSAGE),
        usage_unit: c.choice("usage.unit", Need::Optional, USAGE_UNIT_MESSAGE),
        period_start: c.date("period.start", Need::Optional, START_MESSAGE),
        period_end: c.date("period.end", Need::Optional, END_MESSAGE),
        monthly_cost: c.number("monthlyCost", Need::Optional, Some(0.0), None, MONTHLY_MESSAGE),
        actual_cost: c.number("actualCost", Need::Optional, Some(0.0), None, ACTUAL_MESSAGE),
        notes: c.free_text("notes", "Notes must be text"),
        status: c.choice("status", Need::Optional, STATUS_MESSAGE),
    };
    c.finish(patch)
}

pub fn check_budget(budget: &Budget) -> Result<(), ValidationErrors> {
    if budget.period.start > budget.period.end {
        return Err(ValidationErrors(vec![FieldError::new(
            "period.end",
            "End date must be after start date",
        )]));
    }
    Ok(())
}
