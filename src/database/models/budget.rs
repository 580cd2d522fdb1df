use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::ServiceCatalog;
use crate::types::{BudgetStatus, BudgetType, UsageUnit};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub value: f64,
    pub unit: UsageUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub id: Uuid,
    pub service: String,
    pub service_icon: String,
    pub service_color: String,
    pub budget_type: BudgetType,
    pub usage: Usage,
    pub period: Period,
    pub monthly_cost: f64,
    pub actual_cost: f64,
    pub project: Uuid,
    pub created_by: Uuid,
    pub notes: Option<String>,
    pub status: BudgetStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Positive when the line item is over budget.
    pub fn variance(&self) -> f64 {
        self.actual_cost - self.monthly_cost
    }

    /// Switch service and re-derive icon and color from the catalog.
    pub fn set_service(&mut self, service: String, catalog: &ServiceCatalog) {
        let style = catalog.lookup(&service);
        self.service = service;
        self.service_icon = style.icon;
        self.service_color = style.color;
    }
}
