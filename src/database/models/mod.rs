pub mod budget;
pub mod project;
pub mod user;

pub use budget::{Budget, Period, Usage};
pub use project::{Document, Milestone, Progress, Project, ProjectBudget, Remark, Risk, TeamMember};
pub use user::{User, UserSummary};
