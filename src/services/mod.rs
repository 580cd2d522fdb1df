pub mod auth_service;
pub mod bootstrap;
pub mod budget_service;
pub mod project_service;
pub mod user_service;
