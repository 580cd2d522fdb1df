// handlers/protected/mod.rs - Endpoints behind the access guard
//
// Every route here is wrapped by `middleware::require_auth`, which rejects
// missing, invalid and stale tokens before a handler runs.
pub mod auth;
pub mod budgets;
pub mod projects;
pub mod users;
