pub mod api;
pub mod auth;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod policy;
pub mod routes;
pub mod services;
pub mod state;
pub mod types;
pub mod validation;

pub use routes::app;
pub use state::AppState;
