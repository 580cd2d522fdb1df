// handlers/public/mod.rs - Endpoints reachable without a token
pub mod health;
pub mod index;
pub mod login;

pub use health::health_get;
pub use index::index_get;
pub use login::login_post;
