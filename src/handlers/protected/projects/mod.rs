pub mod collection;
pub mod record;

pub use collection::get as projects_get;
pub use collection::post as projects_post;
pub use record::delete as project_delete;
pub use record::get as project_get;
pub use record::put as project_put;
