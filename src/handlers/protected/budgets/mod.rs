pub mod collection;
pub mod record;

pub use collection::get as budgets_get;
pub use collection::post as budgets_post;
pub use record::delete as budget_delete;
pub use record::get as budget_get;
pub use record::put as budget_put;
