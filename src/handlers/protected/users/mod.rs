pub mod collection;
pub mod password;
pub mod record;

pub use collection::get as users_get;
pub use collection::post as users_post;
pub use password::put as password_put;
pub use record::delete as user_delete;
pub use record::get as user_get;
pub use record::put as user_put;
