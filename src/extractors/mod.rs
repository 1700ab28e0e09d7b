pub mod body;
pub mod session;

pub use body::JsonBody;
pub use session::CurrentUser;
