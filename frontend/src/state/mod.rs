pub mod auth;
pub mod session;

pub use auth::{nav_items, NavItem, NavState};
pub use session::{provide_session, use_session, AppSession};
