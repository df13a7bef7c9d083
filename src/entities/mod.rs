pub mod prelude;

pub mod routers;
pub mod user_login_history;
pub mod user_router_assignments;
pub mod user_sessions;
pub mod users;
