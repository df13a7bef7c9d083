pub mod assignment;
pub mod login_history;
pub mod router;
pub mod session;
pub mod user;
