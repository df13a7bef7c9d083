pub use super::routers::Entity as Routers;
pub use super::user_login_history::Entity as UserLoginHistory;
pub use super::user_router_assignments::Entity as UserRouterAssignments;
pub use super::user_sessions::Entity as UserSessions;
pub use super::users::Entity as Users;
