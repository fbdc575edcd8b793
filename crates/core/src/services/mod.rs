//! Business logic services.

pub mod auth;
pub mod organization;
pub mod user;
pub mod vote;

pub use auth::{AuthService, Claims, Session};
pub use organization::OrganizationService;
pub use user::UserService;
pub use vote::VoteService;
