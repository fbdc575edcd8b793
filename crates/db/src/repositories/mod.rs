//! Database repositories.
//!
//! Repository pattern implementations for database access.

pub mod organization;
pub mod submission;
pub mod user;
pub mod user_token;
pub mod vote;

pub use organization::OrganizationRepository;
pub use submission::SubmissionRepository;
pub use user::UserRepository;
pub use user_token::UserTokenRepository;
pub use vote::{VoteOptionRepository, VoteRepository};
