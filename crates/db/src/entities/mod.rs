//! Entity definitions for the chainvote schema.

pub mod organization;
pub mod submission;
pub mod user;
pub mod user_token;
pub mod vote;
pub mod vote_option;

pub use organization::Entity as Organization;
pub use submission::Entity as Submission;
pub use user::Entity as User;
pub use user_token::Entity as UserToken;
pub use vote::Entity as Vote;
pub use vote_option::Entity as VoteOption;
