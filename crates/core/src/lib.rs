//! Core business logic for chainvote.

pub mod services;

pub use services::*;
