//! HTTP API layer for chainvote.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: auth, users, organizations, votes
//! - **Extractors**: session and admin-session extraction
//! - **Middleware**: bearer-token authentication, error diagnostics
//! - **Response**: the `{success, message?, data?}` envelope
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
