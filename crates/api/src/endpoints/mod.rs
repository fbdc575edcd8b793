//! API endpoints.

mod auth;
mod organizations;
mod users;
mod votes;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/organizations", organizations::router())
        .nest("/votes", votes::router())
}
