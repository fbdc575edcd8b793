//! Chainvote server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, routing::get, Json, Router};
use chainvote_api::{middleware::AppState, router as api_router};
use chainvote_common::Config;
use chainvote_core::{AuthService, OrganizationService, UserService, VoteService};
use chainvote_db::repositories::{
    OrganizationRepository, SubmissionRepository, UserRepository, UserTokenRepository,
    VoteOptionRepository, VoteRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Root banner.
async fn banner() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "message": "chainvote API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env is optional; real deployments use environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chainvote=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting chainvote server...");

    // Load configuration; a missing JWT secret fails here, before any socket
    // is bound.
    let config = Config::load()?;

    // Connect to database
    let db = chainvote_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    chainvote_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let user_token_repo = UserTokenRepository::new(Arc::clone(&db));
    let org_repo = OrganizationRepository::new(Arc::clone(&db));
    let vote_repo = VoteRepository::new(Arc::clone(&db));
    let vote_option_repo = VoteOptionRepository::new(Arc::clone(&db));
    let submission_repo = SubmissionRepository::new(Arc::clone(&db));

    // Initialize services
    let auth_service = AuthService::new(user_repo.clone(), config.auth.clone());
    let user_service = UserService::new(
        user_repo.clone(),
        user_token_repo.clone(),
        org_repo.clone(),
    );
    let organization_service = OrganizationService::new(org_repo.clone(), user_repo.clone());
    let vote_service = VoteService::new(
        vote_repo,
        vote_option_repo,
        submission_repo,
        user_repo,
        org_repo,
    );

    let state = AppState {
        auth_service,
        user_service,
        organization_service,
        vote_service,
        environment: config.server.environment.clone(),
    };

    let app = Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            chainvote_api::middleware::error_diagnostics,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            chainvote_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
