//! Arcana server entry point.

use std::sync::Arc;

use axum::{middleware, Router};
use arcana_api::{middleware::AppState, router as api_router};
use arcana_common::Config;
use arcana_core::{
    CommentService, EmailService, FavouriteService, ModerationService, NotificationService,
    PostService, PrivacyPolicyService, RatingService, UserService, UserStoryService,
};
use arcana_db::repositories::{
    CommentRepository, FavouriteRepository, NotificationRepository, PostRatingRepository,
    PostRepository, PrivacyPolicyRepository, UserRepository, UserStoryRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
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

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arcana=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting arcana server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = arcana_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    arcana_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let rating_repo = PostRatingRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let favourite_repo = FavouriteRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let story_repo = UserStoryRepository::new(Arc::clone(&db));
    let policy_repo = PrivacyPolicyRepository::new(Arc::clone(&db));

    // Initialize services
    let email_service = match EmailService::new(&config.email, &config.server.frontend_url) {
        Ok(service) => {
            if service.is_enabled() {
                info!("Email delivery enabled");
            }
            service
        }
        Err(e) => {
            warn!(error = %e, "Email transport setup failed, continuing without email");
            EmailService::disabled(&config.server.frontend_url)
        }
    };

    let notification_service = NotificationService::new(notification_repo);
    let story_service = UserStoryService::new(story_repo);
    let rating_service = RatingService::new(rating_repo, post_repo.clone(), user_repo.clone());
    let user_service = UserService::new(user_repo.clone(), email_service.clone());
    let post_service = PostService::new(
        post_repo.clone(),
        user_repo.clone(),
        favourite_repo.clone(),
        notification_service.clone(),
        rating_service.clone(),
    );
    let comment_service = CommentService::new(
        comment_repo,
        post_repo.clone(),
        notification_service.clone(),
    );
    let favourite_service = FavouriteService::new(
        favourite_repo,
        user_repo.clone(),
        notification_service.clone(),
        story_service.clone(),
        email_service.clone(),
    );
    let policy_service = PrivacyPolicyService::new(policy_repo);
    let moderation_service = ModerationService::new(user_repo, post_repo, rating_service.clone());

    // Create app state
    let state = AppState {
        user_service,
        post_service,
        rating_service,
        comment_service,
        favourite_service,
        notification_service,
        story_service,
        policy_service,
        moderation_service,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            arcana_api::middleware::auth_middleware,
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
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
