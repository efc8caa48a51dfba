//! ReviewDesk API Gateway
//!
//! The main entry point for all external API requests.
//! Handles:
//! - Identity extraction and authorization context
//! - Rate limiting
//! - Request routing into the workflow engine
//! - Observability (logging, metrics, tracing)

mod handlers;
mod middleware;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use reviewdesk_common::{
    auth, config::AppConfig, db::DbPool, db::Repository, metrics, workflow::WorkflowEngine,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub engine: WorkflowEngine,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;
    let config = Arc::new(config);

    // Initialize tracing
    let filter = EnvFilter::try_new(&config.observability.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if config.observability.json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    info!("Starting ReviewDesk API Gateway v{}", reviewdesk_common::VERSION);

    // Identity token validation
    match config.auth.jwt_secret.as_deref() {
        Some(secret) => auth::init_jwt(secret, config.auth.jwt_expiration_secs),
        None => warn!("No JWT secret configured; authenticated routes will reject all requests"),
    }

    // Initialize metrics
    metrics::register_metrics();
    if config.observability.metrics_port > 0 {
        let metrics_addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        PrometheusBuilder::new()
            .with_http_listener(metrics_addr)
            .set_buckets(metrics::LATENCY_BUCKETS)?
            .install()?;
        info!("Metrics exporter listening on {}", metrics_addr);
    }

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;

    // Build the workflow engine
    let engine = WorkflowEngine::new(Repository::new(db), &config.workflow);

    // Create app state
    let state = AppState {
        config: config.clone(),
        engine,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // API routes
    let api_routes = Router::new()
        // Health endpoints (no auth)
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        // Paper endpoints
        .route("/papers", post(handlers::papers::submit_paper))
        .route("/papers", get(handlers::papers::list_all_papers))
        .route("/papers/mine", get(handlers::papers::list_own_papers))
        .route("/papers/published", get(handlers::papers::list_published_papers))
        .route("/papers/status/{status}", get(handlers::papers::list_papers_by_status))
        .route("/papers/owner/{owner_id}", get(handlers::papers::list_papers_by_owner))
        .route("/papers/editor/{editor_id}", get(handlers::papers::list_papers_for_editor))
        .route(
            "/papers/reviewer/{reviewer_id}",
            get(handlers::papers::list_papers_for_reviewer),
        )
        .route("/papers/{id}", get(handlers::papers::get_paper))
        .route("/papers/{id}", put(handlers::papers::update_paper))
        .route("/papers/{id}", delete(handlers::papers::delete_paper))
        .route("/papers/{id}/status", post(handlers::papers::change_status))
        .route("/papers/{id}/reviewers", post(handlers::papers::assign_reviewer))
        .route(
            "/papers/{id}/reviewers/{reviewer_id}",
            delete(handlers::papers::remove_reviewer),
        )
        .route("/papers/{id}/editor", post(handlers::papers::assign_editor))
        .route("/papers/{id}/revisions", post(handlers::papers::submit_revision))
        .route("/papers/{id}/revisions", get(handlers::papers::list_revisions))
        .route("/papers/{id}/reviews", get(handlers::reviews::list_reviews_for_paper))
        .route(
            "/papers/{id}/reviews/summary",
            get(handlers::reviews::review_summary),
        )
        // Review endpoints
        .route("/reviews/{id}", get(handlers::reviews::get_review))
        .route("/reviews/{id}/start", post(handlers::reviews::start_review))
        .route("/reviews/{id}/submit", post(handlers::reviews::submit_review))
        .route(
            "/reviews/reviewer/{reviewer_id}",
            get(handlers::reviews::list_reviews_by_reviewer),
        )
        // Internal collaborator callbacks
        .route(
            "/internal/plagiarism/{paper_id}",
            post(handlers::internal::plagiarism_callback),
        );

    // Rate limiting
    let rate_limited = if state.config.rate_limit.enabled {
        let limiter = middleware::rate_limit::create_rate_limiter(&state.config.rate_limit);
        api_routes.layer(axum::middleware::from_fn(
            move |request: axum::extract::Request, next: axum::middleware::Next| {
                let limiter = limiter.clone();
                async move {
                    middleware::rate_limit::rate_limit_middleware(request, next, limiter).await
                }
            },
        ))
    } else {
        api_routes
    };

    // Compose the app
    Router::new()
        .nest("/v1", rate_limited)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
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
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
