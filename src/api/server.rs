use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, Request, header},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};
use uuid::Uuid;

use super::{
    services::{add_link, create_task, download_archive, get_status, health},
    state::AppState,
};
use crate::config::Config;
use crate::observability::Metrics;
use crate::service::TaskService;
use crate::storage::StorageLayout;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Time-ordered request ids for `x-request-id`
#[derive(Clone, Copy, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = HeaderValue::from_str(&Uuid::now_v7().to_string()).ok()?;
        Some(RequestId::new(id))
    }
}

/// Build the application router with all routes and middleware
pub fn router(state: AppState) -> Router {
    let request_timeout = state.config.server.request_timeout();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/api/tasks/create", post(create_task))
        .route("/api/tasks/{id}/add-link", post(add_link))
        .route("/api/tasks/{id}/status", get(get_status))
        .route("/api/archives/{id}/download", get(download_archive))
        .route("/health", get(health))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors)
                .layer(TimeoutLayer::new(request_timeout)),
        )
}

pub async fn run(config: Config) -> Result<(), AnyError> {
    let metrics = Arc::new(Metrics::new());
    let tasks = TaskService::from_config(&config, metrics.clone())
        .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

    let layout = StorageLayout::from_config(&config.storage);
    let cleanup_on_shutdown = config.storage.cleanup_on_shutdown;
    let address = config.server.bind_addr;

    info!(
        files_dir = %layout.files_dir().display(),
        archives_dir = %layout.archives_dir().display(),
        max_open_tasks = config.downloads.max_open_tasks,
        max_in_flight = config.downloads.max_in_flight,
        "Task service ready"
    );

    let app = router(AppState::new(config, tasks, metrics));

    let listener = TcpListener::bind(address).await?;
    info!(%address, "fetchzip API listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");

    // In-flight downloads and archive builds are not drained first
    if cleanup_on_shutdown {
        if let Err(e) = layout.cleanup().await {
            error!(error = %e, "Failed to clean up storage directories");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate())
            .expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
