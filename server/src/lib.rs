use std::{sync::Arc, time::Duration};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use uuid::Uuid;

pub mod affiliation;
pub mod config;
pub mod error;
pub mod executor;
pub mod handlers;
pub mod session;
pub mod telemetry;

use affiliation::{AffiliationVerifier, HttpAffiliationVerifier};
use config::{ServerConfig, Timeouts};
use error::StartupError;
use executor::{MySqlExecutor, SearchExecutor};
use handlers::{readyz, search_group_todo_list, search_todo_list};
use session::{RedisSessionStore, SessionResolver};

/// Collaborators shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionResolver>,
    pub affiliation: Arc<dyn AffiliationVerifier>,
    pub executor: Arc<dyn SearchExecutor>,
    pub timeouts: Timeouts,
}

impl AppState {
    /// Connect the production collaborators: Redis, the user service, MySQL.
    pub async fn connect(config: &ServerConfig) -> Result<Self, StartupError> {
        let sessions = RedisSessionStore::connect(&config.redis_url).await?;
        let affiliation = HttpAffiliationVerifier::new(&config.user_service_url, &config.timeouts)?;
        let executor = MySqlExecutor::connect(&config.database).await?;
        Ok(Self {
            sessions: Arc::new(sessions),
            affiliation: Arc::new(affiliation),
            executor: Arc::new(executor),
            timeouts: config.timeouts.clone(),
        })
    }
}

/// Headroom between the handler's own search deadline and the router backstop.
const BACKSTOP_GRACE: Duration = Duration::from_secs(5);

pub fn app(state: AppState) -> Router {
    let backstop = state.timeouts.request + BACKSTOP_GRACE;
    Router::new()
        .route("/todo-list/search", get(search_todo_list))
        .route("/groups/{group_id}/todo-list/search", get(search_group_todo_list))
        .route("/readyz", get(readyz))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::INTERNAL_SERVER_ERROR,
            backstop,
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %Uuid::new_v4(),
                )
            }),
        )
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
