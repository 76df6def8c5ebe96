//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum Router and wire up middleware (tracing, limits, request ID)
//! - Send every request to the route table dispatcher
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::handlers::{self, Handler};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::observability::metrics;
use crate::routing::{PatternError, RouteRequest, RouteTable};
use crate::store::Database;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub database: Arc<Database>,
    pub routes: Arc<RouteTable<Handler>>,
    pub config: Arc<AppConfig>,
}

/// HTTP server for the task API.
pub struct HttpServer {
    router: Router,
    config: Arc<AppConfig>,
}

impl HttpServer {
    /// Create a new HTTP server over an already opened database.
    pub fn new(config: AppConfig, database: Arc<Database>) -> Result<Self, PatternError> {
        let routes = Arc::new(handlers::task_routes()?);
        let config = Arc::new(config);

        tracing::debug!(routes = routes.len(), "Route table compiled");

        let state = AppState {
            database,
            routes,
            config: config.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Serve connections from `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            database = %self.config.storage.database_path.display(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Match the request against the route table and run the first hit.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request.request_id().unwrap_or("unknown").to_string();
    let method = request.method().clone();
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let (handler, template, matched) = match state.routes.resolve(&method, &target) {
        Some((route, matched)) => (
            *route.handler(),
            route.pattern().template().to_string(),
            matched,
        ),
        None => {
            tracing::debug!(request_id = %request_id, method = %method, target = %target, "No route matched");
            metrics::record_request(method.as_str(), "none", 404, start_time);
            return StatusCode::NOT_FOUND.into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        route = %template,
        "Dispatching request"
    );

    let response = handler(state, RouteRequest::new(matched, request)).await;

    metrics::record_request(
        method.as_str(),
        &template,
        response.status().as_u16(),
        start_time,
    );
    response
}
