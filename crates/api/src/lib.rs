//! Triage API Server
//!
//! REST API for the patient triage chat and the health-worker queue.

use axum::{
    extract::State,
    http::{header, Method},
    routing::{get, post},
    Json, Router,
};
use case_queue::{CaseQueue, TierCounts};
use genai_client::{GeminiClient, GenerativeModel};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use severity_classifier::SeverityClassifier;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use triage_engine::TriageEngine;

pub mod config;
mod error;
pub mod rate_limit;
mod routes;
mod sessions;

pub use config::{LogSettings, Settings};
pub use error::ApiError;
pub use sessions::SessionStore;

/// State shared by all handlers
pub type SharedState = Arc<AppState>;

/// Application state shared across handlers
pub struct AppState {
    /// Classification and reply pipeline
    pub engine: Arc<TriageEngine>,
    /// Live patient conversations
    pub sessions: SessionStore,
    /// Health-worker queue
    pub queue: CaseQueue,
    /// Number offered to critical-tier patients
    pub emergency_number: String,
    /// Prometheus handle, when the recorder is installed
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
}

impl AppState {
    /// Create application state
    pub fn new(
        settings: &Settings,
        model: Option<Arc<dyn GenerativeModel>>,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        let engine = TriageEngine::new(
            settings.engine.clone(),
            SeverityClassifier::new(settings.keywords.clone()),
            model,
        );

        Self {
            engine: Arc::new(engine),
            sessions: SessionStore::new(settings.server.max_sessions),
            queue: CaseQueue::new(settings.queue.clone()),
            emergency_number: settings.emergency.number.clone(),
            metrics,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        }
    }
}

/// Build the Gemini model when a key is configured
///
/// Without a usable client the engine serves fallback replies only.
pub fn build_model(settings: &Settings) -> Option<Arc<dyn GenerativeModel>> {
    if settings.gemini.api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; replies will come from the fallback responder");
        return None;
    }

    match GeminiClient::new(settings.gemini.clone()) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!("Gemini client unavailable: {}", e);
            None
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: ComponentStatus,
    pub metrics: SystemMetrics,
}

/// Component status
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub model: ModelHealth,
    pub queue: QueueHealth,
}

#[derive(Debug, Serialize)]
pub struct ModelHealth {
    /// "ok" with a model, "offline" when only fallback replies are served
    pub status: String,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QueueHealth {
    pub status: String,
    pub pending: TierCounts,
}

/// System metrics
#[derive(Debug, Serialize)]
pub struct SystemMetrics {
    pub active_sessions: usize,
    pub queued_cases: usize,
}

/// Create the application router
pub fn create_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/classify", post(routes::classify::classify))
        .route("/api/v1/sessions", post(routes::sessions::create_session))
        .route("/api/v1/sessions/:id", get(routes::sessions::get_session))
        .route("/api/v1/sessions/:id/messages", post(routes::sessions::send_message))
        .route("/api/v1/queue", get(routes::queue::list_cases))
        .route("/api/v1/queue/:id/ack", post(routes::queue::acknowledge_case))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<SharedState>) -> Result<Json<HealthResponse>, ApiError> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let model = match state.engine.model_name() {
        Some(name) => ModelHealth {
            status: "ok".to_string(),
            name: Some(name.to_string()),
        },
        None => ModelHealth {
            status: "offline".to_string(),
            name: None,
        },
    };

    let response = HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        components: ComponentStatus {
            model,
            queue: QueueHealth {
                status: "ok".to_string(),
                pending: state.queue.pending_counts()?,
            },
        },
        metrics: SystemMetrics {
            active_sessions: state.sessions.len().await,
            queued_cases: state.queue.len()?,
        },
    };

    Ok(Json(response))
}

/// Prometheus scrape endpoint
async fn metrics_handler(State(state): State<SharedState>) -> Result<String, ApiError> {
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .ok_or(ApiError::MetricsUnavailable)
}

/// Initialize logging
pub fn init_logging(settings: &LogSettings) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let level = Level::from_str(&settings.level).unwrap_or(Level::INFO);

    if settings.json {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    }
}

/// Install the Prometheus recorder
pub fn init_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Metrics recorder not installed: {}", e);
            None
        }
    }
}

/// Run the server
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let addr = settings.socket_addr()?;
    let model = build_model(&settings);
    let state = Arc::new(AppState::new(&settings, model, init_metrics()));

    let governor = rate_limit::create_governor_config(&settings.rate_limit)
        .ok_or_else(|| anyhow::anyhow!("invalid rate limit configuration"))?;
    let app = create_router(state).layer(GovernorLayer { config: governor });

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
