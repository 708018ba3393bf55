pub mod commute_routes;
pub mod config;
pub mod dashboard_routes;
pub mod interaction_routes;
pub mod request_id;
pub mod search_routes;
pub mod security_headers;


use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    Json, Router,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use dashboard_core::{
    BusArrivalProvider, DashboardError, PlaceSearchProvider, RoutingProvider,
    SubwayScheduleProvider, WeatherProvider,
};
use kakao_client::{KakaoLocalClient, KakaoMobilityClient};
use openweather_client::OpenWeatherClient;
use serde::Serialize;
use tago_client::{TagoBusClient, TagoSubwayClient};
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

pub use config::AppConfig;

/// Whole-request ceiling; individual upstream clients time out sooner.
const REQUEST_TIMEOUT_SECS: u64 = 20;

/// Wall-clock source, replaceable in tests
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub weather: Arc<dyn WeatherProvider>,
    pub routing: Arc<dyn RoutingProvider>,
    pub places: Arc<dyn PlaceSearchProvider>,
    pub bus: Arc<dyn BusArrivalProvider>,
    pub subway: Arc<dyn SubwayScheduleProvider>,
    pub last_interaction: Arc<RwLock<Option<DateTime<Utc>>>>,
    pub clock: Clock,
}

impl AppState {
    /// Wire the production clients from configuration
    pub fn from_config(config: AppConfig) -> Self {
        let weather = OpenWeatherClient::new(config.owm_api_key.clone());
        let routing = KakaoMobilityClient::new(config.kakao_api_key.clone());
        let places = KakaoLocalClient::new(config.kakao_api_key.clone());
        let bus = TagoBusClient::new(config.tago_service_key.clone())
            .with_route_cache_capacity(config.route_cache_capacity);
        let subway = TagoSubwayClient::new(config.tago_service_key.clone());

        Self {
            config: Arc::new(config),
            weather: Arc::new(weather),
            routing: Arc::new(routing),
            places: Arc::new(places),
            bus: Arc::new(bus),
            subway: Arc::new(subway),
            last_interaction: Arc::new(RwLock::new(None)),
            clock: Arc::new(Utc::now),
        }
    }

    /// Current time in the configured timezone
    pub fn local_now(&self) -> DateTime<Tz> {
        (self.clock)().with_timezone(&self.config.tz)
    }
}

/// Standard JSON envelope for every API response
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Handler error: an anyhow error plus the status it should be reported with.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn with_status(status: StatusCode, error: anyhow::Error) -> Self {
        Self { status, error }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, anyhow::anyhow!(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("Request failed ({}): {:#}", self.status, self.error);
        } else {
            tracing::debug!("Request rejected ({}): {:#}", self.status, self.error);
        }
        let body = Json(ApiResponse::<()>::error(self.error.to_string()));
        (self.status, body).into_response()
    }
}

/// Map an upstream failure to a status code.
pub fn upstream_err(context: &str, e: DashboardError) -> AppError {
    let status = match e {
        DashboardError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        DashboardError::NotFound(_) => StatusCode::NOT_FOUND,
        DashboardError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
        DashboardError::Api(_) | DashboardError::Parse(_) => StatusCode::BAD_GATEWAY,
    };
    AppError::with_status(status, anyhow::anyhow!("{context}: {e}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(dashboard_routes::dashboard_routes())
        .merge(commute_routes::commute_routes())
        .merge(search_routes::search_routes())
        .merge(interaction_routes::interaction_routes())
        .layer(middleware::from_fn(security_headers::security_headers_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize tracing; JSON output when `RUST_LOG_FORMAT=json`.
pub fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let bind_addr = config.bind_addr.clone();
    tracing::info!("Starting dashboard server (tz: {}, home: {:?})", config.tz, config.home);

    let app = build_router(AppState::from_config(config));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
