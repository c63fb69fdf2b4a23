//! Water Oasis - Backend Server
//!
//! Reservoir monitoring and water availability prediction for
//! drought-affected communities.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

pub use config::Config;

use error::AppResult;
use external::NarrativeClient;
use services::{AuthService, ForecastProvider, PredictionService, ReservoirService, WeatherService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub reservoirs: ReservoirService,
    pub auth: AuthService,
    pub weather: WeatherService,
    /// Forecast source for outlooks; the weather service outside of tests
    pub forecasts: Arc<dyn ForecastProvider>,
    pub predictions: PredictionService,
}

impl AppState {
    /// Wire the services from configuration, with the seeded registry
    pub fn from_config(config: Config) -> AppResult<Self> {
        let reservoirs = ReservoirService::seeded();
        let weather = WeatherService::new(&config.weather)?;
        let forecasts: Arc<dyn ForecastProvider> = Arc::new(weather.clone());
        let narrative = Arc::new(NarrativeClient::new(&config.narrative)?);

        if !config.narrative.is_configured() {
            tracing::warn!("Narrative API key not configured; predictions will fail");
        }

        Ok(Self {
            auth: AuthService::new(&config.jwt),
            predictions: PredictionService::new(
                Arc::new(reservoirs.clone()),
                forecasts.clone(),
                narrative,
            ),
            reservoirs,
            weather,
            forecasts,
            config: Arc::new(config),
        })
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Water Oasis API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
