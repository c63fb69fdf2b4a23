//! Route definitions for the Water Oasis server

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public, except the current-user endpoints)
        .nest("/auth", auth_routes(state.clone()))
        // Reservoir registry (reads public, writes protected)
        .nest("/reservoirs", reservoir_routes(state))
        // Weather routes (public)
        .nest("/weather", weather_routes())
        // Prediction routes (public)
        .nest("/ai", ai_routes())
}

/// Authentication routes
fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(handlers::me))
        .route("/refresh", post(handlers::refresh))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/demo-login", post(handlers::demo_login))
        .merge(protected)
}

/// Reservoir routes
fn reservoir_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(handlers::create_reservoir))
        .route(
            "/:reservoir_id",
            put(handlers::update_reservoir).delete(handlers::delete_reservoir),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/", get(handlers::list_reservoirs))
        .route("/:reservoir_id", get(handlers::get_reservoir))
        .merge(protected)
}

/// Weather routes
fn weather_routes() -> Router<AppState> {
    Router::new()
        .route("/current/:lat/:lng", get(handlers::get_current_weather))
        .route("/forecast/:lat/:lng", get(handlers::get_forecast))
        .route("/prediction/:reservoir_id", get(handlers::get_reservoir_outlook))
}

/// AI prediction routes
fn ai_routes() -> Router<AppState> {
    Router::new()
        .route("/predict", post(handlers::predict))
        .route("/chat", post(handlers::chat))
        .route("/health", get(handlers::ai_health))
}
