//! HTTP handlers for weather endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use shared::{parse_coordinates, ApiResponse, ForecastBundle, ReservoirOutlook};

use crate::error::AppResult;
use crate::external::weather::CurrentWeather;
use crate::services::weather::outlook_for_reservoir;
use crate::AppState;

/// Current weather at the given coordinates
pub async fn get_current_weather(
    State(state): State<AppState>,
    Path((lat, lng)): Path<(String, String)>,
) -> AppResult<Json<ApiResponse<CurrentWeather>>> {
    let coordinates = parse_coordinates(&lat, &lng)?;
    let current = state.weather.get_current_weather(coordinates).await?;
    Ok(Json(ApiResponse::ok(current)))
}

/// Five-day daily forecast at the given coordinates
pub async fn get_forecast(
    State(state): State<AppState>,
    Path((lat, lng)): Path<(String, String)>,
) -> AppResult<Json<ApiResponse<ForecastBundle>>> {
    let coordinates = parse_coordinates(&lat, &lng)?;
    let forecast = state.weather.get_forecast(coordinates).await?;
    Ok(Json(ApiResponse::ok(forecast)))
}

/// Rain-driven level outlook for a reservoir
pub async fn get_reservoir_outlook(
    State(state): State<AppState>,
    Path(reservoir_id): Path<u64>,
) -> AppResult<Json<ApiResponse<ReservoirOutlook>>> {
    let outlook =
        outlook_for_reservoir(&state.reservoirs, state.forecasts.as_ref(), reservoir_id).await?;
    Ok(Json(ApiResponse::ok(outlook)))
}
