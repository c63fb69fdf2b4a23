//! HTTP handlers for the reservoir registry

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{
    ApiResponse, CreateReservoirInput, ListResponse, Reservoir, ReservoirFilter,
    UpdateReservoirInput,
};

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::CurrentUser;
use crate::AppState;

/// List reservoirs, optionally filtered by location, status and minimum level
pub async fn list_reservoirs(
    State(state): State<AppState>,
    Query(filter): Query<ReservoirFilter>,
) -> Json<ListResponse<Reservoir>> {
    Json(ListResponse::new(state.reservoirs.list(&filter).await))
}

/// Get a reservoir by ID
pub async fn get_reservoir(
    State(state): State<AppState>,
    Path(reservoir_id): Path<u64>,
) -> AppResult<Json<ApiResponse<Reservoir>>> {
    let reservoir = state.reservoirs.get_by_id(reservoir_id).await?;
    Ok(Json(ApiResponse::ok(reservoir)))
}

/// Register a reservoir
pub async fn create_reservoir(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppJson(input): AppJson<CreateReservoirInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<Reservoir>>)> {
    let reservoir = state.reservoirs.create(input).await?;
    tracing::debug!(user_id = current_user.0.user_id, reservoir_id = reservoir.id, "Created by user");
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(reservoir))))
}

/// Update a reservoir
pub async fn update_reservoir(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(reservoir_id): Path<u64>,
    AppJson(input): AppJson<UpdateReservoirInput>,
) -> AppResult<Json<ApiResponse<Reservoir>>> {
    let reservoir = state.reservoirs.update(reservoir_id, input).await?;
    tracing::debug!(user_id = current_user.0.user_id, reservoir_id, "Updated by user");
    Ok(Json(ApiResponse::ok(reservoir)))
}

/// Delete a reservoir
pub async fn delete_reservoir(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(reservoir_id): Path<u64>,
) -> AppResult<Json<ApiResponse<Reservoir>>> {
    let reservoir = state.reservoirs.delete(reservoir_id).await?;
    tracing::debug!(user_id = current_user.0.user_id, reservoir_id, "Deleted by user");
    Ok(Json(ApiResponse::with_message(
        reservoir,
        "Reservoir deleted successfully",
    )))
}
