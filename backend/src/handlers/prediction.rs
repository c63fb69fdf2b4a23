//! HTTP handlers for AI predictions and chat

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use shared::{ApiResponse, ForecastBundle, PredictionResult};

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::services::prediction::ChatReply;
use crate::AppState;

/// Reservoir ID as sent by clients, either a number or numeric text
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ReservoirIdInput {
    Number(u64),
    Text(String),
}

impl ReservoirIdInput {
    /// Positive ID, if the input holds one
    pub fn resolve(&self) -> Option<u64> {
        let id = match self {
            ReservoirIdInput::Number(id) => Some(*id),
            ReservoirIdInput::Text(text) => text.trim().parse().ok(),
        };
        id.filter(|id| *id > 0)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    pub reservoir_id: Option<ReservoirIdInput>,
    /// Forecast supplied by the caller; fetched when absent
    pub weather_data: Option<ForecastBundle>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiHealthResponse {
    pub status: &'static str,
    pub api_key_configured: bool,
    pub base_url: String,
}

/// Generate a water availability prediction
pub async fn predict(
    State(state): State<AppState>,
    AppJson(body): AppJson<PredictRequest>,
) -> AppResult<Json<ApiResponse<PredictionResult>>> {
    let reservoir_id = body.reservoir_id.as_ref().and_then(ReservoirIdInput::resolve);
    let result = state
        .predictions
        .predict(reservoir_id, body.weather_data)
        .await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// Free-form water management chat
pub async fn chat(
    State(state): State<AppState>,
    AppJson(body): AppJson<ChatRequest>,
) -> AppResult<Json<ApiResponse<ChatReply>>> {
    let reply = state
        .predictions
        .chat(&body.message, body.context.as_ref())
        .await?;
    Ok(Json(ApiResponse::ok(reply)))
}

/// Whether the narrative service is configured
pub async fn ai_health(State(state): State<AppState>) -> Json<ApiResponse<AiHealthResponse>> {
    let narrative = &state.config.narrative;
    let configured = narrative.is_configured();

    Json(ApiResponse::ok(AiHealthResponse {
        status: if configured { "ready" } else { "not_configured" },
        api_key_configured: configured,
        base_url: narrative.base_url.clone(),
    }))
}
