//! Water availability prediction service
//!
//! Resolves the reservoir and its forecast, asks the narrative backend for a
//! prediction and enriches it with forecast statistics. A reply that is not
//! the expected JSON is salvaged by the heuristic predictor; a backend that
//! cannot be reached is an error.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{
    ForecastBundle, HeuristicPredictor, PredictionResult, Reservoir, ValidationError,
    WaterAssessment,
};

use crate::error::{AppError, AppResult};
use crate::external::narrative::{ChatMessage, NarrativeBackend};
use crate::services::reservoir::ReservoirRepository;
use crate::services::weather::ForecastProvider;

pub const PREDICTION_SYSTEM_PROMPT: &str = "\
You are an AI water management expert specializing in drought-affected communities.
Analyze water reservoir data and weather forecasts to provide actionable insights for communities.

Provide responses in JSON format with these fields:
- prediction: string (brief prediction summary)
- riskLevel: string (low/medium/high)
- daysUntilCritical: number (estimated days until water becomes critically low)
- recommendations: array of strings (practical advice for the community)
- confidence: number (0-100, confidence in prediction)";

pub const CHAT_SYSTEM_PROMPT: &str = "\
You are a helpful AI assistant specializing in water management and drought resilience for communities.
Provide practical, actionable advice about water conservation, reservoir management, and community preparedness.
Keep responses concise and focused on actionable insights.";

/// Reply to a free-form chat message
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

/// Prompt for one reservoir and its forecast
pub fn build_user_prompt(reservoir: &Reservoir, forecast: &ForecastBundle) -> String {
    let days: Vec<String> = forecast
        .forecast
        .iter()
        .map(|day| {
            format!(
                "- {}: {}, Rain: {}mm, Temp: {}-{}°C, Humidity: {}%",
                day.date,
                day.description,
                day.precipitation,
                day.min_temp,
                day.max_temp,
                day.avg_humidity
            )
        })
        .collect();

    format!(
        "Analyze this water situation:\n\n\
         RESERVOIR DATA:\n\
         - Name: {}\n\
         - Location: {}\n\
         - Current Level: {}%\n\
         - Capacity: {}%\n\
         - Status: {}\n\
         - Last Updated: {}\n\n\
         WEATHER FORECAST (next 5 days):\n\
         {}\n\n\
         Please provide a water availability prediction and recommendations for this community.",
        reservoir.name,
        reservoir.location,
        reservoir.current_level,
        reservoir.capacity,
        reservoir.status,
        reservoir.last_updated,
        days.join("\n")
    )
}

/// Drop a surrounding Markdown code fence (```json ... ```), if any
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body
        .strip_prefix("json")
        .or_else(|| body.strip_prefix("JSON"))
        .unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse a structured reply; `None` when it is not the expected JSON
pub fn parse_structured_reply(reply: &str) -> Option<WaterAssessment> {
    serde_json::from_str(strip_code_fence(reply)).ok()
}

/// Prediction strategy backed by the remote narrative service
#[derive(Clone)]
pub struct NarrativePredictor {
    backend: Arc<dyn NarrativeBackend>,
    fallback: HeuristicPredictor,
}

impl NarrativePredictor {
    pub fn new(backend: Arc<dyn NarrativeBackend>) -> Self {
        Self {
            backend,
            fallback: HeuristicPredictor::new(),
        }
    }

    /// Ask the backend for a prediction.
    ///
    /// Only a failed call is an error; an unreadable reply degrades to the
    /// heuristic reading of its text.
    pub async fn predict(
        &self,
        reservoir: &Reservoir,
        forecast: &ForecastBundle,
    ) -> AppResult<WaterAssessment> {
        let messages = [
            ChatMessage::system(PREDICTION_SYSTEM_PROMPT),
            ChatMessage::user(build_user_prompt(reservoir, forecast)),
        ];

        let reply = self.backend.complete(&messages).await?;

        match parse_structured_reply(&reply) {
            Some(assessment) => Ok(assessment),
            None => {
                tracing::warn!(
                    reservoir_id = reservoir.id,
                    backend = self.backend.backend_name(),
                    "Narrative reply is not structured JSON, falling back to text extraction"
                );
                Ok(self.fallback.predict_from_reply(&reply, reservoir))
            }
        }
    }
}

/// Prediction service
#[derive(Clone)]
pub struct PredictionService {
    reservoirs: Arc<dyn ReservoirRepository>,
    forecasts: Arc<dyn ForecastProvider>,
    backend: Arc<dyn NarrativeBackend>,
    predictor: NarrativePredictor,
}

impl PredictionService {
    pub fn new(
        reservoirs: Arc<dyn ReservoirRepository>,
        forecasts: Arc<dyn ForecastProvider>,
        backend: Arc<dyn NarrativeBackend>,
    ) -> Self {
        Self {
            reservoirs,
            forecasts,
            predictor: NarrativePredictor::new(backend.clone()),
            backend,
        }
    }

    /// Predict water availability for a reservoir.
    ///
    /// The forecast is fetched by the reservoir's coordinates unless the
    /// caller supplies one. A failed fetch is surfaced as a weather service
    /// error.
    pub async fn predict(
        &self,
        reservoir_id: Option<u64>,
        forecast: Option<ForecastBundle>,
    ) -> AppResult<PredictionResult> {
        let reservoir_id = reservoir_id
            .ok_or(ValidationError::MissingFields("Reservoir ID is required"))?;

        let reservoir = self
            .reservoirs
            .get(reservoir_id)
            .await
            .ok_or(AppError::NotFound("Reservoir"))?;

        let forecast = match forecast {
            Some(forecast) => forecast,
            None => self
                .forecasts
                .forecast(reservoir.coordinates)
                .await
                .map_err(|e| match e {
                    AppError::WeatherService(_) => e,
                    other => AppError::WeatherService(other.to_string()),
                })?,
        };

        let assessment = self.predictor.predict(&reservoir, &forecast).await?;
        let result = PredictionResult::new(reservoir_id, assessment, &forecast);

        tracing::info!(
            reservoir_id,
            risk_level = %result.assessment.risk_level,
            days = forecast.forecast.len(),
            "Prediction generated"
        );

        Ok(result)
    }

    /// Free-form question about water management, with optional context
    pub async fn chat(
        &self,
        message: &str,
        context: Option<&serde_json::Value>,
    ) -> AppResult<ChatReply> {
        if message.trim().is_empty() {
            return Err(ValidationError::MissingFields("Message is required").into());
        }

        let mut messages = vec![ChatMessage::system(CHAT_SYSTEM_PROMPT)];
        if let Some(context) = context.filter(|c| !c.is_null()) {
            messages.push(ChatMessage::system(format!("Additional context: {}", context)));
        }
        messages.push(ChatMessage::user(message));

        let response = self.backend.complete(&messages).await?;

        Ok(ChatReply {
            response,
            timestamp: Utc::now(),
        })
    }
}
