//! Water availability prediction models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::ForecastBundle;
use crate::types::round_half_up;

/// Days with less precipitation than this (mm) count as dry
pub const DRY_DAY_THRESHOLD_MM: f64 = 1.0;

/// Three-tier water scarcity urgency
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[serde(alias = "Low", alias = "LOW")]
    Low,
    #[serde(alias = "Medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "High", alias = "HIGH")]
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// Outcome of either prediction strategy, before enrichment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WaterAssessment {
    pub prediction: String,
    pub risk_level: RiskLevel,
    #[serde(deserialize_with = "days_from_number")]
    pub days_until_critical: u32,
    pub recommendations: Vec<String>,
    /// 0-100
    #[serde(deserialize_with = "confidence_from_number")]
    pub confidence: u8,
}

/// Any JSON number, rounded and floored at zero
fn days_from_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = f64::deserialize(deserializer)?;
    Ok(round_half_up(value).clamp(0.0, u32::MAX as f64) as u32)
}

/// Any JSON number, rounded and clamped to 0-100
fn confidence_from_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = f64::deserialize(deserializer)?;
    Ok(round_half_up(value).clamp(0.0, 100.0) as u8)
}

/// Statistics over the forecast window attached to a prediction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSummary {
    pub total_rain_expected: f64,
    pub avg_temperature: i64,
    pub dry_days: usize,
}

impl WeatherSummary {
    /// Summarize a forecast; `None` when it holds no days
    pub fn from_forecast(forecast: &ForecastBundle) -> Option<Self> {
        if forecast.is_empty() {
            return None;
        }

        let days = forecast.forecast.len() as f64;
        let mean_temp = forecast
            .forecast
            .iter()
            .map(|day| day.mean_temp())
            .sum::<f64>()
            / days;

        Some(Self {
            total_rain_expected: forecast.total_precipitation(),
            avg_temperature: round_half_up(mean_temp) as i64,
            dry_days: forecast
                .forecast
                .iter()
                .filter(|day| day.precipitation < DRY_DAY_THRESHOLD_MM)
                .count(),
        })
    }
}

/// Prediction returned to callers of the prediction endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub reservoir_id: u64,
    #[serde(flatten)]
    pub assessment: WaterAssessment,
    pub generated_at: DateTime<Utc>,
    pub weather_summary: Option<WeatherSummary>,
}

impl PredictionResult {
    pub fn new(reservoir_id: u64, assessment: WaterAssessment, forecast: &ForecastBundle) -> Self {
        Self {
            reservoir_id,
            assessment,
            generated_at: Utc::now(),
            weather_summary: WeatherSummary::from_forecast(forecast),
        }
    }
}
