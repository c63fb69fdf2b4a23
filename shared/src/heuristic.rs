//! Rule-based water availability prediction
//!
//! Works from the reservoir level alone and never calls out, so it is always
//! available. It doubles as the parser of last resort for narrative replies
//! that are not well-formed JSON.

use crate::models::{Reservoir, RiskLevel, WaterAssessment};

/// Level (percent) considered critically low
pub const CRITICAL_LEVEL: f64 = 20.0;

/// Assumed draw in percentage points per day
pub const DAILY_CONSUMPTION: f64 = 0.8;

/// Below this level (percent) the risk is high
pub const HIGH_RISK_LEVEL: f64 = 30.0;

/// Below this level (percent) the risk is medium
pub const MEDIUM_RISK_LEVEL: f64 = 60.0;

/// Confidence reported by heuristic predictions
pub const HEURISTIC_CONFIDENCE: u8 = 75;

pub const MAX_RECOMMENDATIONS: usize = 4;

pub const MAX_PREDICTION_CHARS: usize = 200;

pub const DEFAULT_PREDICTION: &str = "AI analysis completed";

pub const BASELINE_RECOMMENDATIONS: [&str; 2] = [
    "Monitor water levels regularly",
    "Implement conservation measures",
];

/// Risk tier for a reservoir level
pub fn risk_level_for(current_level: f64) -> RiskLevel {
    if current_level < HIGH_RISK_LEVEL {
        RiskLevel::High
    } else if current_level < MEDIUM_RISK_LEVEL {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Days until the level reaches [`CRITICAL_LEVEL`], never negative
pub fn days_until_critical(current_level: f64) -> u32 {
    let days = ((current_level - CRITICAL_LEVEL) / DAILY_CONSUMPTION).floor();
    if days.is_nan() || days <= 0.0 {
        0
    } else {
        days.min(u32::MAX as f64) as u32
    }
}

/// Deterministic fallback predictor
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPredictor;

impl HeuristicPredictor {
    pub fn new() -> Self {
        Self
    }

    /// Predict from the reservoir level only
    pub fn predict(&self, reservoir: &Reservoir) -> WaterAssessment {
        self.assess(reservoir, DEFAULT_PREDICTION.to_string(), Vec::new())
    }

    /// Predict from the reservoir level, picking up whatever summary and
    /// recommendations can be read out of a free-text reply.
    ///
    /// A line mentioning "prediction" or "forecast" replaces the summary; a
    /// line mentioning "recommend" adds a recommendation. Matching is
    /// case-insensitive and everything up to the first colon is dropped, so a
    /// matching line without a colon contributes an empty string.
    pub fn predict_from_reply(&self, reply: &str, reservoir: &Reservoir) -> WaterAssessment {
        let mut prediction = DEFAULT_PREDICTION.to_string();
        let mut extracted = Vec::new();

        for line in reply.lines() {
            let lower = line.to_lowercase();
            let cleaned = strip_label(line);

            if lower.contains("prediction") || lower.contains("forecast") {
                prediction = cleaned.to_string();
            }
            if lower.contains("recommend") {
                extracted.push(cleaned.to_string());
            }
        }

        self.assess(reservoir, prediction, extracted)
    }

    fn assess(
        &self,
        reservoir: &Reservoir,
        prediction: String,
        extracted: Vec<String>,
    ) -> WaterAssessment {
        let recommendations = BASELINE_RECOMMENDATIONS
            .iter()
            .map(|r| r.to_string())
            .chain(extracted)
            .take(MAX_RECOMMENDATIONS)
            .collect();

        WaterAssessment {
            prediction: prediction.chars().take(MAX_PREDICTION_CHARS).collect(),
            risk_level: risk_level_for(reservoir.current_level),
            days_until_critical: days_until_critical(reservoir.current_level),
            recommendations,
            confidence: HEURISTIC_CONFIDENCE,
        }
    }
}

/// Text after the first colon, trimmed; empty when there is no colon
fn strip_label(line: &str) -> &str {
    line.split_once(':').map_or("", |(_, rest)| rest.trim())
}
