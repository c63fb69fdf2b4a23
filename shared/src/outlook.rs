//! Rain-driven reservoir level outlook
//!
//! A quick estimate of how the level will move over the forecast window,
//! based on expected rainfall only. Unlike the prediction strategies it does
//! not score scarcity risk.

use serde::{Deserialize, Serialize};

use crate::models::{DailyForecast, Reservoir};

/// Total rain (mm) above which heavy rainfall is expected
pub const HEAVY_RAIN_TOTAL_MM: f64 = 10.0;

/// Mean rain probability above which moderate rain is expected
pub const LIKELY_RAIN_PROBABILITY: f64 = 60.0;

/// Level (percent) below which alternative sources are suggested in dry spells
pub const ALTERNATIVE_SOURCE_LEVEL: f64 = 40.0;

/// Days of forecast echoed back alongside the outlook
pub const OUTLOOK_FORECAST_DAYS: usize = 3;

const DRY_SPELL_CHANGE: f64 = -2.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutlookConfidence {
    Low,
    Medium,
    High,
}

/// Expected movement of a reservoir level
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LevelOutlook {
    pub reservoir_id: u64,
    pub current_level: f64,
    /// Percentage points, negative when the level is expected to fall
    pub expected_change: f64,
    pub confidence: OutlookConfidence,
    pub summary: String,
    pub recommendations: Vec<String>,
}

/// Outlook together with the first days of the forecast it is based on
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReservoirOutlook {
    pub prediction: LevelOutlook,
    pub weather_forecast: Vec<DailyForecast>,
}

/// Estimate how rainfall over `forecast` moves the level of `reservoir`
pub fn level_outlook(reservoir: &Reservoir, forecast: &[DailyForecast]) -> LevelOutlook {
    let total_rain: f64 = forecast.iter().map(|day| day.precipitation).sum();
    let avg_probability = if forecast.is_empty() {
        0.0
    } else {
        forecast.iter().map(|day| day.rain_probability).sum::<f64>() / forecast.len() as f64
    };

    let (expected_change, confidence, summary, recommendations) =
        if total_rain > HEAVY_RAIN_TOTAL_MM {
            let change = (total_rain * 1.5).min(15.0);
            (
                change,
                OutlookConfidence::High,
                format!(
                    "Heavy rainfall expected ({}mm). Water levels likely to increase by {}%.",
                    total_rain, change
                ),
                vec!["Good time to reduce water conservation measures temporarily".to_string()],
            )
        } else if avg_probability > LIKELY_RAIN_PROBABILITY {
            (
                (avg_probability * 0.1).min(8.0),
                OutlookConfidence::Medium,
                "Moderate rain likely. Small increase in water levels expected.".to_string(),
                vec!["Continue current water usage patterns".to_string()],
            )
        } else {
            let mut recommendations = vec!["Implement water conservation measures".to_string()];
            if reservoir.current_level < ALTERNATIVE_SOURCE_LEVEL {
                recommendations.push("Consider alternative water sources".to_string());
            }
            (
                DRY_SPELL_CHANGE,
                OutlookConfidence::High,
                "Dry conditions expected. Water levels will continue to decrease.".to_string(),
                recommendations,
            )
        };

    LevelOutlook {
        reservoir_id: reservoir.id,
        current_level: reservoir.current_level,
        expected_change,
        confidence,
        summary,
        recommendations,
    }
}

/// Build the outlook response for a reservoir
pub fn reservoir_outlook(reservoir: &Reservoir, forecast: &[DailyForecast]) -> ReservoirOutlook {
    ReservoirOutlook {
        prediction: level_outlook(reservoir, forecast),
        weather_forecast: forecast.iter().take(OUTLOOK_FORECAST_DAYS).cloned().collect(),
    }
}
