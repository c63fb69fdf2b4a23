//! WebAssembly module for the Water Oasis platform
//!
//! Provides client-side computation for:
//! - Reservoir status classification
//! - Offline heuristic predictions
//! - Forecast summaries and level outlooks
//! - Form validation

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::{level_outlook, HeuristicPredictor};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&"Water Oasis WASM module loaded".into());
}

fn parse_json<T: serde::de::DeserializeOwned>(json: &str, what: &str) -> Result<T, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("Invalid {} JSON: {}", what, e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Classify a reservoir by its fill level
#[wasm_bindgen]
pub fn classify_reservoir_status(current_level: f64) -> String {
    ReservoirStatus::from_level(current_level).to_string()
}

/// Days until a reservoir at `current_level` reaches the critical level
#[wasm_bindgen]
pub fn days_until_critical(current_level: f64) -> u32 {
    shared::days_until_critical(current_level)
}

/// Heuristic prediction for a reservoir, returned as JSON
#[wasm_bindgen]
pub fn predict_offline(reservoir_json: &str) -> Result<String, JsValue> {
    let reservoir: Reservoir = parse_json(reservoir_json, "reservoir")?;
    to_json(&HeuristicPredictor::new().predict(&reservoir))
}

/// Weather summary for a forecast bundle, `null` when it has no days
#[wasm_bindgen]
pub fn summarize_forecast(forecast_json: &str) -> Result<String, JsValue> {
    let bundle: ForecastBundle = parse_json(forecast_json, "forecast")?;
    to_json(&WeatherSummary::from_forecast(&bundle))
}

/// Rain-driven level outlook for a reservoir, returned as JSON
#[wasm_bindgen]
pub fn reservoir_level_outlook(reservoir_json: &str, forecast_json: &str) -> Result<String, JsValue> {
    let reservoir: Reservoir = parse_json(reservoir_json, "reservoir")?;
    let bundle: ForecastBundle = parse_json(forecast_json, "forecast")?;
    to_json(&level_outlook(&reservoir, &bundle.forecast))
}

/// Validate an email address format
#[wasm_bindgen]
pub fn is_valid_email(email: &str) -> bool {
    validate_email(email).is_ok()
}

/// Validate a coordinate pair entered as text
#[wasm_bindgen]
pub fn is_valid_coordinates(lat: &str, lng: &str) -> bool {
    parse_coordinates(lat, lng).is_ok()
}
