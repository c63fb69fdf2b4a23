//! Weather API client for fetching weather data
//!
//! Integrates with the OpenWeatherMap 2.5 API for current conditions and the
//! 3-hourly forecast feed, which is collapsed into daily summaries.

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use shared::{
    aggregate_daily_forecasts, round_half_up, Coordinates, ForecastBundle, WeatherSample,
};

use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};

const FEED_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// Current weather conditions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeather {
    pub location: String,
    /// Degrees Celsius, rounded
    pub temperature: f64,
    pub humidity: f64,
    pub description: String,
    pub icon: String,
    pub wind_speed: f64,
    pub pressure: f64,
    /// Kilometres, absent when the provider does not report it
    pub visibility: Option<f64>,
    pub coordinates: Coordinates,
}

/// OpenWeatherMap API response for current weather
#[derive(Debug, Deserialize)]
struct OWMCurrentResponse {
    #[serde(default)]
    name: String,
    main: OWMMain,
    #[serde(default)]
    weather: Vec<OWMWeather>,
    wind: Option<OWMWind>,
    visibility: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OWMMain {
    temp: f64,
    humidity: f64,
    #[serde(default)]
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OWMWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OWMWind {
    speed: Option<f64>,
}

/// Precipitation volume over the last three hours
#[derive(Debug, Deserialize)]
struct OWMVolume {
    #[serde(rename = "3h")]
    three_hour: Option<f64>,
}

/// OpenWeatherMap API response for forecast
#[derive(Debug, Deserialize)]
struct OWMForecastResponse {
    city: OWMCity,
    #[serde(default)]
    list: Vec<OWMForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OWMCity {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct OWMForecastItem {
    #[serde(default)]
    dt: i64,
    dt_txt: Option<String>,
    main: OWMMain,
    #[serde(default)]
    weather: Vec<OWMWeather>,
    wind: Option<OWMWind>,
    rain: Option<OWMVolume>,
    snow: Option<OWMVolume>,
}

impl WeatherClient {
    /// Create a new WeatherClient with the configured endpoint and timeout
    pub fn new(config: &WeatherConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.api_endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch current weather conditions by GPS coordinates
    pub async fn get_current_weather(&self, coordinates: Coordinates) -> AppResult<CurrentWeather> {
        let data: OWMCurrentResponse = self.fetch("weather", coordinates).await?;
        Ok(convert_current_response(data, coordinates))
    }

    /// Fetch the short-range forecast by GPS coordinates, aggregated per day
    pub async fn get_forecast(&self, coordinates: Coordinates) -> AppResult<ForecastBundle> {
        let data: OWMForecastResponse = self.fetch("forecast", coordinates).await?;
        Ok(convert_forecast_response(data, coordinates))
    }

    async fn fetch<T: DeserializeOwned>(&self, resource: &str, coordinates: Coordinates) -> AppResult<T> {
        let url = format!(
            "{}/{}?lat={}&lon={}&appid={}&units=metric",
            self.base_url, resource, coordinates.lat, coordinates.lng, self.api_key
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::WeatherService(format!("Weather API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::WeatherService(format!(
                "Weather API error: {} - {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::WeatherService(format!("Failed to parse weather response: {}", e)))
    }
}

/// Convert OpenWeatherMap current response to our format
fn convert_current_response(data: OWMCurrentResponse, coordinates: Coordinates) -> CurrentWeather {
    let weather = data.weather.first();

    CurrentWeather {
        location: data.name,
        temperature: round_half_up(data.main.temp),
        humidity: data.main.humidity,
        description: weather.map(|w| w.description.clone()).unwrap_or_default(),
        icon: weather.map(|w| w.icon.clone()).unwrap_or_default(),
        wind_speed: data.wind.and_then(|w| w.speed).unwrap_or(0.0),
        pressure: data.main.pressure,
        visibility: data.visibility.map(|meters| meters / 1000.0),
        coordinates,
    }
}

/// Convert OpenWeatherMap forecast response to a daily forecast bundle
fn convert_forecast_response(data: OWMForecastResponse, coordinates: Coordinates) -> ForecastBundle {
    let samples: Vec<WeatherSample> = data.list.into_iter().filter_map(to_sample).collect();

    ForecastBundle {
        location: data.city.name,
        coordinates: Some(coordinates),
        forecast: aggregate_daily_forecasts(&samples),
    }
}

fn to_sample(item: OWMForecastItem) -> Option<WeatherSample> {
    let timestamp = item
        .dt_txt
        .as_deref()
        .and_then(|text| NaiveDateTime::parse_from_str(text, FEED_TIMESTAMP_FORMAT).ok())
        .or_else(|| DateTime::from_timestamp(item.dt, 0).map(|dt| dt.naive_utc()));

    let Some(timestamp) = timestamp else {
        tracing::warn!(dt = item.dt, "Skipping forecast sample without a usable timestamp");
        return None;
    };

    let weather = item.weather.into_iter().next();

    Some(WeatherSample {
        timestamp,
        temperature_celsius: item.main.temp,
        humidity_percent: item.main.humidity,
        rain_mm: item.rain.and_then(|r| r.three_hour),
        snow_mm: item.snow.and_then(|s| s.three_hour),
        description: weather.as_ref().map(|w| w.description.clone()).unwrap_or_default(),
        icon: weather.map(|w| w.icon).unwrap_or_default(),
        wind_speed_mps: item.wind.and_then(|w| w.speed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn nairobi() -> Coordinates {
        Coordinates::new(Decimal::new(-12921, 4), Decimal::new(368219, 4))
    }

    #[test]
    fn test_convert_current_response() {
        let data: OWMCurrentResponse = serde_json::from_str(
            r#"{
                "name": "Nairobi",
                "main": {"temp": 22.5, "humidity": 64, "pressure": 1018},
                "weather": [{"main": "Clouds", "description": "broken clouds", "icon": "04d"}],
                "visibility": 9000
            }"#,
        )
        .unwrap();

        let current = convert_current_response(data, nairobi());
        assert_eq!(current.location, "Nairobi");
        assert_eq!(current.temperature, 23.0);
        assert_eq!(current.wind_speed, 0.0);
        assert_eq!(current.visibility, Some(9.0));
        assert_eq!(current.description, "broken clouds");
    }

    #[test]
    fn test_convert_forecast_response() {
        let data: OWMForecastResponse = serde_json::from_str(
            r#"{
                "city": {"name": "Nairobi", "coord": {"lat": -1.2921, "lon": 36.8219}},
                "list": [
                    {"dt": 1725008400, "dt_txt": "2024-08-30 09:00:00",
                     "main": {"temp": 19.2, "humidity": 70},
                     "weather": [{"description": "light rain", "icon": "10d"}],
                     "wind": {"speed": 4.1},
                     "rain": {"3h": 1.2}},
                    {"dt": 1725019200, "dt_txt": "2024-08-30 12:00:00",
                     "main": {"temp": 24.8, "humidity": 50},
                     "weather": [{"description": "clear sky", "icon": "01d"}],
                     "snow": {"3h": 0.3}},
                    {"dt": 1725062400, "dt_txt": "2024-08-31 00:00:00",
                     "main": {"temp": 14.1, "humidity": 88},
                     "weather": []}
                ]
            }"#,
        )
        .unwrap();

        let bundle = convert_forecast_response(data, nairobi());
        assert_eq!(bundle.location, "Nairobi");
        assert_eq!(bundle.forecast.len(), 2);

        let first = &bundle.forecast[0];
        assert_eq!(first.max_temp, 25.0);
        assert_eq!(first.min_temp, 19.0);
        assert_eq!(first.avg_humidity, 60.0);
        assert_eq!(first.precipitation, 1.5);
        assert_eq!(first.rain_probability, 30.0);
        assert_eq!(first.description, "light rain");
        assert_eq!(first.wind_speed, 4.1);

        let second = &bundle.forecast[1];
        assert_eq!(second.description, "");
        assert_eq!(second.rain_probability, 10.0);
    }

    #[test]
    fn test_sample_falls_back_to_unix_timestamp() {
        let item: OWMForecastItem = serde_json::from_str(
            r#"{"dt": 1725008400, "main": {"temp": 20.0, "humidity": 50}}"#,
        )
        .unwrap();
        let sample = to_sample(item).unwrap();
        assert_eq!(sample.timestamp.date().to_string(), "2024-08-30");
    }
}
