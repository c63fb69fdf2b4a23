//! Weather service: forecasts, current conditions and the rain-driven outlook

use async_trait::async_trait;
use shared::{reservoir_outlook, Coordinates, ForecastBundle, ReservoirOutlook};

use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};
use crate::external::weather::{CurrentWeather, WeatherClient};
use crate::services::reservoir::ReservoirRepository;

/// Source of short-range forecasts
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Daily forecast for the coordinates, at most five days
    async fn forecast(&self, coordinates: Coordinates) -> AppResult<ForecastBundle>;
}

/// Weather service for fetching weather data
#[derive(Clone)]
pub struct WeatherService {
    weather_client: Option<WeatherClient>,
}

impl WeatherService {
    /// Create a new WeatherService; without an API key every call fails with
    /// a configuration error
    pub fn new(config: &WeatherConfig) -> AppResult<Self> {
        let weather_client = if config.is_configured() {
            Some(WeatherClient::new(config)?)
        } else {
            tracing::warn!("Weather API key not configured");
            None
        };

        Ok(Self { weather_client })
    }

    fn client(&self) -> AppResult<&WeatherClient> {
        self.weather_client
            .as_ref()
            .ok_or_else(|| AppError::Configuration("Weather API key not configured".to_string()))
    }

    /// Current weather at the coordinates
    pub async fn get_current_weather(&self, coordinates: Coordinates) -> AppResult<CurrentWeather> {
        self.client()?.get_current_weather(coordinates).await
    }

    /// Daily forecast at the coordinates
    pub async fn get_forecast(&self, coordinates: Coordinates) -> AppResult<ForecastBundle> {
        let bundle = self.client()?.get_forecast(coordinates).await?;
        tracing::debug!(
            location = %bundle.location,
            days = bundle.forecast.len(),
            "Forecast fetched"
        );
        Ok(bundle)
    }
}

#[async_trait]
impl ForecastProvider for WeatherService {
    async fn forecast(&self, coordinates: Coordinates) -> AppResult<ForecastBundle> {
        self.get_forecast(coordinates).await
    }
}

/// Rain-driven level outlook for a registered reservoir
pub async fn outlook_for_reservoir(
    reservoirs: &dyn ReservoirRepository,
    forecasts: &dyn ForecastProvider,
    reservoir_id: u64,
) -> AppResult<ReservoirOutlook> {
    let reservoir = reservoirs
        .get(reservoir_id)
        .await
        .ok_or(AppError::NotFound("Reservoir"))?;

    let bundle = forecasts.forecast(reservoir.coordinates).await?;
    let outlook = reservoir_outlook(&reservoir, &bundle.forecast);

    tracing::info!(
        reservoir_id,
        expected_change = outlook.prediction.expected_change,
        days = bundle.forecast.len(),
        "Level outlook generated"
    );

    Ok(outlook)
}
