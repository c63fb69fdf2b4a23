//! Weather forecast models and daily aggregation

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::types::{round_half_up, round_to_cents, Coordinates};

/// Maximum number of days kept in a forecast bundle
pub const MAX_FORECAST_DAYS: usize = 5;

/// Rain probability reported for a day with no precipitation
pub const DRY_DAY_RAIN_PROBABILITY: f64 = 10.0;

/// Upper bound of the rain probability estimate
pub const MAX_RAIN_PROBABILITY: f64 = 90.0;

/// Probability points added per millimetre of precipitation
const RAIN_PROBABILITY_PER_MM: f64 = 20.0;

/// One timestamped sample from the upstream forecast feed (typically 3-hourly)
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSample {
    pub timestamp: NaiveDateTime,
    pub temperature_celsius: f64,
    pub humidity_percent: f64,
    pub rain_mm: Option<f64>,
    pub snow_mm: Option<f64>,
    pub description: String,
    pub icon: String,
    pub wind_speed_mps: Option<f64>,
}

impl WeatherSample {
    /// Rain and snow falling during the sample window
    pub fn precipitation_mm(&self) -> f64 {
        self.rain_mm.unwrap_or(0.0) + self.snow_mm.unwrap_or(0.0)
    }
}

/// Aggregated weather for one calendar day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub max_temp: f64,
    pub min_temp: f64,
    pub avg_humidity: f64,
    /// Millimetres, rounded to two decimals
    pub precipitation: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub wind_speed: f64,
    /// Coarse 10-90 estimate, not a calibrated probability
    #[serde(default = "default_rain_probability")]
    pub rain_probability: f64,
}

fn default_rain_probability() -> f64 {
    DRY_DAY_RAIN_PROBABILITY
}

impl DailyForecast {
    /// Midpoint of the day's temperature range
    pub fn mean_temp(&self) -> f64 {
        (self.max_temp + self.min_temp) / 2.0
    }
}

/// Short-range forecast for one location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForecastBundle {
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    /// Days in first-seen order, at most [`MAX_FORECAST_DAYS`]
    #[serde(default)]
    pub forecast: Vec<DailyForecast>,
}

impl ForecastBundle {
    pub fn is_empty(&self) -> bool {
        self.forecast.is_empty()
    }

    /// Total precipitation over the whole window
    pub fn total_precipitation(&self) -> f64 {
        self.forecast.iter().map(|day| day.precipitation).sum()
    }
}

/// Rain probability estimate for a day with the given precipitation total
pub fn rain_probability(precipitation_mm: f64) -> f64 {
    if precipitation_mm > 0.0 {
        (precipitation_mm * RAIN_PROBABILITY_PER_MM)
            .clamp(DRY_DAY_RAIN_PROBABILITY, MAX_RAIN_PROBABILITY)
    } else {
        DRY_DAY_RAIN_PROBABILITY
    }
}

/// Samples collected for one date while aggregating
struct DayAccumulator<'a> {
    date: NaiveDate,
    first: &'a WeatherSample,
    temperatures: Vec<f64>,
    humidity: Vec<f64>,
    precipitation: f64,
}

impl<'a> DayAccumulator<'a> {
    fn new(first: &'a WeatherSample) -> Self {
        Self {
            date: first.timestamp.date(),
            first,
            temperatures: Vec::new(),
            humidity: Vec::new(),
            precipitation: 0.0,
        }
    }

    fn push(&mut self, sample: &WeatherSample) {
        self.temperatures.push(sample.temperature_celsius);
        self.humidity.push(sample.humidity_percent);
        self.precipitation += sample.precipitation_mm();
    }

    fn finish(self) -> DailyForecast {
        let max_temp = self
            .temperatures
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let min_temp = self
            .temperatures
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        let avg_humidity = self.humidity.iter().sum::<f64>() / self.humidity.len() as f64;

        DailyForecast {
            date: self.date,
            max_temp: round_half_up(max_temp),
            min_temp: round_half_up(min_temp),
            avg_humidity: round_half_up(avg_humidity),
            precipitation: round_to_cents(self.precipitation),
            description: self.first.description.clone(),
            icon: self.first.icon.clone(),
            wind_speed: self.first.wind_speed_mps.unwrap_or(0.0),
            rain_probability: rain_probability(self.precipitation),
        }
    }
}

/// Collapse raw forecast samples into per-day summaries.
///
/// Days come out in the order their first sample was seen, which is only
/// chronological when the feed is. At most [`MAX_FORECAST_DAYS`] are kept.
pub fn aggregate_daily_forecasts(samples: &[WeatherSample]) -> Vec<DailyForecast> {
    let mut days: Vec<DayAccumulator<'_>> = Vec::new();

    for sample in samples {
        let date = sample.timestamp.date();
        let index = match days.iter().position(|day| day.date == date) {
            Some(index) => index,
            None => {
                days.push(DayAccumulator::new(sample));
                days.len() - 1
            }
        };
        days[index].push(sample);
    }

    days.into_iter()
        .map(DayAccumulator::finish)
        .take(MAX_FORECAST_DAYS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ts: &str, temp: f64, humidity: f64, rain: Option<f64>) -> WeatherSample {
        WeatherSample {
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            temperature_celsius: temp,
            humidity_percent: humidity,
            rain_mm: rain,
            snow_mm: None,
            description: format!("sky at {}", ts),
            icon: "01d".to_string(),
            wind_speed_mps: Some(3.2),
        }
    }

    #[test]
    fn test_empty_input_yields_no_days() {
        assert!(aggregate_daily_forecasts(&[]).is_empty());
    }

    #[test]
    fn test_groups_samples_by_date() {
        let samples = vec![
            sample("2024-08-30 09:00:00", 21.4, 60.0, None),
            sample("2024-08-30 12:00:00", 26.6, 50.0, Some(0.5)),
            sample("2024-08-30 15:00:00", 24.0, 55.0, Some(0.75)),
            sample("2024-08-31 00:00:00", 15.5, 80.0, None),
        ];

        let days = aggregate_daily_forecasts(&samples);
        assert_eq!(days.len(), 2);

        let first = &days[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 8, 30).unwrap());
        assert_eq!(first.min_temp, 21.0);
        assert_eq!(first.max_temp, 27.0);
        assert_eq!(first.avg_humidity, 55.0);
        assert_eq!(first.precipitation, 1.25);
        assert_eq!(first.rain_probability, 25.0);
        assert_eq!(first.description, "sky at 2024-08-30 09:00:00");
        assert_eq!(first.wind_speed, 3.2);

        let second = &days[1];
        assert_eq!(second.min_temp, 16.0);
        assert_eq!(second.max_temp, 16.0);
        assert_eq!(second.precipitation, 0.0);
        assert_eq!(second.rain_probability, DRY_DAY_RAIN_PROBABILITY);
    }

    #[test]
    fn test_snow_counts_as_precipitation() {
        let mut snowy = sample("2024-08-30 09:00:00", -1.0, 90.0, Some(1.0));
        snowy.snow_mm = Some(2.333);
        let days = aggregate_daily_forecasts(&[snowy]);
        assert_eq!(days[0].precipitation, 3.33);
    }

    #[test]
    fn test_negative_halves_round_up() {
        let days = aggregate_daily_forecasts(&[sample("2024-01-01 03:00:00", -2.5, 70.0, None)]);
        assert_eq!(days[0].min_temp, -2.0);
    }

    #[test]
    fn test_keeps_first_seen_order() {
        let samples = vec![
            sample("2024-09-02 09:00:00", 20.0, 50.0, None),
            sample("2024-09-01 09:00:00", 20.0, 50.0, None),
            sample("2024-09-02 12:00:00", 22.0, 50.0, None),
        ];
        let days = aggregate_daily_forecasts(&samples);
        let dates: Vec<_> = days.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-09-02", "2024-09-01"]);
        assert_eq!(days[0].max_temp, 22.0);
    }

    #[test]
    fn test_truncates_to_five_days() {
        let samples: Vec<_> = (1..=7)
            .map(|d| sample(&format!("2024-09-0{} 12:00:00", d), 20.0, 50.0, None))
            .collect();
        let days = aggregate_daily_forecasts(&samples);
        assert_eq!(days.len(), MAX_FORECAST_DAYS);
        assert_eq!(days[4].date, NaiveDate::from_ymd_opt(2024, 9, 5).unwrap());
    }

    #[test]
    fn test_rain_probability_bounds() {
        assert_eq!(rain_probability(0.0), 10.0);
        assert_eq!(rain_probability(0.2), 10.0);
        assert_eq!(rain_probability(2.0), 40.0);
        assert_eq!(rain_probability(12.0), 90.0);
    }

    #[test]
    fn test_client_supplied_bundle_defaults() {
        let bundle: ForecastBundle = serde_json::from_str(
            r#"{"forecast":[{"date":"2024-08-30","maxTemp":25,"minTemp":14,"avgHumidity":60,"precipitation":0}]}"#,
        )
        .unwrap();
        assert_eq!(bundle.forecast.len(), 1);
        assert_eq!(bundle.forecast[0].rain_probability, 10.0);
        assert!(bundle.coordinates.is_none());
    }
}
