//! Business logic services for the Water Oasis server

pub mod auth;
pub mod prediction;
pub mod reservoir;
pub mod weather;

pub use auth::AuthService;
pub use prediction::{NarrativePredictor, PredictionService};
pub use reservoir::{ReservoirRepository, ReservoirService};
pub use weather::{ForecastProvider, WeatherService};
