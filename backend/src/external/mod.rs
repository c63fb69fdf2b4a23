//! External API integrations

pub mod narrative;
pub mod weather;

pub use narrative::{ChatMessage, ChatRole, NarrativeBackend, NarrativeClient};
pub use weather::{CurrentWeather, WeatherClient};
