//! HTTP request handlers

pub mod auth;
pub mod health;
pub mod prediction;
pub mod reservoir;
pub mod weather;

pub use auth::{demo_login, login, me, refresh, register};
pub use health::health_check;
pub use prediction::{ai_health, chat, predict};
pub use reservoir::{
    create_reservoir, delete_reservoir, get_reservoir, list_reservoirs, update_reservoir,
};
pub use weather::{get_current_weather, get_forecast, get_reservoir_outlook};
