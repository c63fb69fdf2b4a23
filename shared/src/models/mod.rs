//! Domain models for the Water Oasis platform

mod prediction;
mod reservoir;
mod user;
mod weather;

pub use prediction::*;
pub use reservoir::*;
pub use user::*;
pub use weather::*;
