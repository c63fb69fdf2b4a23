//! Shared types and models for the Water Oasis platform
//!
//! This crate contains the domain model and the pure prediction computations
//! shared between the backend, the browser dashboard (via WASM), and tests.

pub mod heuristic;
pub mod models;
pub mod outlook;
pub mod types;
pub mod validation;

pub use heuristic::*;
pub use models::*;
pub use outlook::*;
pub use types::*;
pub use validation::*;
