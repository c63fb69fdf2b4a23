//! Input validation for the Water Oasis platform

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{CreateReservoirInput, NewReservoir, UpdateReservoirInput};
use crate::types::Coordinates;

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Rejected client input; the message is shown to the client as is
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    MissingFields(&'static str),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password must be at least 6 characters long")]
    PasswordTooShort,

    #[error("{field} must be between 0 and 100")]
    OutOfRange { field: &'static str },

    #[error("Invalid coordinates")]
    InvalidCoordinates,
}

// ============================================================================
// Account Validations
// ============================================================================

/// Validate email format: `local@domain.tld` without whitespace
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let (local, domain) = email.split_once('@').ok_or(ValidationError::InvalidEmail)?;
    let well_formed = |part: &str| {
        !part.is_empty() && !part.chars().any(|c| c.is_whitespace() || c == '@')
    };

    if !well_formed(local) || !well_formed(domain) {
        return Err(ValidationError::InvalidEmail);
    }

    let has_inner_dot = domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len());
    if !has_inner_dot {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(())
}

/// Validate password length
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Validate a registration request in the order the client expects errors
pub fn validate_registration(email: &str, password: &str, name: &str) -> Result<(), ValidationError> {
    if email.is_empty() || password.is_empty() || name.trim().is_empty() {
        return Err(ValidationError::MissingFields(
            "Email, password, and name are required",
        ));
    }
    validate_email(email)?;
    validate_password(password)
}

// ============================================================================
// Reservoir Validations
// ============================================================================

/// Parse a latitude/longitude pair given as text
pub fn parse_coordinates(lat: &str, lng: &str) -> Result<Coordinates, ValidationError> {
    let parse = |value: &str, limit: i64| {
        Decimal::from_str(value.trim())
            .ok()
            .filter(|v| v.abs() <= Decimal::from(limit))
            .ok_or(ValidationError::InvalidCoordinates)
    };
    Ok(Coordinates::new(parse(lat, 90)?, parse(lng, 180)?))
}

/// Validate a percentage reading (0-100)
pub fn validate_percentage(value: f64, field: &'static str) -> Result<(), ValidationError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::OutOfRange { field });
    }
    Ok(())
}

/// Validate a reservoir registration and extract its fields
pub fn validate_new_reservoir(input: CreateReservoirInput) -> Result<NewReservoir, ValidationError> {
    const MISSING: ValidationError = ValidationError::MissingFields(
        "Missing required fields: name, location, capacity, currentLevel, coordinates",
    );

    let name = input.name.filter(|n| !n.trim().is_empty()).ok_or(MISSING)?;
    let location = input.location.filter(|l| !l.trim().is_empty()).ok_or(MISSING)?;
    // A zero capacity counts as missing
    let capacity = input.capacity.filter(|c| *c != 0.0).ok_or(MISSING)?;
    let current_level = input.current_level.ok_or(MISSING)?;
    let coordinates = input.coordinates.ok_or(MISSING)?;

    validate_percentage(capacity, "capacity")?;
    validate_percentage(current_level, "currentLevel")?;

    Ok(NewReservoir {
        name,
        location,
        capacity,
        current_level,
        coordinates,
    })
}

/// Validate the numeric fields of a partial reservoir update
pub fn validate_reservoir_update(input: &UpdateReservoirInput) -> Result<(), ValidationError> {
    if let Some(capacity) = input.capacity {
        validate_percentage(capacity, "capacity")?;
    }
    if let Some(current_level) = input.current_level {
        validate_percentage(current_level, "currentLevel")?;
    }
    Ok(())
}
