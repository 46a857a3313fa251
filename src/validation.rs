//! Input validation for request payloads.
//!
//! Each function checks one payload and returns the first problem found as a
//! [`ValidationError`]. Nothing here touches the database.

use rust_decimal::Decimal;
use thiserror::Error;

pub const MAX_USERNAME_LEN: usize = 150;
pub const MAX_NAME_LEN: usize = 30;
pub const MAX_LOCATION_LEN: usize = 100;
pub const MIN_PASSWORD_LEN: usize = 8;

/// Largest amount a `decimal(10, 2)` money column holds: 99,999,999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Username may only contain letters, digits and @/./+/-/_ characters")]
    InvalidUsername,

    #[error("Enter a valid email address")]
    InvalidEmail,

    #[error("Password must be at least {} characters", MIN_PASSWORD_LEN)]
    PasswordTooShort,

    #[error("Password cannot be entirely numeric")]
    PasswordNumeric,

    #[error("The two password fields didn't match")]
    PasswordMismatch,

    #[error("Number of seats must be at least 1")]
    NonPositiveSeats,

    #[error("Available seats cannot be negative")]
    NegativeSeats,

    #[error("Price cannot be negative")]
    NegativePrice,

    #[error("Price must be at most {}", MAX_AMOUNT)]
    PriceTooLarge,

    #[error("Total price must be at most {}", MAX_AMOUNT)]
    TotalTooLarge,

    #[error("Source and destination must be different")]
    SameSourceAndDestination,

    #[error("This travel option has already departed")]
    AlreadyDeparted,
}

pub fn validate_seat_count(seats: i32) -> Result<i32, ValidationError> {
    if seats < 1 {
        return Err(ValidationError::NonPositiveSeats);
    }
    Ok(seats)
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::Required("Username"));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(ValidationError::TooLong {
            field: "Username",
            max: MAX_USERNAME_LEN,
        });
    }
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if !username.chars().all(allowed) {
        return Err(ValidationError::InvalidUsername);
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::Required("Email"));
    }
    let (local, domain) = email.split_once('@').ok_or(ValidationError::InvalidEmail)?;
    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@');
    if local.is_empty() || !domain_ok || email.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub fn validate_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}

pub fn validate_password(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Required("Password"));
    }
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::PasswordNumeric);
    }
    Ok(())
}

pub fn validate_location(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    if value.chars().count() > MAX_LOCATION_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_LOCATION_LEN,
        });
    }
    Ok(())
}

pub fn validate_route(source: &str, destination: &str) -> Result<(), ValidationError> {
    validate_location("Source", source)?;
    validate_location("Destination", destination)?;
    if source.trim().eq_ignore_ascii_case(destination.trim()) {
        return Err(ValidationError::SameSourceAndDestination);
    }
    Ok(())
}

pub fn validate_price(price: Decimal) -> Result<Decimal, ValidationError> {
    if price < Decimal::ZERO {
        return Err(ValidationError::NegativePrice);
    }
    let price = price.round_dp(2);
    if price > MAX_AMOUNT {
        return Err(ValidationError::PriceTooLarge);
    }
    Ok(price)
}

pub fn validate_available_seats(seats: i32) -> Result<i32, ValidationError> {
    if seats < 0 {
        return Err(ValidationError::NegativeSeats);
    }
    Ok(seats)
}
