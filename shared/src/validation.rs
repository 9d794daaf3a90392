//! Validation utilities for the Dairy Herd Management Platform

use rust_decimal::Decimal;

// ============================================================================
// Dairy Validations
// ============================================================================

/// Validate a quantity used in stock movements (yields, sale quantities)
pub fn validate_positive_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be greater than 0");
    }
    Ok(())
}

/// Validate a yield figure; yields may be zero (dry morning or evening)
/// but never negative
pub fn validate_yield(yield_liters: Decimal) -> Result<(), &'static str> {
    if yield_liters < Decimal::ZERO {
        return Err("Yield cannot be negative");
    }
    Ok(())
}

/// Validate a per-liter price
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price <= Decimal::ZERO {
        return Err("Price must be greater than 0");
    }
    Ok(())
}

/// Validate an animal tag identifier (non-empty, printable, bounded)
pub fn validate_tag_id(tag: &str) -> Result<(), &'static str> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        return Err("Tag ID cannot be empty");
    }
    if trimmed.len() > 32 {
        return Err("Tag ID is too long");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if validator::validate_email(email) {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate a phone number (digits, optional leading +, 7-15 digits)
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    let digits: &str = phone.strip_prefix('+').unwrap_or(phone);
    if digits.len() < 7 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err("Invalid phone number");
    }
    Ok(())
}

/// Validate a password meets the minimum length policy
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn quantities_must_be_positive() {
        assert!(validate_positive_quantity(dec("0.1")).is_ok());
        assert!(validate_positive_quantity(Decimal::ZERO).is_err());
        assert!(validate_positive_quantity(dec("-3")).is_err());
    }

    #[test]
    fn yields_may_be_zero() {
        assert!(validate_yield(Decimal::ZERO).is_ok());
        assert!(validate_yield(dec("12.5")).is_ok());
        assert!(validate_yield(dec("-0.1")).is_err());
    }

    #[test]
    fn tag_ids() {
        assert!(validate_tag_id("COW-042").is_ok());
        assert!(validate_tag_id("  ").is_err());
        assert!(validate_tag_id(&"X".repeat(33)).is_err());
    }

    #[test]
    fn emails() {
        assert!(validate_email("farmer@example.com").is_ok());
        assert!(validate_email("nope").is_err());
    }

    #[test]
    fn phones() {
        assert!(validate_phone("+919876543210").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("98-76-54").is_err());
    }

    #[test]
    fn passwords() {
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
    }
}
