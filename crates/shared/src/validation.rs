//! Common validation utilities.

use validator::{ValidateEmail, ValidationError};

lazy_static::lazy_static! {
    /// E.164-style phone number: optional leading `+`, 7 to 15 digits.
    static ref PHONE_REGEX: regex::Regex = regex::Regex::new(r"^\+?[1-9]\d{6,14}$").unwrap();
}

/// Validates that a latitude value is within valid range (-90 to 90).
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        let mut err = ValidationError::new("latitude_range");
        err.message = Some("Latitude must be between -90 and 90".into());
        Err(err)
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
pub fn validate_longitude(lon: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        let mut err = ValidationError::new("longitude_range");
        err.message = Some("Longitude must be between -180 and 180".into());
        Err(err)
    }
}

/// Validates an email address used as a notification recipient.
pub fn validate_email_address(email: &str) -> Result<(), ValidationError> {
    if email.trim().validate_email() {
        Ok(())
    } else {
        let mut err = ValidationError::new("email_format");
        err.message = Some(format!("'{}' is not a valid email address", email).into());
        Err(err)
    }
}

/// Validates a phone number used as an SMS recipient.
///
/// Spaces, dashes and parentheses are ignored.
pub fn validate_phone_number(phone: &str) -> Result<(), ValidationError> {
    let compact: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();

    if PHONE_REGEX.is_match(&compact) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone_format");
        err.message = Some(format!("'{}' is not a valid phone number", phone).into());
        Err(err)
    }
}

/// Clamps `value` into `[min, max]`.
///
/// Non-finite input collapses to `min`.
pub fn clamp_to_range(value: f64, min: f64, max: f64) -> f64 {
    debug_assert!(min <= max, "clamp range is inverted: {min} > {max}");
    if !value.is_finite() {
        return min;
    }
    value.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    #[test]
    fn test_validate_latitude() {
        assert!(validate_latitude(0.0).is_ok());
        assert!(validate_latitude(90.0).is_ok());
        assert!(validate_latitude(-90.0).is_ok());
        assert!(validate_latitude(90.1).is_err());
        assert!(validate_latitude(-90.1).is_err());
    }

    #[test]
    fn test_validate_latitude_error_message() {
        let err = validate_latitude(100.0).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Latitude must be between -90 and 90"
        );
    }

    #[test]
    fn test_validate_longitude() {
        assert!(validate_longitude(0.0).is_ok());
        assert!(validate_longitude(180.0).is_ok());
        assert!(validate_longitude(-180.0).is_ok());
        assert!(validate_longitude(180.1).is_err());
        assert!(validate_longitude(-180.1).is_err());
    }

    #[test]
    fn test_validate_longitude_rejects_nan() {
        assert!(validate_longitude(f64::NAN).is_err());
        assert!(validate_latitude(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_email_address() {
        assert!(validate_email_address("dispatch@fleet.example.com").is_ok());
        assert!(validate_email_address("not-an-email").is_err());
        assert!(validate_email_address("").is_err());
    }

    #[test]
    fn test_validate_email_address_generated() {
        for _ in 0..20 {
            let email: String = SafeEmail().fake();
            assert!(validate_email_address(&email).is_ok(), "{email}");
        }
    }

    #[test]
    fn test_validate_phone_number() {
        assert!(validate_phone_number("+14155550123").is_ok());
        assert!(validate_phone_number("+1 (415) 555-0123").is_ok());
        assert!(validate_phone_number("0123").is_err());
        assert!(validate_phone_number("call me").is_err());
    }

    #[test]
    fn test_validate_phone_number_error_message() {
        let err = validate_phone_number("abc").unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "'abc' is not a valid phone number"
        );
    }

    #[test]
    fn test_clamp_to_range() {
        assert_eq!(clamp_to_range(10.0, 50.0, 10_000.0), 50.0);
        assert_eq!(clamp_to_range(20_000.0, 50.0, 10_000.0), 10_000.0);
        assert_eq!(clamp_to_range(750.0, 50.0, 10_000.0), 750.0);
        assert_eq!(clamp_to_range(f64::NAN, 50.0, 10_000.0), 50.0);
    }
}
