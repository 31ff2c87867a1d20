//! Common validation utilities.

use validator::ValidationError;

lazy_static::lazy_static! {
    /// Conventional `local@domain.tld` shape.
    pub static ref EMAIL_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();

    /// Six-digit hex brand color, e.g. `#1F2937`.
    pub static ref HEX_COLOR_REGEX: regex::Regex =
        regex::Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap();
}

/// Minimum accepted password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Widest email the `users` and `businesses` tables hold.
pub const MAX_EMAIL_LENGTH: usize = 120;

/// Widest avatar or logo URL the schema holds.
pub const MAX_URL_LENGTH: usize = 255;

/// Returns true if `email` looks like `local@domain.tld` and fits in
/// [`MAX_EMAIL_LENGTH`]. Empty input fails.
pub fn validate_email(email: &str) -> bool {
    !email.is_empty() && email.chars().count() <= MAX_EMAIL_LENGTH && EMAIL_REGEX.is_match(email)
}

/// Returns true if `url` fits in [`MAX_URL_LENGTH`].
pub fn fits_url_column(url: &str) -> bool {
    url.chars().count() <= MAX_URL_LENGTH
}

/// Returns true if `color` is a `#RRGGBB` hex string.
pub fn validate_hex_color(color: &str) -> bool {
    HEX_COLOR_REGEX.is_match(color)
}

/// Returns true if the password meets the minimum length.
pub fn is_strong_enough_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
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

/// Parses a raw latitude, coercing anything unusable to `0.0`.
///
/// Blank, non-numeric, non-finite and out-of-range input all yield `0.0`.
/// An alert is never rejected because of its coordinates.
pub fn parse_latitude(raw: &str) -> f64 {
    parse_coordinate(raw, validate_latitude)
}

/// Parses a raw longitude with the same coercion rules as [`parse_latitude`].
pub fn parse_longitude(raw: &str) -> f64 {
    parse_coordinate(raw, validate_longitude)
}

fn parse_coordinate(raw: &str, check: fn(f64) -> Result<(), ValidationError>) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && check(value).is_ok() => value,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Email tests
    #[test]
    fn test_validate_email_accepts_conventional_addresses() {
        assert!(validate_email("user@example.com"));
        assert!(validate_email("first.last+tag@sub.example.co.za"));
        assert!(validate_email("a_b%c-d@x-y.io"));
    }

    #[test]
    fn test_validate_email_rejects_malformed() {
        assert!(!validate_email(""));
        assert!(!validate_email("plainaddress"));
        assert!(!validate_email("@example.com"));
        assert!(!validate_email("user@example"));
        assert!(!validate_email("user@example.c"));
        assert!(!validate_email("user name@example.com"));
        assert!(!validate_email("user@exa mple.com"));
    }

    #[test]
    fn test_validate_email_length_limit() {
        let domain = "@example.com";
        let fits = format!("{}{}", "a".repeat(MAX_EMAIL_LENGTH - domain.len()), domain);
        assert!(validate_email(&fits));

        let too_long = format!("a{}", fits);
        assert!(!validate_email(&too_long));
    }

    #[test]
    fn test_fits_url_column() {
        assert!(fits_url_column(&"u".repeat(MAX_URL_LENGTH)));
        assert!(!fits_url_column(&"u".repeat(MAX_URL_LENGTH + 1)));
    }

    // Color tests
    #[test]
    fn test_validate_hex_color() {
        assert!(validate_hex_color("#1F2937"));
        assert!(validate_hex_color("#abcdef"));
        assert!(!validate_hex_color("1F2937"));
        assert!(!validate_hex_color("#1F29"));
        assert!(!validate_hex_color("#GGGGGG"));
    }

    // Password tests
    #[test]
    fn test_password_length_boundary() {
        assert!(!is_strong_enough_password("1234567"));
        assert!(is_strong_enough_password("12345678"));
        assert!(!is_strong_enough_password(""));
    }

    // Latitude tests
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

    // Longitude tests
    #[test]
    fn test_validate_longitude() {
        assert!(validate_longitude(0.0).is_ok());
        assert!(validate_longitude(180.0).is_ok());
        assert!(validate_longitude(-180.0).is_ok());
        assert!(validate_longitude(180.1).is_err());
        assert!(validate_longitude(-180.1).is_err());
    }

    // Coordinate parsing tests
    #[test]
    fn test_parse_latitude_valid() {
        assert_eq!(parse_latitude("-33.9249"), -33.9249);
        assert_eq!(parse_latitude(" 18.4241 "), 18.4241);
    }

    #[test]
    fn test_parse_latitude_not_a_number_is_zero() {
        assert_eq!(parse_latitude("not-a-number"), 0.0);
        assert_eq!(parse_latitude(""), 0.0);
        assert_eq!(parse_latitude("NaN"), 0.0);
        assert_eq!(parse_latitude("inf"), 0.0);
    }

    #[test]
    fn test_parse_coordinates_out_of_range_is_zero() {
        assert_eq!(parse_latitude("91"), 0.0);
        assert_eq!(parse_longitude("-181"), 0.0);
        assert_eq!(parse_longitude("179.5"), 179.5);
    }
}
