//! Field-level format checks for account data.
//!
//! Every validator is a pure function of the input string. Repositories call
//! them before any write so a malformed value never reaches the database.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

pub const USERNAME_MAX_LEN: usize = 100;
pub const EMAIL_MAX_LEN: usize = 100;
pub const PHONE_NUMBER_MAX_LEN: usize = 11;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(field, "This field is required"));
    }

    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::new(
            field,
            format!("Ensure this value has at most {max} characters (it has {len})"),
        ));
    }

    Ok(())
}

/// Letters, digits and `@ . + - _` only.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"^[\w.@+-]+$");

    check_length("username", username, USERNAME_MAX_LEN)?;

    if !re.is_match(username) {
        return Err(ValidationError::new(
            "username",
            "Enter a valid username. It may contain only letters, numbers, and @/./+/-/_ characters",
        ));
    }

    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~.-]+@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$",
    );

    check_length("email", email, EMAIL_MAX_LEN)?;

    let valid = re.is_match(email)
        && email.split_once('@').is_some_and(|(local, _)| {
            !local.starts_with('.') && !local.ends_with('.') && !local.contains("..")
        });

    if !valid {
        return Err(ValidationError::new("email", "Enter a valid email address"));
    }

    Ok(())
}

/// Mobile numbers: `09` followed by nine digits.
pub fn validate_phone_number(phone_number: &str) -> Result<(), ValidationError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"^09[0-9]{9}$");

    check_length("phone_number", phone_number, PHONE_NUMBER_MAX_LEN)?;

    if !re.is_match(phone_number) {
        return Err(ValidationError::new(
            "phone_number",
            "Enter a valid mobile number (e.g. 09121234567)",
        ));
    }

    Ok(())
}

/// Trims surrounding whitespace and lower-cases the domain part.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("alice.smith+dev@home_1-2").is_ok());
        assert!(validate_username("ali").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("alice smith").is_err());
        assert!(validate_username("alice#1").is_err());
        assert!(validate_username(&"a".repeat(100)).is_ok());
        assert!(validate_username(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("first.last+tag@mail.example.org").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("a@localhost").is_err());
        assert!(validate_email("a b@x.com").is_err());
        assert!(validate_email(".a@x.com").is_err());
        assert!(validate_email("a..b@x.com").is_err());
        assert!(validate_email("a@-x.com").is_err());

        let long = format!("{}@x.com", "a".repeat(95));
        assert_eq!(long.len(), 101);
        assert!(validate_email(&long).is_err());
    }

    #[test]
    fn test_validate_phone_number() {
        assert!(validate_phone_number("09121234567").is_ok());
        assert!(validate_phone_number("").is_err());
        assert!(validate_phone_number("9121234567").is_err());
        assert!(validate_phone_number("0912123456").is_err());
        assert!(validate_phone_number("091212345678").is_err());
        assert!(validate_phone_number("0912123456a").is_err());
        assert!(validate_phone_number("+9891212345").is_err());
    }

    #[test]
    fn test_error_names_field() {
        let err = validate_phone_number("123").unwrap_err();
        assert_eq!(err.field, "phone_number");
        assert!(err.to_string().starts_with("phone_number: "));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("Alice@EXAMPLE.Com"), "Alice@example.com");
        assert_eq!(normalize_email("  bob@x.com "), "bob@x.com");
        assert_eq!(normalize_email("not-an-email"), "not-an-email");
    }
}
