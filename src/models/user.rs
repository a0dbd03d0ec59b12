use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TransportError};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

static PASSWORD_CHARSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z\d!@#$%^&*()_+]{8,}$").unwrap());

const PASSWORD_SPECIALS: &str = "!@#$%^&*()_+";

/// Birthday format accepted by `/users/edit`
const BIRTHDAY_FORMAT: &str = "%Y-%m-%d";

// ==================================================================================================
// Requests
// ==================================================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub confirm_password: String,
    pub password: String,
}

impl SignupRequest {
    /// Same checks the server applies, so obvious mistakes fail before sending
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email)?;
        if self.password != self.confirm_password {
            return Err(TransportError::InvalidRequest(
                "Passwords do not match".to_string(),
            ));
        }
        validate_password(&self.password)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditProfileRequest {
    pub nickname: String,
    pub birthday: String,
    pub about_me: String,
}

impl EditProfileRequest {
    /// Birthday must be empty or `YYYY-MM-DD`
    pub fn validate(&self) -> Result<()> {
        if self.birthday.is_empty() {
            return Ok(());
        }
        NaiveDate::parse_from_str(&self.birthday, BIRTHDAY_FORMAT)
            .map(|_| ())
            .map_err(|_| {
                TransportError::InvalidRequest(format!(
                    "Invalid birthday {:?}, expected YYYY-MM-DD",
                    self.birthday
                ))
            })
    }
}

// ==================================================================================================
// Responses
// ==================================================================================================

/// User profile as returned by `/users/profile`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct Profile {
    pub id: i64,
    pub email: String,
    pub phone: String,
    pub nickname: String,
    pub birthday: String,
    pub about_me: String,
}

fn validate_email(email: &str) -> Result<()> {
    if EMAIL_PATTERN.is_match(email) {
        Ok(())
    } else {
        Err(TransportError::InvalidRequest(format!(
            "Invalid email address: {}",
            email
        )))
    }
}

fn validate_password(password: &str) -> Result<()> {
    let valid = PASSWORD_CHARSET.is_match(password)
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c));
    if valid {
        Ok(())
    } else {
        Err(TransportError::InvalidRequest(
            "Password needs letters, digits and one of !@#$%^&*()_+, at least 8 characters"
                .to_string(),
        ))
    }
}
