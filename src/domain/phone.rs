use crate::error::{Result, WifiPayError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of subscriber digits a phone number must carry.
pub const PHONE_DIGITS: usize = 9;

/// Country calling code used when none is configured.
pub const DEFAULT_COUNTRY_CODE: &str = "256";

/// Strips every non-digit character and keeps at most the first nine digits.
pub fn normalize_phone_digits(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(PHONE_DIGITS)
        .collect()
}

/// A subscriber number of exactly nine digits, without country code.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(digits: &str) -> Result<Self> {
        if digits.len() == PHONE_DIGITS && digits.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self(digits.to_string()))
        } else {
            Err(WifiPayError::ValidationError(format!(
                "Phone number must be exactly {PHONE_DIGITS} digits"
            )))
        }
    }

    pub fn digits(&self) -> &str {
        &self.0
    }

    /// Renders the number as `+<country><digits>`.
    pub fn international(&self, country_code: &str) -> String {
        format!("+{}{}", country_code.trim_start_matches('+'), self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = WifiPayError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
