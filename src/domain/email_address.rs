use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::error::Error;

/// A user supplied email-address, trimmed and lower-cased.
///
/// Two addresses that differ only by surrounding whitespace or casing parse to
/// the same value, which is what the storage uniqueness constraint compares.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct EmailAddress(String);

impl FromStr for EmailAddress {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        lazy_static::lazy_static! {
            static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
        }

        let value = value.trim();

        if value.is_empty() {
            return Err(Error::InvalidEmail("Email address cannot be empty".into()));
        }
        if !EMAIL_REGEX.is_match(value) {
            return Err(Error::InvalidEmail("Email address of incorrect format".into()));
        }

        // Normalize
        Ok(Self(value.to_lowercase()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
