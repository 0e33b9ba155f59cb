use std::fmt;

use serde::{Deserialize, Serialize};

/// A validated card triple, normalized (no whitespace).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetails {
    pub number: String,
    pub expiry: String,
    pub cvv: String,
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last4 = self
            .number
            .get(self.number.len().saturating_sub(4)..)
            .unwrap_or_default();
        f.debug_struct("CardDetails")
            .field("number", &format_args!("****{last4}"))
            .field("expiry", &self.expiry)
            .field("cvv", &"***")
            .finish()
    }
}

/// Card fields as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardInput {
    pub number: String,
    pub expiry: String,
    pub cvv: String,
}

impl CardInput {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Normalizes and validates the fields.
    ///
    /// Whitespace is stripped from number and expiry and the CVV is trimmed
    /// before any rule is checked.
    ///
    /// # Errors
    /// Returns the first failing [`CardError`].
    pub fn validate(&self) -> Result<CardDetails, CardError> {
        // Emptiness is judged on the raw input; blank-but-typed fields fall
        // through to the format checks.
        if self.number.is_empty() || self.expiry.is_empty() || self.cvv.is_empty() {
            return Err(CardError::MissingFields);
        }

        let number: String = self.number.split_whitespace().collect();
        let expiry: String = self.expiry.split_whitespace().collect();
        let cvv = self.cvv.trim().to_string();
        if number.len() != 16 || !all_digits(&number) {
            return Err(CardError::InvalidNumber);
        }
        if !valid_expiry(&expiry) {
            return Err(CardError::InvalidExpiry);
        }
        if cvv.len() != 3 || !all_digits(&cvv) {
            return Err(CardError::InvalidCvv);
        }

        Ok(CardDetails {
            number,
            expiry,
            cvv,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardError {
    MissingFields,
    InvalidNumber,
    InvalidExpiry,
    InvalidCvv,
}

impl fmt::Display for CardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            CardError::MissingFields => "Please complete all card fields.",
            CardError::InvalidNumber => "Card number must be 16 digits.",
            CardError::InvalidExpiry => "Expiration must be in MM/YY format.",
            CardError::InvalidCvv => "CVV must be 3 digits.",
        };
        f.write_str(message)
    }
}

impl std::error::Error for CardError {}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

/// `MM/YY` with month 01-12.
fn valid_expiry(expiry: &str) -> bool {
    let Some((month, year)) = expiry.split_once('/') else {
        return false;
    };
    if month.len() != 2 || year.len() != 2 || !all_digits(month) || !all_digits(year) {
        return false;
    }
    matches!(month.parse::<u8>(), Ok(1..=12))
}
