//! Type-safe money representation using decimal arithmetic.
//!
//! Shopify reports every amount as a decimal string paired with an ISO 4217
//! currency code. Both halves are validated before they reach the database.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing [`Money`] or a [`CurrencyCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount is not a decimal number.
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
    /// The currency is not a 3-letter uppercase code.
    #[error("invalid currency code '{0}'")]
    InvalidCurrency(String),
}

/// ISO 4217 currency code (e.g. `USD`, `EUR`).
///
/// Only the shape is validated: exactly three ASCII uppercase letters.
/// Lowercase input is uppercased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    /// US dollar.
    pub const USD: Self = Self(*b"USD");

    /// Parse a currency code.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::InvalidCurrency`] unless the trimmed input is
    /// exactly three ASCII letters.
    pub fn parse(input: &str) -> Result<Self, MoneyError> {
        let trimmed = input.trim();
        match trimmed.as_bytes() {
            [a, b, c] if trimmed.bytes().all(|ch| ch.is_ascii_alphabetic()) => Ok(Self([
                a.to_ascii_uppercase(),
                b.to_ascii_uppercase(),
                c.to_ascii_uppercase(),
            ])),
            _ => Err(MoneyError::InvalidCurrency(input.to_owned())),
        }
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Constructed only from ASCII letters.
        core::str::from_utf8(&self.0).unwrap_or("XXX")
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::USD
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.as_str().to_owned()
    }
}

/// A monetary amount with its currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit (e.g. dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Parse a Shopify `MoneyV2` pair (`"19.99"`, `"USD"`).
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not a decimal or the currency code
    /// is malformed.
    ///
    /// # Example
    ///
    /// ```
    /// use shop_insights_core::Money;
    ///
    /// let money = Money::parse("19.99", "usd").unwrap();
    /// assert_eq!(money.to_string(), "19.99 USD");
    /// ```
    pub fn parse(amount: &str, currency: &str) -> Result<Self, MoneyError> {
        let value = Decimal::from_str(amount.trim())
            .map_err(|_| MoneyError::InvalidAmount(amount.to_owned()))?;
        let currency_code = CurrencyCode::parse(currency)?;
        Ok(Self::new(value, currency_code))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency_code)
    }
}
