use std::fmt;

use serde::{Deserialize, Serialize};

/// A fiat currency that chart values are quoted in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    /// ISO 4217 code, e.g. `USD`.
    pub code: String,
    pub symbol: String,
    /// Number of fractional digits shown for amounts.
    pub decimal: u8,
}

impl Currency {
    pub fn new(code: impl Into<String>, symbol: impl Into<String>, decimal: u8) -> Self {
        Self {
            code: code.into(),
            symbol: symbol.into(),
            decimal,
        }
    }

    pub fn usd() -> Self {
        Self::new("USD", "$", 2)
    }

    pub fn eur() -> Self {
        Self::new("EUR", "€", 2)
    }

    /// Look up one of the built-in currencies by code (case-insensitive).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "USD" => Some(Self::usd()),
            "EUR" => Some(Self::eur()),
            "GBP" => Some(Self::new("GBP", "£", 2)),
            "JPY" => Some(Self::new("JPY", "¥", 0)),
            _ => None,
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::usd()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}
