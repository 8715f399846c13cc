//! Prediction output conversion and formatting
//!
//! Converts a USD model output into the requested currency at a fixed
//! rate and renders it with a currency symbol, thousands separators and
//! two decimal places.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Fixed USD to INR rate
pub const DEFAULT_INR_RATE: f64 = 84.0;

/// Supported output currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Inr,
}

impl Currency {
    /// Resolve a currency code. Codes match exactly; anything other than
    /// `USD` or `INR` resolves to USD.
    pub fn from_code(code: &str) -> Self {
        match code {
            "USD" => Currency::Usd,
            "INR" => Currency::Inr,
            other => {
                debug!(code = %other, "Unrecognized currency code, using USD");
                Currency::Usd
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Inr => "INR",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Inr => "₹",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Converted amount with its display form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedAmount {
    pub amount: f64,
    pub currency: Currency,
    pub display: String,
}

impl fmt::Display for FormattedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

/// Configuration for currency conversion
#[derive(Debug, Clone)]
pub struct CurrencyConfig {
    /// Rupees per dollar
    pub inr_rate: f64,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            inr_rate: DEFAULT_INR_RATE,
        }
    }
}

/// Converts USD model outputs into display amounts
#[derive(Debug, Clone, Default)]
pub struct CurrencyConverter {
    config: CurrencyConfig,
}

impl CurrencyConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CurrencyConfig) -> Self {
        Self { config }
    }

    pub fn rate(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Usd => 1.0,
            Currency::Inr => self.config.inr_rate,
        }
    }

    pub fn convert(&self, amount_usd: f64, currency: Currency) -> FormattedAmount {
        let amount = amount_usd * self.rate(currency);
        FormattedAmount {
            amount,
            currency,
            display: format!("{}{}", currency.symbol(), group_thousands(amount)),
        }
    }

    /// Convert using a raw currency code
    pub fn convert_code(&self, amount_usd: f64, code: &str) -> FormattedAmount {
        self.convert(amount_usd, Currency::from_code(code))
    }
}

/// Render with two decimals and comma thousands separators
pub fn group_thousands(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // Sign survives rounding to zero: -0.001 renders as -0.00
    let sign = if amount.is_sign_negative() { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}
