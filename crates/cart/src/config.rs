//! Pricing configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `PLATEFUL_TAX_RATE` - Tax rate applied to the subtotal (default: 0.08)
//! - `PLATEFUL_BASE_DELIVERY_FEE` - Platform floor for the delivery fee (default: 2.99)

use rust_decimal::Decimal;
use thiserror::Error;

use plateful_core::Money;

/// Environment variable holding the tax rate.
pub const TAX_RATE_VAR: &str = "PLATEFUL_TAX_RATE";
/// Environment variable holding the base delivery fee.
pub const BASE_DELIVERY_FEE_VAR: &str = "PLATEFUL_BASE_DELIVERY_FEE";

const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);
const DEFAULT_BASE_DELIVERY_FEE: Decimal = Decimal::from_parts(299, 0, 0, false, 2);

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Value out of range for {0}: {1}")]
    OutOfRange(String, String),
}

/// Platform pricing constants used by the totals calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingConfig {
    /// Fraction of the subtotal charged as tax.
    tax_rate: Decimal,
    /// Floor for the delivery fee, regardless of what a restaurant declares.
    base_delivery_fee: Money,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate: DEFAULT_TAX_RATE,
            base_delivery_fee: Money::new(DEFAULT_BASE_DELIVERY_FEE),
        }
    }
}

impl PricingConfig {
    /// Create a validated pricing configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::OutOfRange` if the tax rate is outside `[0, 1)`
    /// or the base delivery fee is negative.
    pub fn new(tax_rate: Decimal, base_delivery_fee: Money) -> Result<Self, ConfigError> {
        if tax_rate.is_sign_negative() || tax_rate >= Decimal::ONE {
            return Err(ConfigError::OutOfRange(
                TAX_RATE_VAR.to_string(),
                format!("must be in [0, 1) (got {tax_rate})"),
            ));
        }
        if base_delivery_fee < Money::ZERO {
            return Err(ConfigError::OutOfRange(
                BASE_DELIVERY_FEE_VAR.to_string(),
                format!("must not be negative (got {base_delivery_fee})"),
            ));
        }
        Ok(Self {
            tax_rate,
            base_delivery_fee,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed as a
    /// decimal, or if the parsed values fail validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Missing keys fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Same as [`PricingConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let tax_rate = parse_decimal(&lookup, TAX_RATE_VAR)?.unwrap_or(defaults.tax_rate);
        let base_delivery_fee = parse_decimal(&lookup, BASE_DELIVERY_FEE_VAR)?
            .map_or(defaults.base_delivery_fee, Money::new);

        Self::new(tax_rate, base_delivery_fee)
    }

    /// Fraction of the subtotal charged as tax.
    #[must_use]
    pub const fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    /// Floor for the delivery fee.
    #[must_use]
    pub const fn base_delivery_fee(&self) -> Money {
        self.base_delivery_fee
    }
}

fn parse_decimal<F>(lookup: &F, key: &str) -> Result<Option<Decimal>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<Decimal>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use rust_decimal_macros::dec;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PricingConfig::default();
        assert_eq!(config.tax_rate(), dec!(0.08));
        assert_eq!(config.base_delivery_fee(), Money::new(dec!(2.99)));
    }

    #[test]
    fn test_from_lookup_empty_uses_defaults() {
        let config = PricingConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, PricingConfig::default());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = PricingConfig::from_lookup(lookup_from(&[
            (TAX_RATE_VAR, "0.0925"),
            (BASE_DELIVERY_FEE_VAR, " 1.50 "),
        ]))
        .unwrap();
        assert_eq!(config.tax_rate(), dec!(0.0925));
        assert_eq!(config.base_delivery_fee(), Money::new(dec!(1.50)));
    }

    #[test]
    fn test_from_lookup_invalid_decimal() {
        let err = PricingConfig::from_lookup(lookup_from(&[(TAX_RATE_VAR, "eight percent")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == TAX_RATE_VAR));
    }

    #[test]
    fn test_tax_rate_out_of_range() {
        assert!(matches!(
            PricingConfig::new(dec!(1), Money::ZERO),
            Err(ConfigError::OutOfRange(..))
        ));
        assert!(matches!(
            PricingConfig::new(dec!(-0.01), Money::ZERO),
            Err(ConfigError::OutOfRange(..))
        ));
    }

    #[test]
    fn test_negative_delivery_fee_rejected() {
        assert!(matches!(
            PricingConfig::new(dec!(0.08), Money::new(dec!(-1))),
            Err(ConfigError::OutOfRange(ref key, _)) if key == BASE_DELIVERY_FEE_VAR
        ));
    }
}
