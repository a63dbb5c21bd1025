//! Shop configuration.
//!
//! Defaults come from serde, a JSON document can override any subset of them, and
//! `SHOP_MAX_QUANTITY` / `SHOP_PRIORITY_DISCOUNT` override both.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_QUANTITY_VAR: &str = "SHOP_MAX_QUANTITY";
pub const PRIORITY_DISCOUNT_VAR: &str = "SHOP_PRIORITY_DISCOUNT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidVar { var: &'static str, value: String },

    #[error("Invalid shop configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// Largest quantity a single order may request.
    pub max_quantity: u32,
    /// Percentage taken off priority orders with a valid coupon.
    pub priority_discount: f64,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            max_quantity: 100,
            priority_discount: 10.0,
        }
    }
}

impl ShopConfig {
    /// Defaults plus environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|var| std::env::var(var).ok())
    }

    /// Parses a JSON document, then applies environment overrides.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.with_overrides(|var| std::env::var(var).ok())
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(MAX_QUANTITY_VAR) {
            self.max_quantity = value.trim().parse().map_err(|_| ConfigError::InvalidVar {
                var: MAX_QUANTITY_VAR,
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(PRIORITY_DISCOUNT_VAR) {
            self.priority_discount = value
                .trim()
                .parse()
                .ok()
                .filter(|percent: &f64| (0.0..=100.0).contains(percent))
                .ok_or_else(|| ConfigError::InvalidVar {
                    var: PRIORITY_DISCOUNT_VAR,
                    value: value.clone(),
                })?;
        }
        Ok(self)
    }
}
