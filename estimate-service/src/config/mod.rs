use crate::pricing::{tax, AssociationRule, PricingOptions, DEFAULT_TAX_RATE};
use rust_decimal::Decimal;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct EstimateConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub pricing: PricingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    pub tax_rate: Decimal,
    pub association_rule: AssociationRule,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate: DEFAULT_TAX_RATE,
            association_rule: AssociationRule::default(),
        }
    }
}

impl PricingConfig {
    pub fn options(&self) -> PricingOptions {
        PricingOptions {
            tax_rate: self.tax_rate,
            association: self.association_rule,
        }
    }
}

impl EstimateConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let tax_rate = get_env("PRICING_TAX_RATE", Some("0.12"), is_prod)?;
        let tax_rate = Decimal::from_str(&tax_rate).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("Invalid PRICING_TAX_RATE '{}': {}", tax_rate, e))
        })?;
        if !tax::is_valid_rate(tax_rate) {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PRICING_TAX_RATE must be between 0 and 1, got {}",
                tax_rate
            )));
        }

        Ok(EstimateConfig {
            common: common_config,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            pricing: PricingConfig {
                tax_rate,
                association_rule: get_env("PRICING_ASSOCIATION_RULE", Some("substring"), is_prod)?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            common: core_config::Config::default(),
            log_level: "info".to_string(),
            otlp_endpoint: None,
            pricing: PricingConfig::default(),
        }
    }
}
