//! TOML configuration for the simulated checkout.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! reference behaviour: 2 s / 1 s / 1.5 s stage delays and a 90 % payment
//! success rate.

use crate::domain::package::{Catalog, PackageSelection};
use crate::domain::phone::DEFAULT_COUNTRY_CODE;
use crate::error::{Result, WifiPayError};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use std::time::Duration;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WifiPayConfig {
    pub country_code: String,
    #[serde(deserialize_with = "payment_stage")]
    pub payment: StageConfig,
    #[serde(deserialize_with = "voucher_stage")]
    pub voucher: StageConfig,
    #[serde(deserialize_with = "sms_stage")]
    pub sms: StageConfig,
    pub pipeline: PipelineConfig,
    /// Replaces the standard catalog when non-empty.
    pub catalog: Vec<PackageSelection>,
}

/// Simulated latency and success rate of one stage.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StageConfig {
    pub delay_ms: u64,
    pub success_probability: f64,
}

/// A stage section as written in the file. Omitted keys keep the
/// reference value of that particular stage.
#[derive(Debug, Deserialize)]
struct StageSection {
    delay_ms: Option<u64>,
    success_probability: Option<f64>,
}

impl StageSection {
    fn over(self, reference: StageConfig) -> StageConfig {
        StageConfig {
            delay_ms: self.delay_ms.unwrap_or(reference.delay_ms),
            success_probability: self
                .success_probability
                .unwrap_or(reference.success_probability),
        }
    }
}

fn payment_stage<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<StageConfig, D::Error> {
    Ok(StageSection::deserialize(d)?.over(StageConfig::payment()))
}

fn voucher_stage<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<StageConfig, D::Error> {
    Ok(StageSection::deserialize(d)?.over(StageConfig::voucher()))
}

fn sms_stage<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<StageConfig, D::Error> {
    Ok(StageSection::deserialize(d)?.over(StageConfig::sms()))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Upper bound on a single stage. Unset means stages may take as long as they like.
    pub stage_timeout_ms: Option<u64>,
}

impl StageConfig {
    /// Mobile-money initiation: 2 s, nine in ten succeed.
    pub fn payment() -> Self {
        Self {
            delay_ms: 2000,
            success_probability: 0.9,
        }
    }

    pub fn voucher() -> Self {
        Self {
            delay_ms: 1000,
            success_probability: 1.0,
        }
    }

    pub fn sms() -> Self {
        Self {
            delay_ms: 1500,
            success_probability: 1.0,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for WifiPayConfig {
    fn default() -> Self {
        Self {
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            payment: StageConfig::payment(),
            voucher: StageConfig::voucher(),
            sms: StageConfig::sms(),
            pipeline: PipelineConfig::default(),
            catalog: Vec::new(),
        }
    }
}

impl WifiPayConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, stage) in [
            ("payment", &self.payment),
            ("voucher", &self.voucher),
            ("sms", &self.sms),
        ] {
            if !(0.0..=1.0).contains(&stage.success_probability) {
                return Err(WifiPayError::InvalidConfig(format!(
                    "{name}.success_probability must be between 0 and 1, got {}",
                    stage.success_probability
                )));
            }
        }
        if self.country_code.trim_start_matches('+').is_empty()
            || !self
                .country_code
                .trim_start_matches('+')
                .chars()
                .all(|c| c.is_ascii_digit())
        {
            return Err(WifiPayError::InvalidConfig(format!(
                "country_code must be digits, got {:?}",
                self.country_code
            )));
        }
        if self.pipeline.stage_timeout_ms == Some(0) {
            return Err(WifiPayError::InvalidConfig(
                "pipeline.stage_timeout_ms must be positive".to_string(),
            ));
        }
        self.catalog()?;
        Ok(())
    }

    pub fn catalog(&self) -> Result<Catalog> {
        if self.catalog.is_empty() {
            Ok(Catalog::standard())
        } else {
            Catalog::from_entries(self.catalog.clone())
        }
    }

    pub fn stage_timeout(&self) -> Option<Duration> {
        self.pipeline.stage_timeout_ms.map(Duration::from_millis)
    }

    /// Same settings with every simulated delay removed.
    pub fn instant(mut self) -> Self {
        for stage in [&mut self.payment, &mut self.voucher, &mut self.sms] {
            stage.delay_ms = 0;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::package::PackageType;

    #[test]
    fn test_empty_file_gives_reference_behaviour() {
        let config = WifiPayConfig::from_toml("").unwrap();
        assert_eq!(config, WifiPayConfig::default());
        assert_eq!(config.payment.delay(), Duration::from_secs(2));
        assert_eq!(config.payment.success_probability, 0.9);
        assert_eq!(config.sms.delay(), Duration::from_millis(1500));
        assert_eq!(config.stage_timeout(), None);
    }

    #[test]
    fn test_partial_override() {
        let toml_str = r#"
country_code = "254"

[payment]
delay_ms = 10
success_probability = 0.5

[sms]
delay_ms = 0

[pipeline]
stage_timeout_ms = 500
"#;
        let config = WifiPayConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.country_code, "254");
        assert_eq!(config.payment.delay_ms, 10);
        assert_eq!(config.payment.success_probability, 0.5);
        assert_eq!(config.sms.success_probability, 1.0);
        assert_eq!(config.voucher.delay_ms, 1000);
        assert_eq!(config.stage_timeout(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_section_keeps_reference_values_for_omitted_keys() {
        let config = WifiPayConfig::from_toml("[payment]\ndelay_ms = 10\n").unwrap();
        assert_eq!(config.payment.delay_ms, 10);
        assert_eq!(config.payment.success_probability, 0.9);

        let config = WifiPayConfig::from_toml("[voucher]\nsuccess_probability = 0.5\n").unwrap();
        assert_eq!(config.voucher.delay_ms, 1000);
        assert_eq!(config.voucher.success_probability, 0.5);

        let config = WifiPayConfig::from_toml("[sms]\n").unwrap();
        assert_eq!(config.sms, StageConfig::sms());
    }

    #[test]
    fn test_rejects_out_of_range_probability() {
        let result = WifiPayConfig::from_toml("[voucher]\ndelay_ms = 0\nsuccess_probability = 1.5\n");
        assert!(matches!(result, Err(WifiPayError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_unparseable_file() {
        let result = WifiPayConfig::from_toml("[payment\n");
        assert!(matches!(result, Err(WifiPayError::ConfigError(_))));
    }

    #[test]
    fn test_custom_catalog() {
        let toml_str = r#"
[[catalog]]
package_type = "1hour"
price = 500
display_name = "Quick Hour"

[[catalog]]
package_type = "one-day"
price = 3000
display_name = "Day Pass"
"#;
        let config = WifiPayConfig::from_toml(toml_str).unwrap();
        let catalog = config.catalog().unwrap();
        assert_eq!(catalog.get(PackageType::OneHour).unwrap().price(), 500);
        assert_eq!(catalog.get(PackageType::OneDay).unwrap().display_name(), "Day Pass");
        assert!(catalog.get(PackageType::OneMonth).is_none());
    }

    #[test]
    fn test_rejects_zero_price_catalog() {
        let toml_str = r#"
[[catalog]]
package_type = "1hour"
price = 0
display_name = "Free"
"#;
        assert!(WifiPayConfig::from_toml(toml_str).is_err());
    }

    #[test]
    fn test_instant_clears_delays() {
        let config = WifiPayConfig::default().instant();
        assert_eq!(config.payment.delay_ms, 0);
        assert_eq!(config.voucher.delay_ms, 0);
        assert_eq!(config.sms.delay_ms, 0);
        assert_eq!(config.payment.success_probability, 0.9);
    }
}
