use config::{Config, ConfigError, File};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Postgres {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct Platform {
    pub subsidy_amount: Decimal,
    pub utc_offset_hours: i32,
}

#[derive(Debug, Deserialize)]
pub struct Withdrawal {
    pub minimum_amount: Decimal,
    pub opens_at_hour: u32,
    pub closes_at_hour: u32,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub postgres: Postgres,
    pub platform: Platform,
    pub withdrawal: Withdrawal,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config.toml"))
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.platform.utc_offset_hours.abs() > 14 {
            return Err(ConfigError::Message(
                "platform.utc_offset_hours out of range".to_string(),
            ));
        }
        if self.withdrawal.opens_at_hour > 23
            || self.withdrawal.closes_at_hour > 23
            || self.withdrawal.opens_at_hour > self.withdrawal.closes_at_hour
        {
            return Err(ConfigError::Message(
                "withdrawal window hours out of range".to_string(),
            ));
        }
        if self.withdrawal.minimum_amount <= Decimal::ZERO {
            return Err(ConfigError::Message(
                "withdrawal.minimum_amount must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
