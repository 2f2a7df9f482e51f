//! Application configuration loaded from the environment.

use crate::error::{Error, Result};
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub nats_url: Option<String>,
    /// Percentage applied to the order subtotal at checkout.
    pub tax_rate_percent: Decimal,
    pub currency: String,
    pub admin_email: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "8083".to_string());
        let port: u16 = port
            .parse()
            .map_err(|_| Error::Config(format!("invalid PORT value '{port}'")))?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| Error::Config("missing environment variable DATABASE_URL".into()))?;

        let tax_raw = env::var("TAX_RATE_PERCENT").unwrap_or_else(|_| "18".to_string());
        let tax_rate_percent = Decimal::from_str(&tax_raw)
            .map_err(|_| Error::Config(format!("invalid TAX_RATE_PERCENT value '{tax_raw}'")))?;
        if tax_rate_percent.is_sign_negative() {
            return Err(Error::Config("TAX_RATE_PERCENT must not be negative".into()));
        }

        let admin_email = env::var("ADMIN_EMAIL")
            .map_err(|_| Error::Config("missing environment variable ADMIN_EMAIL".into()))?;

        Ok(Self {
            bind_addr: format!("{host}:{port}"),
            database_url,
            nats_url: env::var("NATS_URL").ok(),
            tax_rate_percent,
            currency: env::var("CURRENCY").unwrap_or_else(|_| "INR".to_string()),
            admin_email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_database_url_is_config_error() {
        let prev = env::var("DATABASE_URL").ok();
        env::remove_var("DATABASE_URL");
        env::set_var("ADMIN_EMAIL", "admin@example.com");
        let err = AppConfig::from_env().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        if let Some(v) = prev {
            env::set_var("DATABASE_URL", v);
        }
    }
}
