use crate::domain::checkout::CheckoutFailure;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WifiPayError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Checkout failed: {0}")]
    CheckoutError(#[from] CheckoutFailure),
}

pub type Result<T> = std::result::Result<T, WifiPayError>;
