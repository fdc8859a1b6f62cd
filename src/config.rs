//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

use crate::error::ClientError;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_STORAGE_PATH: &str = ".pharmacy-session.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_FREE_SHIPPING_THRESHOLD: f64 = 50.0;
pub const DEFAULT_SHIPPING_FEE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

/// Flat-fee shipping, waived once the subtotal reaches `free_threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShippingPolicy {
    pub fee: f64,
    pub free_threshold: f64,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self { fee: DEFAULT_SHIPPING_FEE, free_threshold: DEFAULT_FREE_SHIPPING_THRESHOLD }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub storage_path: PathBuf,
    pub timeouts: Timeouts,
    pub shipping: ShippingPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_owned(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            timeouts: Timeouts::default(),
            shipping: ShippingPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `PHARMACY_API_URL`: remote API base URL (trailing `/` trimmed)
    /// - `PHARMACY_STORAGE_PATH`: session file location
    /// - `PHARMACY_REQUEST_TIMEOUT_SECS`: default 30
    /// - `PHARMACY_CONNECT_TIMEOUT_SECS`: default 10
    /// - `PHARMACY_SHIPPING_FEE`: default 5.0
    /// - `PHARMACY_FREE_SHIPPING_THRESHOLD`: default 50.0
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is not http(s) or a number fails to parse.
    pub fn from_env() -> Result<Self, ClientError> {
        let api_base_url = normalize_base_url(
            &std::env::var("PHARMACY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned()),
        )?;
        let storage_path = std::env::var("PHARMACY_STORAGE_PATH")
            .map_or_else(|_| PathBuf::from(DEFAULT_STORAGE_PATH), PathBuf::from);
        let timeouts = Timeouts {
            request_secs: env_parse("PHARMACY_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse("PHARMACY_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };
        let shipping = ShippingPolicy {
            fee: env_parse("PHARMACY_SHIPPING_FEE", DEFAULT_SHIPPING_FEE)?,
            free_threshold: env_parse("PHARMACY_FREE_SHIPPING_THRESHOLD", DEFAULT_FREE_SHIPPING_THRESHOLD)?,
        };
        Ok(Self { api_base_url, storage_path, timeouts, shipping })
    }
}

/// Trim trailing slashes and require an http(s) scheme.
///
/// # Errors
///
/// Returns `ClientError::Config` for anything that is not an http(s) URL.
pub fn normalize_base_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ClientError::Config(format!("PHARMACY_API_URL must be http(s): {raw}")));
    }
    Ok(trimmed.to_owned())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ClientError> {
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ClientError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ClientError::Config(format!("{key} is not a valid number: {raw}")))
}
