//! Client configuration supplied by the host application.
//!
//! Hosts either hand over a JSON document (`from_json`) or rely on
//! `SNAPFIT_*` environment variables (`from_env`). Missing fields fall back
//! to the defaults below.

use serde::{Deserialize, Serialize};

use crate::client::SnapfitClient;
use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_IMAGE_EXTENSION: &str = "png";
/// Additional image-path requests allowed after the first one.
pub const DEFAULT_IMAGE_MAX_RETRIES: u32 = 8;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    pub image_extension: String,
    pub image_max_retries: u32,
    pub page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: None,
            image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
            image_max_retries: DEFAULT_IMAGE_MAX_RETRIES,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ClientConfig {
    pub fn from_json(raw: &str) -> Result<Self, ApiError> {
        serde_json::from_str(raw).map_err(|e| ApiError::InvalidConfig(e.to_string()))
    }

    /// Read `SNAPFIT_BASE_URL`, `SNAPFIT_ACCESS_TOKEN`,
    /// `SNAPFIT_IMAGE_EXTENSION`, `SNAPFIT_IMAGE_MAX_RETRIES` and
    /// `SNAPFIT_PAGE_SIZE`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let mut config = Self::default();
        if let Some(url) = lookup("SNAPFIT_BASE_URL") {
            config.base_url = url;
        }
        config.access_token = lookup("SNAPFIT_ACCESS_TOKEN");
        if let Some(ext) = lookup("SNAPFIT_IMAGE_EXTENSION") {
            config.image_extension = ext;
        }
        if let Some(raw) = lookup("SNAPFIT_IMAGE_MAX_RETRIES") {
            config.image_max_retries = parse_number("SNAPFIT_IMAGE_MAX_RETRIES", &raw)?;
        }
        if let Some(raw) = lookup("SNAPFIT_PAGE_SIZE") {
            config.page_size = parse_number("SNAPFIT_PAGE_SIZE", &raw)?;
        }
        Ok(config)
    }

    /// Build a request client from the URL and token in this configuration.
    pub fn client(&self) -> SnapfitClient {
        let client = SnapfitClient::new(&self.base_url);
        match &self.access_token {
            Some(token) => client.with_access_token(token.clone()),
            None => client,
        }
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u32, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::InvalidConfig(format!("{key} must be a non-negative integer, got {raw:?}")))
}
