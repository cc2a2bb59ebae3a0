//! Base URLs and API version the client talks to.

use url::Url;

use crate::error::{ClientError, Result};

pub const DEFAULT_API_BASE_URL: &str = "https://discord.com/api/";
pub const DEFAULT_API_VERSION: u32 = 10;
pub const DEFAULT_CDN_URL: &str = "https://cdn.discordapp.com/";

/// Sent in the `User-Agent` header, as the API asks bots to do.
pub const APP_URL: &str = "https://github.com/discord-web-rust/discord-web-rust";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_base_url: String,
    api_version: u32,
    cdn_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION,
            cdn_url: DEFAULT_CDN_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Versioned REST root, e.g. `https://discord.com/api/v10/`.
    pub fn api_url(&self) -> String {
        format!("{}v{}/", self.api_base_url, self.api_version)
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn api_version(&self) -> u32 {
        self.api_version
    }

    pub fn cdn_url(&self) -> &str {
        &self.cdn_url
    }

    pub fn set_api_base_url(&mut self, url: &str) -> Result<()> {
        self.api_base_url = normalize_url(url)?;
        Ok(())
    }

    pub fn set_api_version(&mut self, version: u32) -> Result<()> {
        if version == 0 {
            return Err(ClientError::Configuration("Invalid API version: 0".into()));
        }
        self.api_version = version;
        Ok(())
    }

    pub fn set_cdn_url(&mut self, url: &str) -> Result<()> {
        self.cdn_url = normalize_url(url)?;
        Ok(())
    }

    pub fn user_agent(&self) -> String {
        format!("DiscordBot ({}, v{})", APP_URL, APP_VERSION)
    }
}

/// Requires a scheme and a host; always returns the URL with one trailing slash.
fn normalize_url(raw: &str) -> Result<String> {
    let parsed = Url::parse(raw)
        .map_err(|e| ClientError::Configuration(format!("Invalid URL {:?}: {}", raw, e)))?;
    if !parsed.has_host() {
        return Err(ClientError::Configuration(format!("Invalid URL {:?}: missing host", raw)));
    }
    Ok(format!("{}/", raw.trim_end_matches('/')))
}
