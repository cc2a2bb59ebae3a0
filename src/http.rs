use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Request executor the object model talks to.
///
/// Paths are relative to the versioned API root (`channels/123`,
/// `gateway/bot`). Both calls resolve to the decoded JSON body; an empty body
/// comes back as [`Value::Null`].
#[async_trait]
pub trait RestTransport: Send + Sync {
    fn token(&self) -> &str;

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value>;

    async fn custom_request(
        &self,
        path: &str,
        method: Method,
        body: Option<String>,
        headers: &[(&str, &str)],
    ) -> Result<Value>;
}

pub struct Http {
    client: reqwest::Client,
    pub base_url: String,
    token: String,
}

impl Http {
    pub fn new(token: &str, config: &ClientConfig) -> Result<Self> {
        install_crypto_provider();

        let mut headers = HeaderMap::new();
        let auth_value = HeaderValue::from_str(&format!("Bot {}", token))
            .map_err(|_| ClientError::Configuration("Token contains invalid header characters".into()))?;
        headers.insert(AUTHORIZATION, auth_value);
        let agent = HeaderValue::from_str(&config.user_agent())
            .map_err(|_| ClientError::Configuration("Invalid user agent".into()))?;
        headers.insert(USER_AGENT, agent);

        Ok(Self {
            client: reqwest::Client::builder().default_headers(headers).build()?,
            base_url: config.api_url(),
            token: token.to_string(),
        })
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        let raw = format!("{}{}", self.base_url, path.trim_start_matches('/'));
        let mut url = Url::parse(&raw)
            .map_err(|e| ClientError::Configuration(format!("Invalid request URL {:?}: {}", raw, e)))?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn decode(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Api(format!("HTTP {}: {}", status.as_u16(), text)));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Both reqwest and tungstenite sit on rustls; the first caller wins and later
/// calls are no-ops.
pub(crate) fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

#[async_trait]
impl RestTransport for Http {
    fn token(&self) -> &str {
        &self.token
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = self.url(path, params)?;
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        Self::decode(response).await
    }

    async fn custom_request(
        &self,
        path: &str,
        method: Method,
        body: Option<String>,
        headers: &[(&str, &str)],
    ) -> Result<Value> {
        let url = self.url(path, &[])?;
        debug!("{} {}", method, url);
        let mut request = self.client.request(method, url);
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ClientError::Configuration(format!("Invalid header name {:?}", name)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| ClientError::Configuration(format!("Invalid header value {:?}", value)))?;
            request = request.header(name, value);
        }
        if let Some(body) = body {
            request = request.body(body);
        }
        let response = request.send().await?;
        Self::decode(response).await
    }
}
