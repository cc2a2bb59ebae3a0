//! One-shot gateway identify: fetch the gateway URL, connect, wait for
//! HELLO, send IDENTIFY, wait for READY.
//!
//! This is not an event loop. There's no heartbeat, resume or reconnect; the
//! socket is dropped as soon as READY has been read.

mod socket;

use log::{debug, warn};
use serde_json::{json, Map, Value};
use url::Url;

use crate::error::{ClientError, Result};
use crate::http::RestTransport;
use crate::model::{Resource, User};

pub use socket::{GatewayConnector, GatewayOptions, GatewaySocket, TungsteniteConnector, DEFAULT_TIMEOUT};

pub const OP_IDENTIFY: u64 = 2;
pub const OP_HELLO: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Idle,
    ConnectRequested,
    Connected,
    HelloReceived,
    IdentitySent,
    ReadyReceived,
    Done,
    Failed,
}

/// Session and bot data from the READY event, minus `_trace`.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionInfo(Map<String, Value>);

impl SessionInfo {
    pub fn session_id(&self) -> Option<&str> {
        self.0.get("session_id").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The bot's own account.
    pub fn user(&self) -> Option<User> {
        match self.0.get("user") {
            Some(Value::Object(map)) => Some(User::from_map(map.clone())),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

pub struct Handshake<'a> {
    http: &'a dyn RestTransport,
    connector: &'a dyn GatewayConnector,
    api_version: u32,
    client_name: String,
    options: GatewayOptions,
    state: HandshakeState,
}

impl<'a> Handshake<'a> {
    /// An empty `client_name` falls back to the crate name.
    pub fn new(
        http: &'a dyn RestTransport,
        connector: &'a dyn GatewayConnector,
        api_version: u32,
        client_name: &str,
    ) -> Self {
        let client_name = match client_name.trim() {
            "" => env!("CARGO_PKG_NAME").to_string(),
            name => name.to_string(),
        };
        Self {
            http,
            connector,
            api_version,
            client_name,
            options: GatewayOptions::default(),
            state: HandshakeState::Idle,
        }
    }

    pub fn options(mut self, options: GatewayOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Runs every step in order. Any failure leaves the handshake in
    /// [`HandshakeState::Failed`] and comes back as [`ClientError::Gateway`].
    pub async fn run(&mut self) -> Result<SessionInfo> {
        if self.state != HandshakeState::Idle {
            return Err(ClientError::gateway(format!(
                "Handshake cannot run from state {:?}",
                self.state
            )));
        }

        match self.drive().await {
            Ok(session) => {
                self.advance(HandshakeState::Done);
                Ok(session)
            }
            Err(err) => {
                self.advance(HandshakeState::Failed);
                Err(match err {
                    ClientError::Gateway { .. } => err,
                    other => ClientError::gateway(other.to_string()),
                })
            }
        }
    }

    async fn drive(&mut self) -> Result<SessionInfo> {
        self.advance(HandshakeState::ConnectRequested);
        let gateway = self.http.get("gateway/bot", &[]).await?;
        let url = match gateway.get("url").and_then(Value::as_str) {
            Some(url) if !url.trim().is_empty() => gateway_url(url, self.api_version)?,
            _ => {
                return Err(ClientError::gateway_with_payload(
                    "Gateway URL missing from response",
                    gateway.to_string(),
                ))
            }
        };

        let mut socket = self.connector.connect(url.as_str(), &self.options).await?;
        self.advance(HandshakeState::Connected);

        let raw = socket.receive().await?;
        let hello = parse_frame(&raw)?;
        if hello.get("op").and_then(Value::as_u64) != Some(OP_HELLO) {
            return Err(ClientError::gateway_with_payload(
                "Gateway server did not return the Hello opcode",
                raw,
            ));
        }
        self.advance(HandshakeState::HelloReceived);

        let identify = identify_payload(self.http.token(), &self.client_name);
        socket.send(identify.to_string()).await?;
        self.advance(HandshakeState::IdentitySent);

        let raw = socket.receive().await?;
        let mut ready = parse_frame(&raw)?;
        let is_ready = ready
            .get("t")
            .and_then(Value::as_str)
            .is_some_and(|t| t.eq_ignore_ascii_case("ready"));
        let mut data = match ready.remove("d") {
            Some(Value::Object(data)) if is_ready && has_value(&data, "session_id") => data,
            _ => {
                return Err(ClientError::gateway_with_payload(
                    "Gateway server did not return the Ready state",
                    raw,
                ))
            }
        };
        self.advance(HandshakeState::ReadyReceived);

        data.remove("_trace");
        Ok(SessionInfo(data))
    }

    fn advance(&mut self, next: HandshakeState) {
        debug!("gateway handshake {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

fn has_value(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).is_some_and(|v| !v.is_null())
}

/// `{url}?v={version}&encoding=json`
fn gateway_url(base: &str, api_version: u32) -> Result<Url> {
    let mut url = Url::parse(base.trim()).map_err(|e| {
        ClientError::gateway_with_payload(format!("Invalid gateway URL: {}", e), base)
    })?;
    url.query_pairs_mut()
        .append_pair("v", &api_version.to_string())
        .append_pair("encoding", "json");
    Ok(url)
}

fn identify_payload(token: &str, client_name: &str) -> Value {
    json!({
        "op": OP_IDENTIFY,
        "d": {
            "token": token,
            "properties": {
                "$os": std::env::consts::OS.to_lowercase(),
                "$browser": client_name,
                "$device": client_name,
            }
        }
    })
}

/// Validates a raw gateway frame: it must be non-blank, parse as a JSON
/// object and carry an `op` field.
fn parse_frame(raw: &str) -> Result<Map<String, Value>> {
    if is_blank_frame(raw) {
        return Err(ClientError::gateway_with_payload(
            "Gateway server is not responding",
            raw,
        ));
    }

    let value: Value = serde_json::from_str(raw).map_err(|_| {
        ClientError::gateway_with_payload("Bad response from gateway server", raw)
    })?;
    let frame = match value {
        Value::Object(frame) => frame,
        Value::Array(_) => {
            return Err(ClientError::gateway_with_payload(
                "Unexpected response from gateway server",
                raw,
            ))
        }
        _ => {
            return Err(ClientError::gateway_with_payload(
                "Bad response from gateway server",
                raw,
            ))
        }
    };
    if !has_value(&frame, "op") {
        warn!("gateway frame without opcode: {}", raw);
        return Err(ClientError::gateway_with_payload(
            "Unexpected response from gateway server",
            raw,
        ));
    }
    Ok(frame)
}

/// Empty, whitespace, or an empty object.
fn is_blank_frame(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty()
        || trimmed
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .is_some_and(|inner| inner.trim().is_empty())
}
