//! In-memory REST and gateway doubles for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::client::Context;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::gateway::{GatewayConnector, GatewayOptions, GatewaySocket};
use crate::http::RestTransport;

#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub params: Vec<(String, String)>,
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl Call {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
struct RestState {
    responses: HashMap<(Method, String), VecDeque<Value>>,
    calls: Vec<Call>,
}

/// Replays canned responses per `(method, path)`. The last queued response
/// for a route is repeated; unknown routes answer `HTTP 404`.
#[derive(Clone)]
pub struct MockRest {
    token: String,
    state: Arc<Mutex<RestState>>,
}

impl MockRest {
    pub fn new() -> Self {
        Self {
            token: "test-token".to_string(),
            state: Arc::default(),
        }
    }

    pub fn on_get(self, path: &str, response: Value) -> Self {
        self.on(Method::GET, path, response)
    }

    pub fn on(self, method: Method, path: &str, response: Value) -> Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn context(&self) -> Context {
        Context {
            http: Arc::new(self.clone()),
            config: Arc::new(ClientConfig::default()),
        }
    }

    pub fn into_context(self) -> Context {
        self.context()
    }

    fn respond(&self, call: Call) -> Result<Value> {
        let mut state = self.state.lock().unwrap();
        let key = (call.method.clone(), call.path.clone());
        state.calls.push(call);
        let queue = match state.responses.get_mut(&key) {
            Some(queue) if !queue.is_empty() => queue,
            _ => return Err(ClientError::Api(format!("HTTP 404: no route for {}", key.1))),
        };
        if queue.len() > 1 {
            Ok(queue.pop_front().unwrap())
        } else {
            Ok(queue[0].clone())
        }
    }
}

#[async_trait]
impl RestTransport for MockRest {
    fn token(&self) -> &str {
        &self.token
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        self.respond(Call {
            method: Method::GET,
            path: path.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            body: None,
            headers: Vec::new(),
        })
    }

    async fn custom_request(
        &self,
        path: &str,
        method: Method,
        body: Option<String>,
        headers: &[(&str, &str)],
    ) -> Result<Value> {
        self.respond(Call {
            method,
            path: path.to_string(),
            params: Vec::new(),
            body,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        })
    }
}

#[derive(Default)]
struct SocketLog {
    connected_to: Option<String>,
    sent: Vec<String>,
}

/// Hands out a socket that replays `frames` in order and records sends.
#[derive(Clone, Default)]
pub struct MockConnector {
    frames: Vec<String>,
    refuse: bool,
    log: Arc<Mutex<SocketLog>>,
}

impl MockConnector {
    pub fn new<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            frames: frames.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub fn connected_to(&self) -> Option<String> {
        self.log.lock().unwrap().connected_to.clone()
    }

    pub fn sent(&self) -> Vec<String> {
        self.log.lock().unwrap().sent.clone()
    }
}

#[async_trait]
impl GatewayConnector for MockConnector {
    async fn connect(&self, url: &str, _options: &GatewayOptions) -> Result<Box<dyn GatewaySocket>> {
        if self.refuse {
            return Err(ClientError::Api("connection refused".into()));
        }
        self.log.lock().unwrap().connected_to = Some(url.to_string());
        Ok(Box::new(MockSocket {
            incoming: self.frames.iter().cloned().collect(),
            log: self.log.clone(),
        }))
    }
}

struct MockSocket {
    incoming: VecDeque<String>,
    log: Arc<Mutex<SocketLog>>,
}

#[async_trait]
impl GatewaySocket for MockSocket {
    async fn send(&mut self, text: String) -> Result<()> {
        self.log.lock().unwrap().sent.push(text);
        Ok(())
    }

    async fn receive(&mut self) -> Result<String> {
        self.incoming
            .pop_front()
            .ok_or_else(|| ClientError::gateway("Gateway connection closed"))
    }
}
