mod registry;

use std::sync::Arc;

use log::debug;
use serde_json::{Map, Value};

use crate::config::ClientConfig;
use crate::entity::{Entity, LoadMode, Model};
use crate::error::{ClientError, Result};
use crate::gateway::{GatewayConnector, GatewayOptions, Handshake, SessionInfo, TungsteniteConnector};
use crate::http::{Http, RestTransport};
use crate::model::{Remote, Resource};

pub use registry::{Registration, Registry};

/// Environment variable read by [`ClientBuilder::from_env`].
pub const TOKEN_ENV: &str = "DISCORD_TOKEN";

/// Shared, read-only handles every remote model carries.
#[derive(Clone)]
pub struct Context {
    pub http: Arc<dyn RestTransport>,
    pub config: Arc<ClientConfig>,
}

pub struct ClientBuilder {
    token: String,
    api_base_url: Option<String>,
    api_version: Option<u32>,
    cdn_url: Option<String>,
    gateway_options: GatewayOptions,
    registry: Option<Registry>,
    transport: Option<Arc<dyn RestTransport>>,
    connector: Option<Arc<dyn GatewayConnector>>,
}

impl ClientBuilder {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base_url: None,
            api_version: None,
            cdn_url: None,
            gateway_options: GatewayOptions::default(),
            registry: None,
            transport: None,
            connector: None,
        }
    }

    pub fn from_env() -> Result<Self> {
        let token = std::env::var(TOKEN_ENV)
            .map_err(|_| ClientError::Configuration(format!("Expected {} in environment", TOKEN_ENV)))?;
        Ok(Self::new(token))
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn api_version(mut self, version: u32) -> Self {
        self.api_version = Some(version);
        self
    }

    pub fn cdn_url(mut self, url: impl Into<String>) -> Self {
        self.cdn_url = Some(url.into());
        self
    }

    pub fn gateway_options(mut self, options: GatewayOptions) -> Self {
        self.gateway_options = options;
        self
    }

    /// Replaces the name table behind [`Client::create_entity`] and
    /// [`Client::connect_model`]. Nested casts and the typed
    /// `create`/`connect` calls use their static schemas regardless.
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sends REST calls through `transport` instead of the reqwest client.
    pub fn transport(mut self, transport: Arc<dyn RestTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn connector(mut self, connector: Arc<dyn GatewayConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn build(self) -> Result<Client> {
        if self.token.trim().is_empty() {
            return Err(ClientError::Configuration(
                "Discord application token required".into(),
            ));
        }

        let mut config = ClientConfig::default();
        if let Some(url) = &self.api_base_url {
            config.set_api_base_url(url)?;
        }
        if let Some(version) = self.api_version {
            config.set_api_version(version)?;
        }
        if let Some(url) = &self.cdn_url {
            config.set_cdn_url(url)?;
        }

        let http: Arc<dyn RestTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(Http::new(&self.token, &config)?),
        };
        debug!("client ready for {}", config.api_url());

        Ok(Client {
            ctx: Context {
                http,
                config: Arc::new(config),
            },
            registry: Arc::new(self.registry.unwrap_or_else(Registry::builtin)),
            connector: self
                .connector
                .unwrap_or_else(|| Arc::new(TungsteniteConnector)),
            gateway_options: self.gateway_options,
        })
    }
}

/// Entry point: builds entities from data, connects remote models by ID and
/// runs the gateway identify handshake.
#[derive(Clone)]
pub struct Client {
    ctx: Context,
    registry: Arc<Registry>,
    connector: Arc<dyn GatewayConnector>,
    gateway_options: GatewayOptions,
}

impl Client {
    pub fn builder(token: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(token)
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn config(&self) -> &ClientConfig {
        &self.ctx.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Builds a local entity of the named type. `None` gives an empty one.
    pub fn create_entity(&self, type_name: &str, data: Option<Map<String, Value>>) -> Result<Entity> {
        let schema = self.registry.entity_schema(type_name)?;
        Ok(match data {
            Some(data) => Entity::new(schema, data),
            None => Entity::empty(schema),
        })
    }

    /// Connects the named remote model, loading it as its schema declares.
    pub async fn connect_model(&self, type_name: &str, id: &str) -> Result<Model> {
        let schema = self.registry.model_schema(type_name)?;
        Model::connect(self.ctx.clone(), schema, id, schema.load_mode).await
    }

    pub fn create<T: Resource>(&self, data: Map<String, Value>) -> T {
        T::from_map(data)
    }

    pub async fn connect<T: Remote>(&self, id: &str) -> Result<T> {
        self.connect_with::<T>(id, T::schema().load_mode).await
    }

    pub async fn connect_with<T: Remote>(&self, id: &str, mode: LoadMode) -> Result<T> {
        let model = Model::connect(self.ctx.clone(), T::schema(), id, mode).await?;
        Ok(T::wrap(model))
    }

    /// Identifies the bot on the gateway. Do this once per bot, not once per
    /// process; nothing here stops a second run.
    pub async fn identify(&self, client_name: &str) -> Result<SessionInfo> {
        let mut handshake = Handshake::new(
            self.ctx.http.as_ref(),
            self.connector.as_ref(),
            self.ctx.config.api_version(),
            client_name,
        )
        .options(self.gateway_options.clone());
        handshake.run().await
    }
}
