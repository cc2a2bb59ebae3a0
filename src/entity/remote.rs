use log::debug;
use serde_json::{Map, Value};
use tokio::sync::OnceCell;

use super::{Entity, Field, Schema};
use crate::client::Context;
use crate::error::{ClientError, Result};

/// When a model pulls its data from the REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// On the first field read.
    #[default]
    Lazy,
    /// As part of connecting.
    Eager,
}

/// Schema of a remote-backed resource.
#[derive(Debug)]
pub struct ModelSchema {
    /// Always declared `readonly`; models are never mutated locally.
    pub entity: Schema,
    /// Resource path the identifier is appended to, e.g. `channels`.
    pub endpoint: &'static str,
    pub load_mode: LoadMode,
}

/// An [`Entity`] fetched from `{endpoint}/{id}` at most once.
///
/// Until loaded, the model only knows its identifier. The first field read
/// performs the fetch; concurrent first reads share that one request.
pub struct Model {
    schema: &'static ModelSchema,
    ctx: Context,
    id: String,
    seed: Entity,
    loaded: OnceCell<Entity>,
}

/// Snowflakes are non-empty strings of ASCII digits.
pub fn validate_snowflake(id: &str) -> Result<()> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClientError::InvalidIdentifier(id.to_string()));
    }
    Ok(())
}

impl Model {
    pub async fn connect(
        ctx: Context,
        schema: &'static ModelSchema,
        id: impl Into<String>,
        mode: LoadMode,
    ) -> Result<Self> {
        let id = id.into();
        validate_snowflake(&id)?;

        let mut data = Map::new();
        data.insert("id".to_string(), Value::String(id.clone()));
        let model = Self {
            schema,
            ctx,
            seed: Entity::new(&schema.entity, data),
            id,
            loaded: OnceCell::new(),
        };

        if mode == LoadMode::Eager {
            model.load().await?;
        }
        Ok(model)
    }

    /// Known without a fetch.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &'static str {
        self.schema.entity.name
    }

    pub fn schema(&self) -> &'static ModelSchema {
        self.schema
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.initialized()
    }

    /// Whatever is held right now, without fetching.
    pub fn entity(&self) -> &Entity {
        self.loaded.get().unwrap_or(&self.seed)
    }

    /// Fetches the resource unless that already happened.
    pub async fn load(&self) -> Result<&Entity> {
        self.loaded.get_or_try_init(|| self.fetch()).await
    }

    /// Fetches again, replacing the held data.
    pub async fn reload(&mut self) -> Result<&Entity> {
        let entity = self.fetch().await?;
        self.loaded = OnceCell::new_with(Some(entity));
        Ok(self.entity())
    }

    pub async fn get(&self, name: &str) -> Result<Option<&Field>> {
        Ok(self.load().await?.get(name))
    }

    pub async fn get_str(&self, name: &str) -> Result<Option<&str>> {
        Ok(self.get(name).await?.and_then(Field::as_str))
    }

    pub async fn call(&self, method: &str) -> Result<Option<&Field>> {
        Ok(self.load().await?.call(method))
    }

    /// Models are read only; this always fails.
    pub fn set(&mut self, name: &str, _value: impl Into<Value>) -> Result<()> {
        Err(ClientError::ImmutableField {
            entity: self.schema.entity.name,
            field: name.to_lowercase(),
        })
    }

    pub fn to_json(&self) -> Value {
        self.entity().to_json()
    }

    async fn fetch(&self) -> Result<Entity> {
        let path = format!("{}/{}", self.schema.endpoint.trim_matches('/'), self.id);
        debug!("loading {} {}", self.schema.entity.name, self.id);

        let mut data = match self.ctx.http.get(&path, &[]).await? {
            Value::Object(map) => map,
            other => {
                return Err(ClientError::Api(format!(
                    "Unexpected response for {}: {}",
                    path, other
                )))
            }
        };
        data.entry("id")
            .or_insert_with(|| Value::String(self.id.clone()));
        Ok(Entity::new(&self.schema.entity, data))
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("kind", &self.schema.entity.name)
            .field("id", &self.id)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
