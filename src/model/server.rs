use std::ops::Deref;

use crate::entity::{LoadMode, Model, ModelSchema, Schema};
use crate::error::Result;

use super::constants::VerificationLevel;
use super::Remote;

pub static SERVER: ModelSchema = ModelSchema {
    entity: Schema {
        readonly: true,
        hidden: &["owner", "permissions", "embed_enabled", "embed_channel_id"],
        ..Schema::new("Server")
    },
    endpoint: "guilds",
    load_mode: LoadMode::Lazy,
};

/// A guild, fetched from `guilds/{id}`.
#[derive(Debug)]
pub struct Server(Model);

impl Remote for Server {
    fn schema() -> &'static ModelSchema {
        &SERVER
    }

    fn wrap(model: Model) -> Self {
        Self(model)
    }

    fn model(&self) -> &Model {
        &self.0
    }
}

impl Deref for Server {
    type Target = Model;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Server {
    pub async fn name(&self) -> Result<Option<&str>> {
        self.get_str("name").await
    }

    pub async fn verification_level(&self) -> Result<Option<VerificationLevel>> {
        Ok(self
            .load()
            .await?
            .get_u64("verification_level")
            .and_then(VerificationLevel::from_value))
    }

    /// Server icon on the CDN; animated hashes (`a_`) get a `.gif`.
    pub async fn icon_url(&self) -> Result<Option<String>> {
        let entity = self.load().await?;
        let Some(hash) = entity.get_str("icon").filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        let ext = if hash.starts_with("a_") { "gif" } else { "png" };
        Ok(Some(format!(
            "{}icons/{}/{}.{}",
            self.context().config.cdn_url(),
            self.id(),
            hash,
            ext
        )))
    }
}
