use crate::config::ClientConfig;
use crate::entity::{Entity, Schema};

use super::resource;

pub static USER: Schema = Schema {
    hidden: &["email", "mfa_enabled", "premium_type"],
    ..Schema::new("User")
};

#[derive(Debug, Clone, PartialEq)]
pub struct User(Entity);

resource!(User, USER);

impl User {
    /// `username#discriminator`, if both are set and non-empty.
    pub fn name(&self) -> Option<String> {
        let username = self.get_str("username").filter(|s| !s.is_empty())?;
        let discriminator = self.get_str("discriminator").filter(|s| !s.is_empty())?;
        Some(format!("{}#{}", username, discriminator))
    }

    pub fn is_bot(&self) -> bool {
        self.get_bool("bot").unwrap_or(false)
    }

    /// Custom avatar on the CDN; animated hashes (`a_`) get a `.gif`.
    pub fn avatar_url(&self, config: &ClientConfig) -> Option<String> {
        let id = self.id()?;
        let hash = self.get_str("avatar").filter(|s| !s.is_empty())?;
        let ext = if hash.starts_with("a_") { "gif" } else { "png" };
        Some(format!("{}avatars/{}/{}.{}", config.cdn_url(), id, hash, ext))
    }
}
