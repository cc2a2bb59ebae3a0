//! Resource types of the Discord Web API.
//!
//! Each type is a thin wrapper that supplies a schema to the generic
//! [`Entity`]/[`Model`] engine, plus whatever behavior is specific to it.

mod channel;
pub mod constants;
mod embed;
mod member;
mod message;
mod server;
mod user;

use serde_json::{Map, Value};

use crate::entity::{Entity, Model, ModelSchema, Schema};
use crate::error::{ClientError, Result};

pub use channel::{Channel, CHANNEL, DEFAULT_MESSAGE_COUNT, MAX_MESSAGE_LIMIT, MIN_MESSAGE_LIMIT};
pub use embed::{Embed, EmbedBuilder, EMBED};
pub use member::{Member, MEMBER};
pub use message::{Message, MESSAGE};
pub use server::{Server, SERVER};
pub use user::{User, USER};

/// A locally built resource backed by an [`Entity`].
pub trait Resource: Sized {
    fn schema() -> &'static Schema;

    /// Wraps an entity without checking its schema.
    #[doc(hidden)]
    fn wrap(entity: Entity) -> Self;

    fn entity(&self) -> &Entity;

    fn entity_mut(&mut self) -> &mut Entity;

    fn into_entity(self) -> Entity;

    fn from_map(data: Map<String, Value>) -> Self {
        Self::wrap(Entity::new(Self::schema(), data))
    }

    fn empty() -> Self {
        Self::wrap(Entity::empty(Self::schema()))
    }

    /// Fails with [`ClientError::UnknownType`] if `entity` is of another type.
    fn from_entity(entity: Entity) -> Result<Self> {
        if std::ptr::eq(entity.schema(), Self::schema()) {
            Ok(Self::wrap(entity))
        } else {
            Err(ClientError::UnknownType(format!(
                "expected {}, got {}",
                Self::schema().name,
                entity.kind()
            )))
        }
    }
}

/// A resource fetched from the REST API by identifier.
pub trait Remote: Sized {
    fn schema() -> &'static ModelSchema;

    #[doc(hidden)]
    fn wrap(model: Model) -> Self;

    fn model(&self) -> &Model;
}

/// Nested entity of type `T` held in `field`, cloned out of its parent.
pub(crate) fn nested<T: Resource>(parent: &Entity, field: &str) -> Option<T> {
    parent
        .get_entity(field)
        .and_then(|entity| T::from_entity(entity.clone()).ok())
}

/// Every entity of type `T` in a cast list field.
pub(crate) fn nested_list<T: Resource>(parent: &Entity, field: &str) -> Vec<T> {
    parent
        .get_list(field)
        .unwrap_or_default()
        .iter()
        .filter_map(|item| item.as_entity())
        .filter_map(|entity| T::from_entity(entity.clone()).ok())
        .collect()
}

macro_rules! resource {
    ($name:ident, $schema:ident) => {
        impl $crate::model::Resource for $name {
            fn schema() -> &'static $crate::entity::Schema {
                &$schema
            }

            fn wrap(entity: $crate::entity::Entity) -> Self {
                Self(entity)
            }

            fn entity(&self) -> &$crate::entity::Entity {
                &self.0
            }

            fn entity_mut(&mut self) -> &mut $crate::entity::Entity {
                &mut self.0
            }

            fn into_entity(self) -> $crate::entity::Entity {
                self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = $crate::entity::Entity;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serde::Serialize::serialize(&self.0, serializer)
            }
        }
    };
}

pub(crate) use resource;
