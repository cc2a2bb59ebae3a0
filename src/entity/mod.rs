//! Schema-driven wrapper around raw JSON resources.
//!
//! Every resource type declares a static [`Schema`]: which fields are dropped
//! on ingest, which are locked, which are dates and which are cast into nested
//! entities. [`Entity`] is the one generic container that applies those rules;
//! [`Model`] adds a lazily fetched remote backing.

mod field;
mod remote;

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{ClientError, Result};

pub use field::Field;
pub(crate) use field::Render;
pub use remote::{validate_snowflake, LoadMode, Model, ModelSchema};

pub type Snowflake = String;

/// Static field declarations for one resource type.
///
/// Field names are matched case-insensitively and must be declared lowercase.
#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    /// Rejects every `set`, not only locked fields.
    pub readonly: bool,
    pub hidden: &'static [&'static str],
    pub locked: &'static [&'static str],
    pub timestamps: &'static [&'static str],
    pub cast: &'static [Cast],
}

/// Fields whose objects (or arrays of objects) become entities of `target`.
#[derive(Debug)]
pub struct Cast {
    pub target: &'static Schema,
    pub fields: &'static [&'static str],
}

impl Schema {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            readonly: false,
            hidden: &[],
            locked: &[],
            timestamps: &[],
            cast: &[],
        }
    }

    pub fn is_hidden(&self, field: &str) -> bool {
        self.hidden.contains(&field)
    }

    /// Explicitly locked, or an identifier (`id`, `*_id`).
    pub fn is_locked(&self, field: &str) -> bool {
        is_identifier(field) || self.locked.contains(&field)
    }

    pub fn is_timestamp(&self, field: &str) -> bool {
        self.timestamps.contains(&field)
    }

    pub fn cast_target(&self, field: &str) -> Option<&'static Schema> {
        self.cast
            .iter()
            .find(|cast| cast.fields.contains(&field))
            .map(|cast| cast.target)
    }
}

fn is_identifier(field: &str) -> bool {
    field == "id" || field.ends_with("_id")
}

#[derive(Clone)]
pub struct Entity {
    schema: &'static Schema,
    fields: Vec<(String, Field)>,
}

impl Entity {
    /// Builds an entity from raw data: hidden fields are removed, dates
    /// converted and nested objects cast, in that order.
    pub fn new(schema: &'static Schema, data: Map<String, Value>) -> Self {
        let mut entity = Self::empty(schema);
        for (name, value) in data {
            let name = name.to_lowercase();
            if schema.is_hidden(&name) {
                continue;
            }
            let field = field::materialize(schema, &name, value);
            entity.insert(name, field);
        }
        entity
    }

    pub fn empty(schema: &'static Schema) -> Self {
        Self {
            schema,
            fields: Vec::new(),
        }
    }

    /// Like [`Entity::new`], but accepts any JSON value. Anything other than
    /// an object yields an empty entity.
    pub fn from_value(schema: &'static Schema, data: Value) -> Self {
        match data {
            Value::Object(map) => Self::new(schema, map),
            _ => Self::empty(schema),
        }
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Resource type name, e.g. `"Message"`.
    pub fn kind(&self) -> &'static str {
        self.schema.name
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        let name = name.to_lowercase();
        self.fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, field)| field)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Getter-style access: `getUsername`, `get_username` and `username`
    /// all read the `username` field. Unknown fields are `None`.
    pub fn call(&self, method: &str) -> Option<&Field> {
        let method = method.to_lowercase();
        let stripped = method
            .strip_prefix("get_")
            .or_else(|| method.strip_prefix("get").filter(|rest| !rest.is_empty()));
        stripped
            .and_then(|name| self.get(name))
            .or_else(|| self.get(&method))
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Field::as_str)
    }

    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(Field::as_u64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Field::as_bool)
    }

    pub fn get_timestamp(&self, name: &str) -> Option<&DateTime<FixedOffset>> {
        self.get(name).and_then(Field::as_timestamp)
    }

    pub fn get_entity(&self, name: &str) -> Option<&Entity> {
        self.get(name).and_then(Field::as_entity)
    }

    pub fn get_list(&self, name: &str) -> Option<&[Field]> {
        self.get(name).and_then(Field::as_list)
    }

    pub fn id(&self) -> Option<&str> {
        self.get_str("id")
    }

    /// Sets a field, running the same date/cast conversion as ingest.
    ///
    /// Fails with [`ClientError::ImmutableField`] when the entity is read
    /// only, or the field is an identifier, locked, hidden, or currently holds
    /// a date or nested entity.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let name = name.to_lowercase();
        let frozen = self.schema.readonly
            || self.schema.is_locked(&name)
            || self.schema.is_hidden(&name)
            || self.get(&name).is_some_and(Field::is_structured);
        if frozen {
            return Err(ClientError::ImmutableField {
                entity: self.schema.name,
                field: name,
            });
        }

        let field = field::materialize(self.schema, &name, value.into());
        self.insert(name, field);
        Ok(())
    }

    /// Appends to a list field, bypassing the lock rules. Resource types use
    /// this for their own mutators (e.g. adding embeds to a draft message).
    pub(crate) fn push(&mut self, name: &str, item: Field) {
        let name = name.to_lowercase();
        match self.fields.iter_mut().find(|(key, _)| *key == name) {
            Some((_, Field::List(items))) => items.push(item),
            Some((_, slot)) => {
                let mut items = match std::mem::replace(slot, Field::List(Vec::new())) {
                    Field::Json(Value::Array(values)) => {
                        values.into_iter().map(Field::Json).collect()
                    }
                    Field::Json(Value::Null) => Vec::new(),
                    other => vec![other],
                };
                items.push(item);
                *slot = Field::List(items);
            }
            None => self.fields.push((name, Field::List(vec![item]))),
        }
    }

    fn insert(&mut self, name: String, field: Field) {
        match self.fields.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = field,
            None => self.fields.push((name, field)),
        }
    }

    /// Field names in ingest order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(key, field)| (key.as_str(), field))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Current state as JSON. Dates come out as `{"date", "timezone"}`
    /// objects, which [`Entity::new`] reads back unchanged.
    pub fn to_json(&self) -> Value {
        self.render(Render::Structured)
    }

    /// Current state as the REST API expects it in request bodies (dates as
    /// RFC 3339 strings).
    pub fn to_wire_json(&self) -> Value {
        self.render(Render::Wire)
    }

    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }

    pub(crate) fn render(&self, render: Render) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(key, field)| (key.clone(), field.render(render)))
                .collect(),
        )
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.schema, other.schema) && self.fields == other.fields
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.schema.name)?;
        f.debug_map()
            .entries(self.fields.iter().map(|(key, field)| (key, field)))
            .finish()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json_string())
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
