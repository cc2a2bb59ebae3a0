use chrono::{DateTime, FixedOffset};
use log::warn;
use serde_json::{json, Map, Value};

use super::{Entity, Schema};

/// Layout used for dates in [`Entity::to_json`]; it is also accepted back on
/// ingest so serialized entities can be fed through the factory again.
const STRUCTURED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const STRUCTURED_DATE_PARSE: &str = "%Y-%m-%d %H:%M:%S%.f %:z";

/// A single value held by an [`Entity`].
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// Scalars and anything without a declared conversion, passed through as-is.
    Json(Value),
    Timestamp(DateTime<FixedOffset>),
    Entity(Box<Entity>),
    /// A cast array. Objects became entities; other elements stay [`Field::Json`].
    List(Vec<Field>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Render {
    Structured,
    Wire,
}

impl Field {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Field::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_json().and_then(Value::as_str)
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_json().and_then(Value::as_u64)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_json().and_then(Value::as_i64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_json().and_then(Value::as_bool)
    }

    pub fn as_timestamp(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Field::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Field::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Field]> {
        match self {
            Field::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Field::Json(Value::Null))
    }

    /// Dates, nested entities and cast lists can't be overwritten through `set`.
    pub(crate) fn is_structured(&self) -> bool {
        match self {
            Field::Json(_) => false,
            Field::Timestamp(_) | Field::Entity(_) => true,
            Field::List(items) => items.iter().any(|item| matches!(item, Field::Entity(_))),
        }
    }

    pub fn to_json(&self) -> Value {
        self.render(Render::Structured)
    }

    pub(crate) fn render(&self, render: Render) -> Value {
        match self {
            Field::Json(value) => value.clone(),
            Field::Timestamp(ts) => match render {
                Render::Structured => json!({
                    "date": ts.format(STRUCTURED_DATE_FORMAT).to_string(),
                    "timezone": ts.format("%:z").to_string(),
                }),
                Render::Wire => Value::String(ts.to_rfc3339()),
            },
            Field::Entity(entity) => entity.render(render),
            Field::List(items) => Value::Array(items.iter().map(|item| item.render(render)).collect()),
        }
    }
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        Field::Json(value)
    }
}

impl From<DateTime<FixedOffset>> for Field {
    fn from(ts: DateTime<FixedOffset>) -> Self {
        Field::Timestamp(ts)
    }
}

impl From<Entity> for Field {
    fn from(entity: Entity) -> Self {
        Field::Entity(Box::new(entity))
    }
}

/// Applies the schema's conversions to one raw value: dates first, then casts.
pub(crate) fn materialize(schema: &Schema, name: &str, value: Value) -> Field {
    if schema.is_timestamp(name) {
        return to_timestamp(schema, name, value);
    }
    match schema.cast_target(name) {
        Some(target) => cast(target, value),
        None => Field::Json(value),
    }
}

fn to_timestamp(schema: &Schema, name: &str, value: Value) -> Field {
    if is_falsy(&value) {
        return Field::Json(value);
    }
    match parse_timestamp(&value) {
        Some(ts) => Field::Timestamp(ts),
        None => {
            warn!("{}.{}: unparseable date {}", schema.name, name, value);
            Field::Json(value)
        }
    }
}

/// Objects become entities of `target`; arrays get each object element cast.
/// Anything else, including empty arrays, is left alone.
fn cast(target: &'static Schema, value: Value) -> Field {
    match value {
        Value::Object(map) => Field::Entity(Box::new(Entity::new(target, map))),
        Value::Array(items) if !items.is_empty() => Field::List(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => Field::Entity(Box::new(Entity::new(target, map))),
                    other => Field::Json(other),
                })
                .collect(),
        ),
        other => Field::Json(other),
    }
}

pub(crate) fn parse_timestamp(value: &Value) -> Option<DateTime<FixedOffset>> {
    match value {
        Value::String(raw) => DateTime::parse_from_rfc3339(raw.trim()).ok(),
        Value::Object(map) => parse_structured(map),
        _ => None,
    }
}

fn parse_structured(map: &Map<String, Value>) -> Option<DateTime<FixedOffset>> {
    let date = map.get("date")?.as_str()?;
    let zone = map
        .get("timezone")
        .and_then(Value::as_str)
        .filter(|zone| !zone.is_empty())
        .unwrap_or("+00:00");
    DateTime::parse_from_str(&format!("{} {}", date, zone), STRUCTURED_DATE_PARSE).ok()
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty() || s == "0",
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(items) => items.is_empty(),
        Value::Object(_) => false,
    }
}
