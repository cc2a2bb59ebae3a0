use chrono::{DateTime, FixedOffset};
use serde_json::{json, Map, Value};

use crate::entity::{Entity, Schema};

use super::{resource, Resource};

pub static EMBED: Schema = Schema {
    timestamps: &["timestamp"],
    ..Schema::new("Embed")
};

/// Rich content attached to a message.
#[derive(Debug, Clone, PartialEq)]
pub struct Embed(Entity);

resource!(Embed, EMBED);

impl Embed {
    pub fn builder() -> EmbedBuilder {
        EmbedBuilder::new()
    }

    pub fn title(&self) -> Option<&str> {
        self.get_str("title")
    }

    pub fn timestamp(&self) -> Option<&DateTime<FixedOffset>> {
        self.get_timestamp("timestamp")
    }
}

#[derive(Debug, Default)]
pub struct EmbedBuilder(Map<String, Value>);

impl EmbedBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.insert("title".into(), Value::String(title.into()));
        self
    }
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.0.insert("description".into(), Value::String(desc.into()));
        self
    }
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.0.insert("url".into(), Value::String(url.into()));
        self
    }
    pub fn color(mut self, color: u64) -> Self {
        self.0.insert("color".into(), json!(color));
        self
    }
    pub fn timestamp(mut self, ts: DateTime<FixedOffset>) -> Self {
        self.0.insert("timestamp".into(), Value::String(ts.to_rfc3339()));
        self
    }
    pub fn footer(mut self, text: impl Into<String>, icon_url: Option<String>) -> Self {
        self.0
            .insert("footer".into(), json!({"text": text.into(), "icon_url": icon_url}));
        self
    }
    pub fn image(mut self, url: impl Into<String>) -> Self {
        self.0.insert("image".into(), json!({"url": url.into()}));
        self
    }
    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.0.insert("thumbnail".into(), json!({"url": url.into()}));
        self
    }
    pub fn author(mut self, name: impl Into<String>, url: Option<String>, icon_url: Option<String>) -> Self {
        self.0.insert(
            "author".into(),
            json!({"name": name.into(), "url": url, "icon_url": icon_url}),
        );
        self
    }
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        let entry = json!({"name": name.into(), "value": value.into(), "inline": inline});
        match self.0.get_mut("fields") {
            Some(Value::Array(fields)) => fields.push(entry),
            _ => {
                self.0.insert("fields".into(), Value::Array(vec![entry]));
            }
        }
        self
    }
    pub fn build(self) -> Embed {
        Embed::from_map(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_builder_produces_embed_entity() {
        let at = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2020, 5, 1, 10, 20, 30)
            .unwrap();
        let embed = EmbedBuilder::new()
            .title("Release")
            .color(0x5865F2)
            .timestamp(at)
            .field("a", "1", true)
            .field("b", "2", false)
            .footer("bye", None)
            .build();

        assert_eq!(embed.kind(), "Embed");
        assert_eq!(embed.title(), Some("Release"));
        assert_eq!(embed.timestamp(), Some(&at));
        assert_eq!(embed.to_json()["fields"][1]["name"], json!("b"));
        assert_eq!(embed.to_wire_json()["timestamp"], json!("2020-05-01T10:20:30+00:00"));
    }

    #[test]
    fn test_built_embed_date_is_locked() {
        let mut embed = Embed::builder()
            .timestamp(chrono::Utc::now().fixed_offset())
            .description("x")
            .build();
        assert!(embed.set("timestamp", "2020-01-01T00:00:00Z").is_err());
        embed.set("description", "y").unwrap();
        assert_eq!(embed.get_str("description"), Some("y"));
    }
}
