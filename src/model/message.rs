use chrono::{DateTime, FixedOffset};

use crate::entity::{Cast, Entity, Field, Schema};
use crate::error::Result;

use super::constants::MessageType;
use super::{nested, nested_list, resource, Channel, Embed, Member, Resource, User, EMBED, MEMBER, USER};

pub static MESSAGE: Schema = Schema {
    locked: &["author", "member", "type", "nonce", "pinned", "flags"],
    timestamps: &["timestamp", "edited_timestamp"],
    cast: &[
        Cast {
            target: &USER,
            fields: &["author"],
        },
        Cast {
            target: &MEMBER,
            fields: &["member"],
        },
        Cast {
            target: &EMBED,
            fields: &["embeds"],
        },
    ],
    ..Schema::new("Message")
};

/// A channel message, either received or drafted locally for sending.
#[derive(Debug, Clone, PartialEq)]
pub struct Message(Entity);

resource!(Message, MESSAGE);

impl Message {
    pub fn content(&self) -> Option<&str> {
        self.get_str("content")
    }

    pub fn author(&self) -> Option<User> {
        nested(&self.0, "author")
    }

    pub fn member(&self) -> Option<Member> {
        nested(&self.0, "member")
    }

    pub fn embeds(&self) -> Vec<Embed> {
        nested_list(&self.0, "embeds")
    }

    pub fn message_type(&self) -> Option<MessageType> {
        self.get_u64("type").and_then(MessageType::from_value)
    }

    pub fn timestamp(&self) -> Option<&DateTime<FixedOffset>> {
        self.get_timestamp("timestamp")
    }

    pub fn has_flag(&self, flag: u64) -> bool {
        self.get_u64("flags").is_some_and(|flags| flags & flag != 0)
    }

    /// Appends to `embeds` even though cast lists are otherwise locked.
    pub fn add_embed(&mut self, embed: Embed) {
        self.0.push("embeds", Field::from(embed.into_entity()));
    }

    /// Posts this message to `channel` and returns the created one.
    pub async fn send(&self, channel: &Channel) -> Result<Message> {
        channel.send_message(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::constants::message_flags;
    use crate::model::EmbedBuilder;
    use serde_json::{json, Value};

    fn message(value: Value) -> Message {
        Message::wrap(Entity::from_value(&MESSAGE, value))
    }

    fn sample() -> Message {
        message(json!({
            "id": "334385199974967042",
            "channel_id": "290926798999357250",
            "type": 0,
            "flags": 4,
            "content": "Supa Hot",
            "pinned": false,
            "author": {"id": "53908099506183680", "username": "Mason", "discriminator": "9999"},
            "member": {"nick": "mace", "joined_at": "2016-12-30T20:40:43.142000+00:00"},
            "embeds": [{"title": "one"}, {"title": "two"}],
            "timestamp": "2017-07-11T17:27:07.299000+00:00",
            "edited_timestamp": null
        }))
    }

    #[test]
    fn test_nested_resources() {
        let message = sample();
        assert_eq!(message.content(), Some("Supa Hot"));
        assert_eq!(message.author().unwrap().name().as_deref(), Some("Mason#9999"));
        assert!(message.member().unwrap().joined_at().is_some());
        let titles: Vec<_> = message
            .embeds()
            .iter()
            .map(|embed| embed.title().unwrap_or_default().to_string())
            .collect();
        assert_eq!(titles, ["one", "two"]);
        assert_eq!(message.message_type(), Some(MessageType::Default));
        assert!(message.has_flag(message_flags::SUPPRESS_EMBEDS));
        assert!(!message.has_flag(message_flags::URGENT));
        assert!(message.timestamp().is_some());
    }

    #[test]
    fn test_locked_fields() {
        let mut message = sample();
        for field in ["author", "member", "type", "nonce", "pinned", "flags", "embeds", "timestamp", "id", "channel_id"] {
            assert!(message.set(field, 1).is_err(), "{field} should be locked");
        }
        message.set("content", "edited").unwrap();
        message.set("edited_timestamp", "2017-07-12T00:00:00+00:00").unwrap();
        assert_eq!(message.content(), Some("edited"));
        assert!(message.get_timestamp("edited_timestamp").is_some());
    }

    #[test]
    fn test_add_embed_to_draft() {
        let mut draft = Message::empty();
        draft.set("content", "hello").unwrap();
        draft.add_embed(EmbedBuilder::new().title("first").build());
        draft.add_embed(EmbedBuilder::new().title("second").build());
        assert_eq!(draft.embeds().len(), 2);
        assert_eq!(
            draft.to_wire_json(),
            json!({"content": "hello", "embeds": [{"title": "first"}, {"title": "second"}]})
        );

        let mut received = message(json!({"embeds": []}));
        received.add_embed(Embed::builder().title("late").build());
        assert_eq!(received.embeds()[0].title(), Some("late"));
    }
}
