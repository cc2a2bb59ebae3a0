use std::collections::HashMap;
use std::ops::Deref;

use log::{debug, warn};
use reqwest::Method;
use serde_json::Value;

use crate::entity::{Cast, Field, LoadMode, Model, ModelSchema, Schema};
use crate::error::{ClientError, Result};

use super::constants::ChannelType;
use super::{nested_list, Message, Remote, Resource, User, USER};

pub const MIN_MESSAGE_LIMIT: usize = 5;
pub const MAX_MESSAGE_LIMIT: usize = 50;
pub const DEFAULT_MESSAGE_COUNT: usize = 10;

pub static CHANNEL: ModelSchema = ModelSchema {
    entity: Schema {
        readonly: true,
        hidden: &["permission_overwrites"],
        cast: &[Cast {
            target: &USER,
            fields: &["recipients"],
        }],
        ..Schema::new("Channel")
    },
    endpoint: "channels",
    load_mode: LoadMode::Lazy,
};

/// A text, voice or DM channel, plus the messages read from it so far.
///
/// The message cache only grows: messages are kept oldest first and a message
/// ID is stored once no matter how often it is fetched.
#[derive(Debug)]
pub struct Channel {
    model: Model,
    messages: Vec<Message>,
    index: HashMap<String, usize>,
    cursor: Option<String>,
}

impl Remote for Channel {
    fn schema() -> &'static ModelSchema {
        &CHANNEL
    }

    fn wrap(model: Model) -> Self {
        Self {
            model,
            messages: Vec::new(),
            index: HashMap::new(),
            cursor: None,
        }
    }

    fn model(&self) -> &Model {
        &self.model
    }
}

impl Deref for Channel {
    type Target = Model;

    fn deref(&self) -> &Self::Target {
        &self.model
    }
}

impl Channel {
    pub async fn channel_type(&self) -> Result<Option<ChannelType>> {
        Ok(self
            .get("type")
            .await?
            .and_then(Field::as_u64)
            .and_then(ChannelType::from_value))
    }

    /// DM recipients; empty for server channels.
    pub async fn recipients(&self) -> Result<Vec<User>> {
        Ok(nested_list(self.load().await?, "recipients"))
    }

    /// ID of the newest message read so far.
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn cached_messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message(&self, id: &str) -> Option<&Message> {
        self.index.get(id).map(|&pos| &self.messages[pos])
    }

    /// Fetches up to `count` messages (clamped to 5..=50) and returns how many
    /// the API sent back.
    ///
    /// Reads after `after` when given, else after the cursor, else the latest
    /// messages. Every ingested message advances the cursor.
    pub async fn load_messages(&mut self, count: usize, after: Option<&str>) -> Result<usize> {
        let limit = count.clamp(MIN_MESSAGE_LIMIT, MAX_MESSAGE_LIMIT);
        let mut params = vec![("limit", limit.to_string())];
        let after = after
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .or_else(|| self.cursor.clone());
        if let Some(after) = after {
            params.push(("after", after));
        }

        let path = self.messages_path();
        let items = match self.model.context().http.get(&path, &params).await? {
            Value::Array(items) => items,
            other => {
                return Err(ClientError::Api(format!(
                    "Unexpected response for {}: {}",
                    path, other
                )))
            }
        };

        let fetched = items.len();
        // The API answers newest first.
        for item in items.into_iter().rev() {
            let message = match item {
                Value::Object(map) => Message::from_map(map),
                other => {
                    warn!("{}: skipping non-object message {}", path, other);
                    continue;
                }
            };
            let Some(id) = message.id().map(str::to_string) else {
                warn!("{}: skipping message without id", path);
                continue;
            };
            if !self.index.contains_key(&id) {
                self.index.insert(id.clone(), self.messages.len());
                self.messages.push(message);
            }
            self.cursor = Some(id);
        }
        debug!(
            "channel {}: fetched {} messages, {} cached",
            self.model.id(),
            fetched,
            self.messages.len()
        );
        Ok(fetched)
    }

    /// Cached messages, loading them first if the cache is empty.
    ///
    /// With `after`, pages of 50 are read forward from that ID until a short
    /// page comes back; without it, the latest 10 messages are read.
    pub async fn messages(&mut self, after: Option<&str>) -> Result<&[Message]> {
        if self.messages.is_empty() {
            match after.filter(|id| !id.is_empty()) {
                Some(id) => {
                    let mut start = Some(id);
                    while self.load_messages(MAX_MESSAGE_LIMIT, start.take()).await? == MAX_MESSAGE_LIMIT {}
                }
                None => {
                    self.load_messages(DEFAULT_MESSAGE_COUNT, None).await?;
                }
            }
        }
        Ok(&self.messages)
    }

    /// Posts `message` here. The API's answer must be a message with an ID;
    /// anything else is returned as [`ClientError::Api`] with the raw body.
    pub async fn send_message(&self, message: &Message) -> Result<Message> {
        let path = self.messages_path();
        let body = message.to_wire_json().to_string();
        let response = self
            .model
            .context()
            .http
            .custom_request(
                &path,
                Method::POST,
                Some(body),
                &[("Content-Type", "application/json")],
            )
            .await?;

        match response {
            Value::Object(map) if map.contains_key("id") => Ok(Message::from_map(map)),
            other => Err(ClientError::Api(format!(
                "Message was not created, response: {}",
                other
            ))),
        }
    }

    fn messages_path(&self) -> String {
        format!("channels/{}/messages", self.model.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRest;
    use serde_json::json;

    const MESSAGES: &str = "channels/5/messages";

    async fn channel(rest: &MockRest) -> Channel {
        let model = Model::connect(rest.context(), &CHANNEL, "5", LoadMode::Lazy)
            .await
            .unwrap();
        Channel::wrap(model)
    }

    /// Newest first, like the API.
    fn page(ids: impl DoubleEndedIterator<Item = u64>) -> Value {
        Value::Array(
            ids.rev()
                .map(|id| json!({"id": id.to_string(), "content": format!("m{}", id)}))
                .collect(),
        )
    }

    fn ids(messages: &[Message]) -> Vec<String> {
        messages
            .iter()
            .filter_map(|m| m.id().map(str::to_string))
            .collect()
    }

    #[tokio::test]
    async fn test_load_messages_clamps_and_orders() {
        let rest = MockRest::new().on_get(MESSAGES, page(1..=3));
        let mut channel = channel(&rest).await;

        assert_eq!(channel.load_messages(3, None).await.unwrap(), 3);
        assert_eq!(ids(channel.cached_messages()), ["1", "2", "3"]);
        assert_eq!(channel.cursor(), Some("3"));
        assert_eq!(channel.message("2").unwrap().content(), Some("m2"));
        assert!(!channel.is_loaded());

        let calls = rest.calls();
        assert_eq!(calls[0].path, MESSAGES);
        assert_eq!(calls[0].param("limit"), Some("5"));
        assert_eq!(calls[0].param("after"), None);

        channel.load_messages(500, Some("")).await.unwrap();
        let calls = rest.calls();
        assert_eq!(calls[1].param("limit"), Some("50"));
        assert_eq!(calls[1].param("after"), Some("3"));
    }

    #[tokio::test]
    async fn test_repeated_loads_do_not_duplicate() {
        let rest = MockRest::new().on_get(MESSAGES, page(1..=3));
        let mut channel = channel(&rest).await;
        channel.load_messages(10, None).await.unwrap();
        channel.load_messages(10, Some("1")).await.unwrap();
        assert_eq!(ids(channel.cached_messages()), ["1", "2", "3"]);
        assert_eq!(rest.calls()[1].param("after"), Some("1"));
    }

    #[tokio::test]
    async fn test_malformed_items_are_skipped() {
        let rest = MockRest::new().on_get(
            MESSAGES,
            json!([{"id": "2"}, "junk", {"content": "no id"}, {"id": "1"}]),
        );
        let mut channel = channel(&rest).await;
        assert_eq!(channel.load_messages(10, None).await.unwrap(), 4);
        assert_eq!(ids(channel.cached_messages()), ["1", "2"]);
        assert_eq!(channel.cursor(), Some("2"));
    }

    #[tokio::test]
    async fn test_non_array_response_is_an_error() {
        let rest = MockRest::new().on_get(MESSAGES, json!({"message": "Missing Access"}));
        let mut channel = channel(&rest).await;
        assert!(matches!(
            channel.load_messages(10, None).await,
            Err(ClientError::Api(_))
        ));
        assert!(channel.cursor().is_none());
    }

    #[tokio::test]
    async fn test_messages_defaults_to_latest_ten_once() {
        let rest = MockRest::new().on_get(MESSAGES, page(1..=10));
        let mut channel = channel(&rest).await;
        assert_eq!(channel.messages(None).await.unwrap().len(), 10);
        assert_eq!(channel.messages(None).await.unwrap().len(), 10);

        let calls = rest.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].param("limit"), Some("10"));
    }

    #[tokio::test]
    async fn test_messages_pages_forward_until_short_page() {
        let rest = MockRest::new()
            .on_get(MESSAGES, page(101..=150))
            .on_get(MESSAGES, page(151..=152));
        let mut channel = channel(&rest).await;

        let messages = channel.messages(Some("100")).await.unwrap();
        assert_eq!(messages.len(), 52);
        assert_eq!(messages[0].id(), Some("101"));
        assert_eq!(messages[51].id(), Some("152"));

        let calls = rest.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].param("after"), Some("100"));
        assert_eq!(calls[1].param("after"), Some("150"));
        assert_eq!(channel.cursor(), Some("152"));
    }

    #[tokio::test]
    async fn test_send_message_posts_json() {
        let rest = MockRest::new().on(
            Method::POST,
            MESSAGES,
            json!({"id": "9", "content": "hi", "author": {"id": "1"}}),
        );
        let channel = channel(&rest).await;
        let mut draft = Message::empty();
        draft.set("content", "hi").unwrap();

        let sent = draft.send(&channel).await.unwrap();
        assert_eq!(sent.id(), Some("9"));
        assert_eq!(sent.author().unwrap().id(), Some("1"));

        let call = &rest.calls()[0];
        assert_eq!(call.method, Method::POST);
        assert_eq!(call.body.as_deref(), Some(r#"{"content":"hi"}"#));
        assert_eq!(
            call.headers,
            [("Content-Type".to_string(), "application/json".to_string())]
        );
    }

    #[tokio::test]
    async fn test_send_message_without_id_returns_raw_body() {
        let rest = MockRest::new().on(
            Method::POST,
            MESSAGES,
            json!({"code": 50006, "message": "Cannot send an empty message"}),
        );
        let channel = channel(&rest).await;
        match channel.send_message(&Message::empty()).await {
            Err(ClientError::Api(body)) => assert!(body.contains("Cannot send an empty message")),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_channel_fields_load_lazily() {
        let rest = MockRest::new().on_get(
            "channels/5",
            json!({
                "id": "5",
                "type": 1,
                "permission_overwrites": [],
                "recipients": [{"id": "7", "username": "bo", "discriminator": "0002"}]
            }),
        );
        let channel = channel(&rest).await;
        assert_eq!(channel.channel_type().await.unwrap(), Some(ChannelType::Dm));
        let recipients = channel.recipients().await.unwrap();
        assert_eq!(recipients[0].name().as_deref(), Some("bo#0002"));
        assert!(channel.get("permission_overwrites").await.unwrap().is_none());
        assert_eq!(rest.calls().len(), 1);
    }
}
