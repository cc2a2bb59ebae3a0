use std::collections::HashMap;

use crate::entity::{ModelSchema, Schema};
use crate::error::{ClientError, Result};
use crate::model::{CHANNEL, EMBED, MEMBER, MESSAGE, SERVER, USER};

/// What a registered name resolves to.
#[derive(Debug, Clone, Copy)]
pub enum Registration {
    Entity(&'static Schema),
    Model(&'static ModelSchema),
}

impl Registration {
    pub fn name(&self) -> &'static str {
        match self {
            Registration::Entity(schema) => schema.name,
            Registration::Model(schema) => schema.entity.name,
        }
    }
}

/// Short resource name → schema, filled in once at startup.
///
/// Names are matched case-insensitively and may carry a `Discord` prefix, so
/// `"message"`, `"Message"` and `"DiscordMessage"` are the same type.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: HashMap<String, Registration>,
}

impl Registry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// All resource types shipped with the crate.
    pub fn builtin() -> Self {
        let entities: [(&str, &'static Schema); 4] = [
            ("user", &USER),
            ("member", &MEMBER),
            ("embed", &EMBED),
            ("message", &MESSAGE),
        ];
        let models: [(&str, &'static ModelSchema); 3] = [
            ("channel", &CHANNEL),
            ("server", &SERVER),
            ("guild", &SERVER),
        ];

        let mut entries = HashMap::new();
        for (name, schema) in entities {
            entries.insert(name.to_string(), Registration::Entity(schema));
        }
        for (name, schema) in models {
            entries.insert(name.to_string(), Registration::Model(schema));
        }
        Self { entries }
    }

    pub fn register_entity(&mut self, name: &str, schema: &'static Schema) -> Result<()> {
        self.register(name, Registration::Entity(schema))
    }

    pub fn register_model(&mut self, name: &str, schema: &'static ModelSchema) -> Result<()> {
        self.register(name, Registration::Model(schema))
    }

    fn register(&mut self, name: &str, registration: Registration) -> Result<()> {
        let key = normalize(name);
        if key.is_empty() {
            return Err(ClientError::Configuration("Type name required".into()));
        }
        if let Some(existing) = self.entries.get(&key) {
            return Err(ClientError::Configuration(format!(
                "Type \"{}\" is already registered as {}",
                key,
                existing.name()
            )));
        }
        self.entries.insert(key, registration);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<Registration> {
        self.entries
            .get(&normalize(name))
            .copied()
            .ok_or_else(|| ClientError::UnknownType(name.to_string()))
    }

    /// Fails for models too; those go through `connect_model`.
    pub fn entity_schema(&self, name: &str) -> Result<&'static Schema> {
        match self.resolve(name)? {
            Registration::Entity(schema) => Ok(schema),
            Registration::Model(schema) => Err(ClientError::UnknownType(format!(
                "{} is a remote model, use connect_model",
                schema.entity.name
            ))),
        }
    }

    pub fn model_schema(&self, name: &str) -> Result<&'static ModelSchema> {
        match self.resolve(name)? {
            Registration::Model(schema) => Ok(schema),
            Registration::Entity(schema) => Err(ClientError::UnknownType(format!(
                "{} is not a remote model, use create_entity",
                schema.name
            ))),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

fn normalize(name: &str) -> String {
    let name = name.trim().to_lowercase();
    match name.strip_prefix("discord") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::LoadMode;

    static WIDGET: Schema = Schema::new("Widget");
    static REMOTE_WIDGET: ModelSchema = ModelSchema {
        entity: Schema {
            readonly: true,
            ..Schema::new("RemoteWidget")
        },
        endpoint: "widgets",
        load_mode: LoadMode::Lazy,
    };

    #[test]
    fn test_names_resolve_case_insensitively() {
        let registry = Registry::builtin();
        for name in ["message", "Message", "MESSAGE", "DiscordMessage", " discordmessage "] {
            assert!(std::ptr::eq(registry.entity_schema(name).unwrap(), &MESSAGE));
        }
        assert!(std::ptr::eq(registry.model_schema("guild").unwrap(), &SERVER));
    }

    #[test]
    fn test_unknown_and_wrong_category_fail() {
        let registry = Registry::builtin();
        assert!(matches!(registry.resolve("emoji"), Err(ClientError::UnknownType(_))));
        assert!(matches!(registry.resolve("discord"), Err(ClientError::UnknownType(_))));
        assert!(matches!(registry.entity_schema("channel"), Err(ClientError::UnknownType(_))));
        assert!(matches!(registry.model_schema("user"), Err(ClientError::UnknownType(_))));
    }

    #[test]
    fn test_register_custom_types() {
        let mut registry = Registry::empty();
        registry.register_entity("Widget", &WIDGET).unwrap();
        registry.register_model("remote_widget", &REMOTE_WIDGET).unwrap();
        assert!(registry.entity_schema("widget").is_ok());
        assert!(registry.model_schema("DiscordRemote_Widget").is_ok());
        assert!(matches!(
            registry.register_model("widget", &REMOTE_WIDGET),
            Err(ClientError::Configuration(_))
        ));
        assert!(matches!(
            registry.register_entity("  ", &WIDGET),
            Err(ClientError::Configuration(_))
        ));
        assert_eq!(registry.names().count(), 2);
    }
}
