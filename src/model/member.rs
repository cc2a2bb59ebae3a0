use chrono::{DateTime, FixedOffset};

use crate::entity::{Cast, Entity, Schema};

use super::{nested, resource, User, USER};

pub static MEMBER: Schema = Schema {
    timestamps: &["joined_at", "premium_since"],
    cast: &[Cast {
        target: &USER,
        fields: &["user"],
    }],
    ..Schema::new("Member")
};

/// A user's membership in one server.
#[derive(Debug, Clone, PartialEq)]
pub struct Member(Entity);

resource!(Member, MEMBER);

impl Member {
    /// The member's Discord account, when the payload carries it.
    pub fn account(&self) -> Option<User> {
        nested(&self.0, "user")
    }

    /// Server nickname, falling back to the account's username.
    pub fn display_name(&self) -> Option<String> {
        if let Some(nick) = self.get_str("nick").filter(|s| !s.is_empty()) {
            return Some(nick.to_string());
        }
        self.get_entity("user")
            .and_then(|user| user.get_str("username"))
            .map(str::to_string)
    }

    pub fn joined_at(&self) -> Option<&DateTime<FixedOffset>> {
        self.get_timestamp("joined_at")
    }
}
