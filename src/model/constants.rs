//! Numeric protocol values found in resource fields.

macro_rules! numeric_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident = $value:literal,)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value,)+
        }

        impl $name {
            pub fn from_value(value: u64) -> Option<Self> {
                match value {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub fn value(self) -> u8 {
                self as u8
            }
        }
    };
}

numeric_enum! {
    /// `type` of a channel.
    ChannelType {
        GuildText = 0,
        Dm = 1,
        GuildVoice = 2,
        GroupDm = 3,
        GuildCategory = 4,
        GuildNews = 5,
        GuildStore = 6,
    }
}

numeric_enum! {
    /// `type` of a message.
    MessageType {
        Default = 0,
        RecipientAdd = 1,
        RecipientRemove = 2,
        Call = 3,
        ChannelNameChange = 4,
        ChannelIconChange = 5,
        ChannelPinnedMessage = 6,
        GuildMemberJoin = 7,
        UserPremiumGuildSubscription = 8,
        UserPremiumGuildSubscriptionTier1 = 9,
        UserPremiumGuildSubscriptionTier2 = 10,
        UserPremiumGuildSubscriptionTier3 = 11,
        ChannelFollowAdd = 12,
        GuildDiscoveryDisqualified = 14,
        GuildDiscoveryRequalified = 15,
    }
}

numeric_enum! {
    /// `default_message_notifications` of a server.
    NotificationLevel {
        AllMessages = 0,
        OnlyMentions = 1,
    }
}

numeric_enum! {
    /// `explicit_content_filter` of a server.
    ContentFilterLevel {
        Disabled = 0,
        MembersWithoutRoles = 1,
        AllMembers = 2,
    }
}

numeric_enum! {
    /// `verification_level` of a server.
    VerificationLevel {
        None = 0,
        /// Verified email.
        Low = 1,
        /// Registered for longer than 5 minutes.
        Medium = 2,
        /// Member of the server for longer than 10 minutes.
        High = 3,
        /// Verified phone number.
        VeryHigh = 4,
    }
}

numeric_enum! {
    /// `premium_tier` of a server.
    PremiumTier {
        None = 0,
        Tier1 = 1,
        Tier2 = 2,
        Tier3 = 3,
    }
}

/// Bits of a message's `flags`.
pub mod message_flags {
    pub const CROSSPOSTED: u64 = 1 << 0;
    pub const IS_CROSSPOST: u64 = 1 << 1;
    pub const SUPPRESS_EMBEDS: u64 = 1 << 2;
    pub const SOURCE_MESSAGE_DELETED: u64 = 1 << 3;
    pub const URGENT: u64 = 1 << 4;
}

/// Bits of a user's `public_flags`.
pub mod user_flags {
    pub const EMPLOYEE: u64 = 1 << 0;
    pub const PARTNER: u64 = 1 << 1;
    pub const HYPESQUAD: u64 = 1 << 2;
    pub const BUG_HUNTER_LEVEL_1: u64 = 1 << 3;
    pub const HOUSE_BRAVERY: u64 = 1 << 4;
    pub const HOUSE_BRILLIANCE: u64 = 1 << 5;
    pub const HOUSE_BALANCE: u64 = 1 << 6;
    pub const EARLY_SUPPORTER: u64 = 1 << 7;
    pub const TEAM_USER: u64 = 1 << 8;
    pub const SYSTEM: u64 = 1 << 9;
    pub const BUG_HUNTER_LEVEL_2: u64 = 1 << 10;
    pub const VERIFIED_BOT: u64 = 1 << 11;
    pub const VERIFIED_BOT_DEVELOPER: u64 = 1 << 12;
}
