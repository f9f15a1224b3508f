use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SharedError;

/// Declares a chat-platform snowflake identifier.
///
/// Snowflakes exceed the integer precision of JSON consumers, so they travel
/// as decimal strings on the wire and in SQLite.
macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = SharedError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|_| SharedError::InvalidSnowflake {
                        kind: $label,
                        value: s.to_string(),
                    })
            }
        }

        impl TryFrom<String> for $name {
            type Error = SharedError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.to_string()
            }
        }
    };
}

snowflake_id!(
    /// A chat community (guild). Leaderboards never cross guild boundaries.
    GuildId,
    "guild"
);
snowflake_id!(
    /// A chat user, unique across guilds.
    UserId,
    "user"
);
snowflake_id!(
    /// The channel a command was posted in.
    ChannelId,
    "channel"
);
snowflake_id!(
    /// The message carrying a command; used to build proof permalinks.
    MessageId,
    "message"
);

/// Where a command came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandOrigin {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub user_id: UserId,
    pub message_id: MessageId,
}

impl CommandOrigin {
    /// Link back to the originating message, e.g.
    /// `https://discord.com/channels/<guild>/<channel>/<message>`.
    pub fn permalink(&self, base: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            base.trim_end_matches('/'),
            self.guild_id,
            self.channel_id,
            self.message_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snowflake_parses_from_decimal_string() {
        let id: GuildId = "80351110224678912".parse().unwrap();
        assert_eq!(id, GuildId(80351110224678912));
        assert_eq!(id.to_string(), "80351110224678912");
    }

    #[test]
    fn snowflake_rejects_garbage() {
        let err = "@me".parse::<UserId>().unwrap_err();
        assert!(err.to_string().contains("user"));
    }

    #[test]
    fn snowflake_serializes_as_string() {
        let json = serde_json::to_string(&MessageId(42)).unwrap();
        assert_eq!(json, "\"42\"");
        let back: MessageId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MessageId(42));
    }

    #[test]
    fn permalink_joins_origin_ids() {
        let origin = CommandOrigin {
            guild_id: GuildId(1),
            channel_id: ChannelId(2),
            user_id: UserId(3),
            message_id: MessageId(4),
        };
        assert_eq!(
            origin.permalink("https://discord.com/channels/"),
            "https://discord.com/channels/1/2/4"
        );
    }
}
