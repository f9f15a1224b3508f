//! Sub-command routing for the text after the invocation prefix.

use serde::{Deserialize, Serialize};

use rallybot_shared::{ChannelId, CommandOrigin, GuildId, MessageId, UserId};

/// A chat message as relayed by the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// `None` for direct messages.
    pub guild_id: Option<GuildId>,
    pub channel_id: ChannelId,
    pub user_id: UserId,
    pub message_id: MessageId,
    pub content: String,
    #[serde(default)]
    pub author_is_bot: bool,
}

impl IncomingMessage {
    /// The command body and its origin, or `None` when the message is not for
    /// us: missing prefix, bot author, or outside a guild.
    pub fn command<'a>(&'a self, prefix: &str) -> Option<(CommandOrigin, &'a str)> {
        if self.author_is_bot {
            return None;
        }
        let guild_id = self.guild_id?;
        let body = self.content.strip_prefix(prefix)?;

        Some((
            CommandOrigin {
                guild_id,
                channel_id: self.channel_id,
                user_id: self.user_id,
                message_id: self.message_id,
            },
            body.trim(),
        ))
    }
}

/// What to list or pick with `random`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandomTarget {
    Rally,
    Stage,
    Locale,
    VehicleClass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Help,
    Locales,
    /// Optional locale code.
    Stages(Option<&'a str>),
    Classes,
    /// Rally shorthand to show the leaderboard for.
    Board(&'a str),
    /// Rally shorthand to show the caller's standing on.
    Rank(&'a str),
    Random(RandomTarget),
    /// Free-text feedback for the operators.
    Feedback(&'a str),
    /// Anything else: parse and record a time.
    Record(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(body: &'a str) -> Self {
        let body = body.trim();
        let mut args = body.split_whitespace();
        let Some(first) = args.next() else {
            return Self::Help;
        };
        let rest = body[first.len()..].trim();

        match first.to_lowercase().as_str() {
            "help" => Self::Help,
            "location" | "locations" | "locale" | "locales" => Self::Locales,
            "stage" | "stages" => Self::Stages(args.next()),
            "class" | "classes" | "group" | "groups" => Self::Classes,
            "board" | "leaderboard" => Self::Board(rest),
            "rank" => Self::Rank(rest),
            "please" => Self::Feedback(rest),
            "random" => Self::Random(match args.next().map(str::to_lowercase).as_deref() {
                Some("stage") => RandomTarget::Stage,
                Some("location" | "locale") => RandomTarget::Locale,
                Some("class" | "group") => RandomTarget::VehicleClass,
                _ => RandomTarget::Rally,
            }),
            _ => Self::Record(body),
        }
    }
}
