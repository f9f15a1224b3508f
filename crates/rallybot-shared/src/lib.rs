//! # rallybot-shared
//!
//! Types shared by every rallybot crate: chat-platform identifiers,
//! defaults, and stage-time conversion.

pub mod constants;
pub mod time;
pub mod types;

mod error;

pub use error::SharedError;
pub use types::{ChannelId, CommandOrigin, GuildId, MessageId, UserId};
