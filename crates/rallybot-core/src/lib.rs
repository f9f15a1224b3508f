//! # rallybot-core
//!
//! Turns chat shorthand such as `h1 us-01w 1:23.456` into a canonical rally
//! and keeps each user's best time per rally.
//!
//! - [`parser`] extracts stage code, vehicle class and time from free text.
//! - [`resolver`] maps codes onto exactly one catalog rally or says which
//!   token was wrong.
//! - [`RallyBot`] routes sub-commands, records times through a
//!   [`RecordStore`] and builds the single reply for each command.

pub mod bot;
pub mod command;
pub mod parser;
pub mod random;
pub mod resolver;
pub mod response;
pub mod store;

#[cfg(test)]
mod test_support;

pub use bot::{BotSettings, RallyBot};
pub use command::{Command, IncomingMessage, RandomTarget};
pub use resolver::{ResolutionFailure, ResolvedRally, Resolver, SurfaceCondition};
pub use store::RecordStore;
