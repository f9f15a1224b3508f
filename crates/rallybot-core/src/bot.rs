//! Command handling: one inbound message in, at most one reply out.
//!
//! A failing command never affects later commands; store errors are logged
//! and answered with a generic message.

use std::sync::Arc;

use tracing::{debug, error, info};

use rallybot_shared::constants::{DEFAULT_BOARD_LIMIT, DEFAULT_PERMALINK_BASE, DEFAULT_PREFIX};
use rallybot_shared::time::format_time;
use rallybot_shared::CommandOrigin;
use rallybot_store::{Catalog, TimeSubmission};

use crate::command::{Command, IncomingMessage, RandomTarget};
use crate::parser::{self, ParsedRecord};
use crate::random;
use crate::resolver::{ResolutionFailure, ResolvedRally, Resolver};
use crate::response;
use crate::store::RecordStore;

/// Knobs the transport layer may override.
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub prefix: String,
    pub permalink_base: String,
    pub board_limit: usize,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            permalink_base: DEFAULT_PERMALINK_BASE.to_string(),
            board_limit: DEFAULT_BOARD_LIMIT,
        }
    }
}

pub struct RallyBot<S> {
    catalog: Arc<Catalog>,
    store: S,
    settings: BotSettings,
}

impl<S: RecordStore> RallyBot<S> {
    pub fn new(catalog: Arc<Catalog>, store: S, settings: BotSettings) -> Self {
        Self {
            catalog,
            store,
            settings,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &BotSettings {
        &self.settings
    }

    /// Filter a relayed chat message and answer it if it is a command.
    pub fn handle_message(&self, message: &IncomingMessage) -> Option<String> {
        let (origin, body) = message.command(&self.settings.prefix)?;
        Some(self.handle(&origin, body))
    }

    /// Answer a command body (prefix already stripped).
    pub fn handle(&self, origin: &CommandOrigin, body: &str) -> String {
        debug!(guild = %origin.guild_id, user = %origin.user_id, body, "handling command");

        match Command::parse(body) {
            Command::Help => response::help(&self.settings.prefix),
            Command::Locales => response::locale_list(self.catalog.locales()),
            Command::Stages(code) => self.stages(code),
            Command::Classes => response::vehicle_class_list(self.catalog.vehicle_classes()),
            Command::Board(text) => self.board(origin, text),
            Command::Rank(text) => self.rank(origin, text),
            Command::Random(target) => self.random(target),
            Command::Feedback(text) => self.feedback(origin, text),
            Command::Record(text) => self.record(origin, text),
        }
    }

    fn stages(&self, code: Option<&str>) -> String {
        let Some(code) = code else {
            return response::missing_locale_code(self.catalog.locales());
        };

        match self.catalog.lookup_locale_by_code(code) {
            Some(locale) => {
                response::stage_list(locale, &self.catalog.stages_for_locale(locale.id))
            }
            None => response::resolution_failure(&ResolutionFailure::UnknownLocale {
                locales: self.catalog.locales().to_vec(),
            }),
        }
    }

    fn record(&self, origin: &CommandOrigin, text: &str) -> String {
        let parsed = parser::parse_record(text, &self.catalog);
        let rally = match self.resolve(&parsed) {
            Ok(rally) => rally,
            Err(reply) => return reply,
        };

        let Some(time) = parsed.time else {
            return response::missing_time(&rally);
        };
        let time_ms = time.to_ms();

        let submission = TimeSubmission {
            guild_id: origin.guild_id,
            user_id: origin.user_id,
            rally_id: rally.rally.id,
            time_ms,
            permalink: origin.permalink(&self.settings.permalink_base),
        };

        match self.store.upsert_best_time(&submission) {
            Ok(outcome) => {
                info!(
                    guild = %origin.guild_id,
                    user = %origin.user_id,
                    rally = %rally.shorthand(),
                    time = %format_time(time_ms),
                    ?outcome,
                    "time submitted"
                );
                response::update_outcome(&outcome, time_ms)
            }
            Err(e) => {
                error!(error = %e, rally = %rally.shorthand(), "failed to record time");
                response::store_failure()
            }
        }
    }

    fn board(&self, origin: &CommandOrigin, text: &str) -> String {
        let parsed = parser::parse_record(text, &self.catalog);
        let rally = match self.resolve(&parsed) {
            Ok(rally) => rally,
            Err(reply) => return reply,
        };

        match self
            .store
            .rally_leaderboard(origin.guild_id, rally.rally.id, self.settings.board_limit)
        {
            Ok(entries) => response::leaderboard(&rally, &entries),
            Err(e) => {
                error!(error = %e, rally = %rally.shorthand(), "failed to load leaderboard");
                response::store_failure()
            }
        }
    }

    fn rank(&self, origin: &CommandOrigin, text: &str) -> String {
        let parsed = parser::parse_record(text, &self.catalog);
        let rally = match self.resolve(&parsed) {
            Ok(rally) => rally,
            Err(reply) => return reply,
        };

        match self
            .store
            .rally_standing(origin.guild_id, origin.user_id, rally.rally.id)
        {
            Ok(standing) => response::standing(&rally, standing.as_ref()),
            Err(e) => {
                error!(error = %e, rally = %rally.shorthand(), "failed to load standing");
                response::store_failure()
            }
        }
    }

    fn feedback(&self, origin: &CommandOrigin, text: &str) -> String {
        if text.is_empty() {
            return response::missing_feedback(&self.settings.prefix);
        }
        info!(guild = %origin.guild_id, user = %origin.user_id, feedback = text, "user feedback");
        response::feedback_received()
    }

    fn random(&self, target: RandomTarget) -> String {
        random::pick(&self.catalog, target, &mut rand::thread_rng())
            .unwrap_or_else(response::empty_catalog)
    }

    /// Resolve parsed shorthand, or produce the reply explaining why not.
    /// Text without a stage code falls through to help.
    fn resolve(&self, parsed: &ParsedRecord) -> Result<ResolvedRally, String> {
        let Some(code) = &parsed.stage_code else {
            return Err(response::help(&self.settings.prefix));
        };

        Resolver::new(&self.catalog)
            .resolve_code(code, parsed.vehicle_class.as_deref())
            .map_err(|failure| {
                debug!(%failure, locale = %code.locale, stage = %code.stage, "rally not resolved");
                response::resolution_failure(&failure)
            })
    }
}
