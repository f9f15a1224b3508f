//! User-facing reply text.
//!
//! Replies use chat markdown: `**bold**`, inline code and `>>>` block quotes.

use rallybot_shared::time::format_time;
use rallybot_store::{LeaderboardEntry, Locale, Stage, Standing, UpdateOutcome, VehicleClass};

use crate::resolver::{ResolutionFailure, ResolvedRally};

pub fn help(prefix: &str) -> String {
    format!(
        "Hello, my name is rallybot. Here are basic commands:\n\
         Adding a time: `{prefix} <stage shorthand code> <class shorthand code> <0:00.000>` \
         (order and capitalization don't matter).\n\
         Shorthand codes: `{prefix} <locations|stages <location code>|classes>`\n\
         Leaderboards: `{prefix} <board|rank> <stage shorthand code> <class shorthand code>`\n\
         Feedback: `{prefix} please <feedback>`\n\
         Example: `{prefix} h1 us-01w 1:23.456`"
    )
}

pub fn locale_list(locales: &[Locale]) -> String {
    format!(
        ">>> {}",
        locales
            .iter()
            .map(|l| format!("**{}**: {}", l.code, l.name))
            .collect::<Vec<_>>()
            .join("\n")
    )
}

pub fn stage_list(locale: &Locale, stages: &[Stage]) -> String {
    format!(
        ">>> Here are the stages available for {}:\n{}",
        locale.name,
        stages
            .iter()
            .map(|s| format!("**{}**: {}", s.code, s.name))
            .collect::<Vec<_>>()
            .join("\n")
    )
}

pub fn vehicle_class_list(classes: &[VehicleClass]) -> String {
    format!(
        ">>> {}",
        classes
            .iter()
            .map(|c| format!("**{}**: {}", c.code, c.name))
            .collect::<Vec<_>>()
            .join("\n")
    )
}

pub fn missing_locale_code(locales: &[Locale]) -> String {
    format!("Please specify a country code.\n{}", locale_list(locales))
}

pub fn resolution_failure(failure: &ResolutionFailure) -> String {
    match failure {
        ResolutionFailure::UnknownLocale { locales } => format!(
            "I don't recognize that location.  Here's a list of valid shorthand codes for locations.\n{}",
            locale_list(locales)
        ),
        ResolutionFailure::UnknownStage { locale, stages } => format!(
            "You did not provide a valid stage code.  Here's a list of valid shorthand codes for **{}**.\n{}",
            locale.name,
            stage_list(locale, stages)
        ),
        ResolutionFailure::UnknownVehicleClass { vehicle_classes } => format!(
            "I don't recognize that class.  Here's a list of valid shorthand codes for classes.\n{}",
            vehicle_class_list(vehicle_classes)
        ),
        ResolutionFailure::UnknownRally => "I don't recognize that rally code.  Try `locations`, \
             `stages`, or `classes` for lists or usable shorthand codes."
            .to_string(),
    }
}

pub fn missing_time(rally: &ResolvedRally) -> String {
    format!(
        "Add a time like `1:23.456` to record it for `{}`.",
        rally.shorthand()
    )
}

pub fn update_outcome(outcome: &UpdateOutcome, time_ms: u32) -> String {
    match *outcome {
        UpdateOutcome::NewRecord { rank } => {
            format!("Time added.  Your rank is **#{rank}**.")
        }
        UpdateOutcome::Improved { rank, .. } => format!(
            "Best time updated to `{}`.  Your new rank is **#{rank}**.\n\
             Congratulations on the new personal best!",
            format_time(time_ms)
        ),
        UpdateOutcome::NotImproved { previous_time_ms } => format!(
            "You failed to beat your previous best of `{}`",
            format_time(previous_time_ms)
        ),
    }
}

pub fn leaderboard(rally: &ResolvedRally, entries: &[LeaderboardEntry]) -> String {
    if entries.is_empty() {
        return format!("No times have been posted for `{}` yet.", rally.shorthand());
    }

    let rows = entries
        .iter()
        .map(|e| {
            let verified = if e.is_verified { " ✓" } else { "" };
            format!(
                "**#{}** `{}` <@{}>{verified}",
                e.rank,
                format_time(e.time_ms),
                e.user_id
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "`{}`\n{} / {} / {}\n>>> {rows}",
        rally.shorthand(),
        rally.locale.name,
        rally.stage.name,
        rally.vehicle_class.name
    )
}

pub fn standing(rally: &ResolvedRally, standing: Option<&Standing>) -> String {
    match standing {
        Some(s) => format!(
            "You are ranked **#{}** of {} on `{}` with `{}`.",
            s.rank,
            s.entrants,
            rally.shorthand(),
            format_time(s.time_ms)
        ),
        None => "You do not have a time for that rally.".to_string(),
    }
}

pub fn random_rally(rally: &ResolvedRally) -> String {
    format!(
        "{} | {} ({}), {} | `{}`",
        rally.vehicle_class.name,
        rally.stage.name,
        rally.condition.name,
        rally.locale.name,
        rally.shorthand()
    )
}

pub fn random_stage(locale: &Locale, stage: &Stage) -> String {
    format!("{}, {} (`{}-{}`)", stage.name, locale.name, locale.code, stage.code)
}

pub fn empty_catalog() -> String {
    "There's nothing in the catalog yet.".to_string()
}

pub fn feedback_received() -> String {
    "Thanks, your feedback has been passed on.".to_string()
}

pub fn missing_feedback(prefix: &str) -> String {
    format!("Tell us what to improve: `{prefix} please <feedback>`")
}

pub fn store_failure() -> String {
    "Something went wrong.".to_string()
}
