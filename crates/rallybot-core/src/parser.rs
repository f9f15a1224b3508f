//! Free-text extraction of rally shorthand and stage times.
//!
//! Every token is located independently of the others, so users can write
//! `h1 us-01w 1:23.456` or `1:23.456 US01W h1` alike.  A token that is not
//! present comes back as `None`; parsing never fails.

use once_cell::sync::Lazy;
use regex::Regex;

use rallybot_shared::time::time_to_ms;
use rallybot_store::Catalog;

/// `<locale:2-3 letters>[sep]<stage:2 digits>[[sep]<letters>]`, e.g. `us01`,
/// `us-01-w`, `us01wet`. Separators are `-`, `_`, `/` or whitespace.
static STAGE_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<locale>[a-z]{2,3})[-_/\s]?(?P<stage>[0-9]{2})(?:[-_/\s]?(?P<tail>[a-z]+))?")
        .expect("stage code pattern is valid")
});

/// Trailing letters that mark a stage code as wet.
const WET_FLAGS: &[&str] = &["w", "wet"];

/// `M:SS`, `M:SS.mmm` or `M:SS:mmm`.
static TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<min>[0-9]{1,2}):(?P<sec>[0-9]{2})(?:[.:](?P<ms>[0-9]{1,3}))?")
        .expect("time pattern is valid")
});

/// Locale + stage shorthand with the optional condition flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCode {
    pub locale: String,
    pub stage: String,
    /// Currently only `w` (wet).
    pub condition_flag: Option<char>,
}

/// The textual parts of a stage time, as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeLiteral {
    pub minutes: String,
    pub seconds: String,
    /// Empty when the user omitted milliseconds.
    pub milliseconds: String,
}

impl TimeLiteral {
    pub fn to_ms(&self) -> u32 {
        time_to_ms(&self.minutes, &self.seconds, &self.milliseconds)
    }
}

/// Everything extracted from a record-a-time command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRecord {
    pub stage_code: Option<StageCode>,
    pub vehicle_class: Option<String>,
    pub time: Option<TimeLiteral>,
}

/// Extract the stage code, vehicle class and time from `text`.
pub fn parse_record(text: &str, catalog: &Catalog) -> ParsedRecord {
    ParsedRecord {
        stage_code: parse_stage_code(text),
        vehicle_class: find_vehicle_class_code(text, catalog),
        time: parse_time(text),
    }
}

/// First stage-code-shaped substring, lowercased.
///
/// A candidate whose digits run into a time literal (`rgt 12:34.567`) is
/// skipped. Trailing letters only count as the wet flag when they are `w` or
/// `wet`, so `us01 wrc` and `us01h1` stay dry.
pub fn parse_stage_code(text: &str) -> Option<StageCode> {
    let lower = text.to_lowercase();

    STAGE_CODE
        .captures_iter(&lower)
        .find(|caps| {
            let stage_end = caps.name("stage").map_or(0, |m| m.end());
            !lower[stage_end..].starts_with(':')
        })
        .map(|caps| StageCode {
            locale: caps["locale"].to_string(),
            stage: caps["stage"].to_string(),
            condition_flag: caps
                .name("tail")
                .filter(|tail| WET_FLAGS.contains(&tail.as_str()))
                .map(|_| 'w'),
        })
}

/// First time-shaped substring.
pub fn parse_time(text: &str) -> Option<TimeLiteral> {
    let caps = TIME.captures(text)?;

    Some(TimeLiteral {
        minutes: caps["min"].to_string(),
        seconds: caps["sec"].to_string(),
        milliseconds: caps
            .name("ms")
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
    })
}

/// First whitespace-delimited token that is a known vehicle class code.
/// Surrounding punctuation is ignored (`h1,` matches `h1`).
pub fn find_vehicle_class_code(text: &str, catalog: &Catalog) -> Option<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
        .find(|token| !token.is_empty() && catalog.is_vehicle_class_code(token))
        .map(str::to_string)
}
