/// Application name
pub const APP_NAME: &str = "rallybot";

/// Default invocation prefix for chat commands
pub const DEFAULT_PREFIX: &str = "!rallybot";

/// Default base URL for message permalinks
pub const DEFAULT_PERMALINK_BASE: &str = "https://discord.com/channels";

/// Default HTTP port for the inbound command adapter
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Default number of rows shown in a leaderboard reply
pub const DEFAULT_BOARD_LIMIT: usize = 10;

/// Locale codes that only run on snow (Sweden, Monte Carlo).
/// Lowercase; compare against lowercased input.
pub const SNOW_ONLY_LOCALES: &[&str] = &["se", "mc"];

/// Condition names as seeded in the catalog
pub const CONDITION_DRY: &str = "Dry";
pub const CONDITION_WET: &str = "Wet";
pub const CONDITION_SNOW: &str = "Snow";
