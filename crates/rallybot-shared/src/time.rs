//! Stage time conversion between user literals and whole milliseconds.
//!
//! Users type `M:SS`, `M:SS.mmm` or `M:SS:mmm`; the store keeps the total in
//! milliseconds. Replies render `MM:SS.m` where the millisecond part is *not*
//! zero-padded, so `83006` renders as `01:23.6`. Millisecond digits are read
//! as an integer, which keeps the two directions consistent (`1:23.6` is 6 ms).

const MS_PER_SECOND: u32 = 1_000;
const MS_PER_MINUTE: u32 = 60 * MS_PER_SECOND;

/// Convert textual minute/second/millisecond parts into total milliseconds.
///
/// Empty or non-numeric parts count as zero.
pub fn time_to_ms(minutes: &str, seconds: &str, milliseconds: &str) -> u32 {
    let part = |s: &str| s.trim().parse::<u32>().unwrap_or(0);

    part(minutes)
        .saturating_mul(MS_PER_MINUTE)
        .saturating_add(part(seconds).saturating_mul(MS_PER_SECOND))
        .saturating_add(part(milliseconds))
}

/// Render milliseconds as `MM:SS.m`.
pub fn format_time(ms: u32) -> String {
    let minutes = ms / MS_PER_MINUTE;
    let seconds = (ms % MS_PER_MINUTE) / MS_PER_SECOND;
    let millis = ms % MS_PER_SECOND;

    format!("{minutes:02}:{seconds:02}.{millis}")
}
