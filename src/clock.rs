use crate::error::{ScheduleError, ScheduleResult};
use chrono::{NaiveTime, Timelike};

/// Seconds in one broadcast day.
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Parse a time string in HH:MM:SS or HH:MM format into seconds since midnight.
pub fn to_seconds(s: &str) -> ScheduleResult<u32> {
    let trimmed = s.trim();
    let time = NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| ScheduleError::InvalidTimeFormat(s.to_string()))?;
    // chrono accepts :60 as a leap second; a broadcast clock does not.
    if time.nanosecond() >= 1_000_000_000 {
        return Err(ScheduleError::InvalidTimeFormat(s.to_string()));
    }
    Ok(time.num_seconds_from_midnight())
}

/// Format seconds since midnight as HH:MM:SS.
///
/// Values past the end of the day are not wrapped: 86400 renders as "24:00:00".
pub fn to_clock_string(secs: u32) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

/// Parse a "HH:MM-HH:MM" range into `(start, end)` seconds.
pub fn parse_range(s: &str) -> ScheduleResult<(u32, u32)> {
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| ScheduleError::InvalidTimeFormat(s.to_string()))?;
    Ok((to_seconds(start)?, to_seconds(end)?))
}

/// Format a range as the "HH:MM:SS-HH:MM:SS" key used in schedule output.
pub fn format_range(start: u32, end: u32) -> String {
    format!("{}-{}", to_clock_string(start), to_clock_string(end))
}
