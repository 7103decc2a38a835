//! Send-time parsing for scheduled messages.
//!
//! Accepted forms: `in 10m`, `10m`, `2h`, `1d`, `30s`, `HH:MM` (today, or
//! tomorrow once passed) and `YYYY-MM-DD HH:MM`. The result is always
//! strictly after `now`.

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use regex::Regex;

use crate::core::ValidationError;

fn relative_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d+)\s*(s|secs?|seconds?|m|mins?|minutes?|h|hrs?|hours?|d|days?)$").ok()
    })
    .as_ref()
}

fn unit_seconds(unit: &str) -> i64 {
    match unit.as_bytes().first() {
        Some(b's') => 1,
        Some(b'm') => 60,
        Some(b'h') => 60 * 60,
        _ => 24 * 60 * 60,
    }
}

fn parse_clock(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

pub fn parse_send_time(input: &str, now: NaiveDateTime) -> Result<NaiveDateTime, ValidationError> {
    let invalid = || ValidationError::InvalidTime {
        input: input.to_string(),
    };

    let lowered = input.trim().to_lowercase();
    let value = lowered.strip_prefix("in ").unwrap_or(&lowered).trim();
    if value.is_empty() {
        return Err(invalid());
    }

    if let Some(caps) = relative_re().and_then(|re| re.captures(value)) {
        let amount: i64 = caps[1].parse().map_err(|_| invalid())?;
        if amount <= 0 {
            return Err(invalid());
        }
        let delta = amount
            .checked_mul(unit_seconds(&caps[2]))
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(invalid)?;
        return now.checked_add_signed(delta).ok_or_else(invalid);
    }

    if let Some(time) = parse_clock(value) {
        let today = now.date().and_time(time);
        if today > now {
            return Ok(today);
        }
        return TimeDelta::try_days(1)
            .and_then(|day| today.checked_add_signed(day))
            .ok_or_else(invalid);
    }

    let (date, time) = value.split_once(' ').ok_or_else(invalid)?;
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
    let time = parse_clock(time.trim()).ok_or_else(invalid)?;
    let at = date.and_time(time);
    if at <= now {
        return Err(invalid());
    }
    Ok(at)
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/when.rs"]
mod tests;
