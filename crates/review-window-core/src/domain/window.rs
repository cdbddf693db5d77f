//! ReviewWindow - レビュー期間の値型
//!
//! Durations are configured as ISO-8601 strings (`P3D`, `PT2H`, `P1DT30M`,
//! `PT1.5S`) using the day-time subset understood by `java.time.Duration`:
//! an optional sign, `P`, an optional day component, and an optional `T`
//! section with hours, minutes and (fractional) seconds. Letters are case
//! insensitive. Years, months and weeks are not accepted because they have no
//! fixed length.

use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_MINUTE: i64 = 60;

/// Longest window a configuration may ask for (100 000 days, roughly 270 years).
const MAX_WINDOW_DAYS: i64 = 100_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    #[error("duration is empty")]
    Empty,

    #[error("duration must start with 'P'")]
    MissingPrefix,

    #[error("duration has no day, hour, minute or second component")]
    MissingComponents,

    #[error("unexpected text '{0}' in duration")]
    Unexpected(String),

    #[error("invalid number '{0}' in duration")]
    InvalidNumber(String),

    #[error("duration is out of range")]
    Overflow,

    #[error("review window must not exceed 100000 days")]
    TooLong,

    #[error("review window must not be negative")]
    Negative,
}

/// Length of the review window. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReviewWindow(TimeDelta);

impl ReviewWindow {
    pub const ZERO: ReviewWindow = ReviewWindow(TimeDelta::zero());

    /// Returns `None` for negative durations.
    pub fn from_duration(duration: TimeDelta) -> Option<Self> {
        (duration >= TimeDelta::zero()).then_some(Self(duration))
    }

    pub fn days(days: u32) -> Self {
        Self(TimeDelta::days(i64::from(days)))
    }

    pub fn hours(hours: u32) -> Self {
        Self(TimeDelta::hours(i64::from(hours)))
    }

    pub fn minutes(minutes: u32) -> Self {
        Self(TimeDelta::minutes(i64::from(minutes)))
    }

    pub fn seconds(seconds: u32) -> Self {
        Self(TimeDelta::seconds(i64::from(seconds)))
    }

    /// Sum of two windows, saturating at the largest representable duration.
    pub fn plus(self, other: ReviewWindow) -> Self {
        Self(self.0.checked_add(&other.0).unwrap_or(TimeDelta::MAX))
    }

    pub fn as_duration(&self) -> TimeDelta {
        self.0
    }

    /// `start + window`, or `None` when the result is not a representable
    /// timestamp.
    pub fn close_time(&self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        start.checked_add_signed(self.0)
    }

    /// Parse an ISO-8601 day-time duration such as `P1DT3H`.
    pub fn parse(input: &str) -> Result<Self, DurationParseError> {
        let text = input.trim().to_ascii_uppercase();
        if text.is_empty() {
            return Err(DurationParseError::Empty);
        }

        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(&text)),
        };
        let body = unsigned
            .strip_prefix('P')
            .ok_or(DurationParseError::MissingPrefix)?;

        let (date_part, time_part) = match body.split_once('T') {
            Some((date, time)) => (date, Some(time)),
            None => (body, None),
        };

        let mut total_seconds: i64 = 0;
        let mut nanos: u32 = 0;
        let mut has_component = false;

        if !date_part.is_empty() {
            let days = date_part
                .strip_suffix('D')
                .ok_or_else(|| DurationParseError::Unexpected(date_part.to_string()))?;
            total_seconds = add_scaled(total_seconds, parse_integer(days)?, SECONDS_PER_DAY)?;
            has_component = true;
        }

        if let Some(time) = time_part {
            if time.is_empty() {
                return Err(DurationParseError::MissingComponents);
            }

            let mut rest = time;
            for (unit, scale) in [('H', SECONDS_PER_HOUR), ('M', SECONDS_PER_MINUTE)] {
                if let Some(index) = rest.find(unit) {
                    let value = parse_integer(&rest[..index])?;
                    total_seconds = add_scaled(total_seconds, value, scale)?;
                    rest = &rest[index + 1..];
                    has_component = true;
                }
            }

            if !rest.is_empty() {
                let seconds = rest
                    .strip_suffix('S')
                    .ok_or_else(|| DurationParseError::Unexpected(rest.to_string()))?;
                let (whole, fraction) = match seconds.find(['.', ',']) {
                    Some(index) => (&seconds[..index], Some(&seconds[index + 1..])),
                    None => (seconds, None),
                };
                total_seconds = add_scaled(total_seconds, parse_integer(whole)?, 1)?;
                if let Some(fraction) = fraction {
                    nanos = parse_fraction(fraction)?;
                }
                has_component = true;
            }
        }

        if !has_component {
            return Err(DurationParseError::MissingComponents);
        }
        if negative && (total_seconds > 0 || nanos > 0) {
            return Err(DurationParseError::Negative);
        }

        let whole = TimeDelta::try_seconds(total_seconds).ok_or(DurationParseError::Overflow)?;
        let duration = whole
            .checked_add(&TimeDelta::nanoseconds(i64::from(nanos)))
            .ok_or(DurationParseError::Overflow)?;
        if duration > TimeDelta::days(MAX_WINDOW_DAYS) {
            return Err(DurationParseError::TooLong);
        }
        Ok(Self(duration))
    }

    /// Human readable rendering used in the pending status text.
    ///
    /// Units are truncated one after another (days, remaining hours, remaining
    /// minutes, remaining seconds), zero components are left out and unit names
    /// stay singular: one day and three hours renders as `1 day 3 hour`.
    /// A window shorter than one second renders as an empty string.
    pub fn humanize(&self) -> String {
        let total = self.0.num_seconds();
        let components = [
            (total / SECONDS_PER_DAY, "day"),
            (total % SECONDS_PER_DAY / SECONDS_PER_HOUR, "hour"),
            (total % SECONDS_PER_HOUR / SECONDS_PER_MINUTE, "minute"),
            (total % SECONDS_PER_MINUTE, "second"),
        ];

        components
            .iter()
            .filter(|(value, _)| *value != 0)
            .map(|(value, unit)| format!("{value} {unit}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ReviewWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.humanize())
    }
}

impl FromStr for ReviewWindow {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_integer(digits: &str) -> Result<i64, DurationParseError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DurationParseError::InvalidNumber(digits.to_string()));
    }
    digits.parse().map_err(|_| DurationParseError::Overflow)
}

fn parse_fraction(digits: &str) -> Result<u32, DurationParseError> {
    if digits.is_empty() || digits.len() > 9 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DurationParseError::InvalidNumber(digits.to_string()));
    }
    let padded = format!("{digits:0<9}");
    padded
        .parse()
        .map_err(|_| DurationParseError::InvalidNumber(digits.to_string()))
}

fn add_scaled(total: i64, value: i64, scale: i64) -> Result<i64, DurationParseError> {
    value
        .checked_mul(scale)
        .and_then(|scaled| total.checked_add(scaled))
        .ok_or(DurationParseError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("3 day", ReviewWindow::days(3))]
    #[case("3 hour", ReviewWindow::hours(3))]
    #[case("3 minute", ReviewWindow::minutes(3))]
    #[case("3 second", ReviewWindow::seconds(3))]
    fn humanize_single_unit(#[case] expected: &str, #[case] window: ReviewWindow) {
        assert_eq!(window.humanize(), expected);
    }

    #[rstest]
    #[case("1 day 3 hour", ReviewWindow::days(1).plus(ReviewWindow::hours(3)))]
    #[case("3 hour 10 minute", ReviewWindow::hours(3).plus(ReviewWindow::minutes(10)))]
    #[case("5 day 30 minute", ReviewWindow::days(5).plus(ReviewWindow::minutes(30)))]
    #[case("2 day 1 second", ReviewWindow::days(2).plus(ReviewWindow::seconds(1)))]
    fn humanize_compound(#[case] expected: &str, #[case] window: ReviewWindow) {
        assert_eq!(window.humanize(), expected);
    }

    #[test]
    fn humanize_truncates_successively() {
        // 25 hours overflow into a day, 90 seconds into a minute
        assert_eq!(ReviewWindow::hours(25).humanize(), "1 day 1 hour");
        assert_eq!(ReviewWindow::seconds(90).humanize(), "1 minute 30 second");
    }

    #[test]
    fn humanize_drops_sub_second_remainder() {
        let window = ReviewWindow::parse("PT0.5S").unwrap();
        assert_eq!(window.humanize(), "");
        assert_eq!(ReviewWindow::ZERO.humanize(), "");
    }

    #[rstest]
    #[case("P3D", ReviewWindow::days(3))]
    #[case("PT2H", ReviewWindow::hours(2))]
    #[case("PT15M", ReviewWindow::minutes(15))]
    #[case("PT45S", ReviewWindow::seconds(45))]
    #[case("P1DT3H", ReviewWindow::days(1).plus(ReviewWindow::hours(3)))]
    #[case("pt3h10m", ReviewWindow::hours(3).plus(ReviewWindow::minutes(10)))]
    #[case("+P5DT30M", ReviewWindow::days(5).plus(ReviewWindow::minutes(30)))]
    #[case("PT36H", ReviewWindow::days(1).plus(ReviewWindow::hours(12)))]
    #[case("-PT0S", ReviewWindow::ZERO)]
    #[case("  P1D  ", ReviewWindow::days(1))]
    fn parses_day_time_durations(#[case] input: &str, #[case] expected: ReviewWindow) {
        assert_eq!(ReviewWindow::parse(input), Ok(expected));
    }

    #[test]
    fn parses_fractional_seconds() {
        let window = ReviewWindow::parse("PT1.25S").unwrap();
        assert_eq!(window.as_duration(), TimeDelta::milliseconds(1250));

        let comma = ReviewWindow::parse("PT1,5S").unwrap();
        assert_eq!(comma.as_duration(), TimeDelta::milliseconds(1500));
    }

    #[rstest]
    #[case("", DurationParseError::Empty)]
    #[case("3D", DurationParseError::MissingPrefix)]
    #[case("P", DurationParseError::MissingComponents)]
    #[case("PT", DurationParseError::MissingComponents)]
    #[case("P1W", DurationParseError::Unexpected("1W".to_string()))]
    #[case("P1Y", DurationParseError::Unexpected("1Y".to_string()))]
    #[case("PTxH", DurationParseError::InvalidNumber("X".to_string()))]
    #[case("PT30M2H", DurationParseError::InvalidNumber("30M2".to_string()))]
    #[case("PT5", DurationParseError::Unexpected("5".to_string()))]
    #[case("PT1.1234567890S", DurationParseError::InvalidNumber("1234567890".to_string()))]
    #[case("-P1D", DurationParseError::Negative)]
    #[case("P99999999999999999D", DurationParseError::Overflow)]
    #[case("P99999999D", DurationParseError::TooLong)]
    #[case("P100000DT1S", DurationParseError::TooLong)]
    fn rejects_malformed_durations(#[case] input: &str, #[case] expected: DurationParseError) {
        assert_eq!(ReviewWindow::parse(input), Err(expected));
    }

    #[test]
    fn longest_window_is_accepted() {
        assert_eq!(
            ReviewWindow::parse("P100000D"),
            Ok(ReviewWindow::days(100_000))
        );
    }

    #[test]
    fn close_time_is_none_past_the_calendar() {
        let start = DateTime::<Utc>::MAX_UTC - TimeDelta::days(1);
        assert_eq!(ReviewWindow::days(2).close_time(start), None);
        assert_eq!(
            ReviewWindow::hours(1).close_time(start),
            Some(start + TimeDelta::hours(1))
        );
    }

    #[test]
    fn from_duration_rejects_negative() {
        assert_eq!(ReviewWindow::from_duration(TimeDelta::seconds(-1)), None);
        assert_eq!(
            ReviewWindow::from_duration(TimeDelta::seconds(60)),
            Some(ReviewWindow::minutes(1))
        );
    }

    proptest! {
        #[test]
        fn humanize_is_stable_and_omits_zero_units(seconds in 0i64..(400 * SECONDS_PER_DAY)) {
            let window = ReviewWindow::from_duration(TimeDelta::seconds(seconds)).unwrap();
            let rendered = window.humanize();

            prop_assert_eq!(&rendered, &window.humanize());
            for pair in rendered.split(' ').collect::<Vec<_>>().chunks(2) {
                prop_assert_ne!(pair[0], "0");
            }
        }

        #[test]
        fn humanize_components_sum_to_whole_seconds(seconds in 0i64..(400 * SECONDS_PER_DAY)) {
            let window = ReviewWindow::from_duration(TimeDelta::seconds(seconds)).unwrap();
            let rendered = window.humanize();

            let mut total = 0i64;
            if !rendered.is_empty() {
                for pair in rendered.split(' ').collect::<Vec<_>>().chunks(2) {
                    let value: i64 = pair[0].parse().unwrap();
                    let scale = match pair[1] {
                        "day" => SECONDS_PER_DAY,
                        "hour" => SECONDS_PER_HOUR,
                        "minute" => SECONDS_PER_MINUTE,
                        "second" => 1,
                        other => panic!("unexpected unit {other}"),
                    };
                    total += value * scale;
                }
            }
            prop_assert_eq!(total, seconds);
        }
    }
}
