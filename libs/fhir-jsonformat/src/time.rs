//! FHIR temporal primitives: `time`, `date`, `dateTime` and `instant`.
//!
//! Values are kept as microsecond counts plus a precision tag. The tag records
//! the finest unit written in the input and alone decides the output layout,
//! so `12:00:00.000` survives a round trip with its three zero digits.
//!
//! Timezone strings are `Z`, an IANA name (`Europe/Berlin`) or a fixed
//! `±HH:MM` offset. IANA names are tried first.

use crate::error::{Error, Result, ValidationError};
use crate::patterns;
use chrono::{
    DateTime as ChronoDateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime,
    NaiveTime, Offset, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;
use std::fmt;

/// Timezone string for UTC.
pub const UTC: &str = "Z";

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimePrecision {
    #[default]
    Unspecified,
    Second,
    Millisecond,
    Microsecond,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DatePrecision {
    #[default]
    Unspecified,
    Year,
    Month,
    Day,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DateTimePrecision {
    #[default]
    Unspecified,
    Year,
    Month,
    Day,
    Second,
    Millisecond,
    Microsecond,
}

impl From<DatePrecision> for DateTimePrecision {
    fn from(p: DatePrecision) -> Self {
        match p {
            DatePrecision::Unspecified => DateTimePrecision::Unspecified,
            DatePrecision::Year => DateTimePrecision::Year,
            DatePrecision::Month => DateTimePrecision::Month,
            DatePrecision::Day => DateTimePrecision::Day,
        }
    }
}

impl From<TimePrecision> for DateTimePrecision {
    fn from(p: TimePrecision) -> Self {
        match p {
            TimePrecision::Unspecified => DateTimePrecision::Unspecified,
            TimePrecision::Second => DateTimePrecision::Second,
            TimePrecision::Millisecond => DateTimePrecision::Millisecond,
            TimePrecision::Microsecond => DateTimePrecision::Microsecond,
        }
    }
}

/// Time of day, in microseconds since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    pub precision: TimePrecision,
    pub value_us: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Date {
    pub precision: DatePrecision,
    /// Microseconds since the Unix epoch of local midnight
    pub value_us: i64,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTime {
    pub precision: DateTimePrecision,
    pub value_us: i64,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instant {
    pub precision: TimePrecision,
    pub value_us: i64,
    pub timezone: String,
}

// ============================================================================
// Timezones
// ============================================================================

/// A resolved timezone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Location {
    Named(Tz),
    Fixed(FixedOffset),
}

impl Location {
    /// Offset in effect at the given UTC wall time
    pub fn offset_at(&self, utc: &NaiveDateTime) -> FixedOffset {
        match self {
            Location::Named(tz) => tz.offset_from_utc_datetime(utc).fix(),
            Location::Fixed(offset) => *offset,
        }
    }

    /// Interpret a local wall time in this zone.
    ///
    /// The earlier instant wins on overlaps. A wall time skipped by a
    /// forward transition is read with the offset in effect before the gap,
    /// which lands it just after the transition (local midnight that never
    /// happens becomes the first instant of that day).
    pub fn from_local(&self, local: &NaiveDateTime) -> Option<ChronoDateTime<FixedOffset>> {
        let tz = match self {
            Location::Named(tz) => tz,
            Location::Fixed(offset) => return offset.from_local_datetime(local).single(),
        };
        let dt = match tz.from_local_datetime(local) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
            LocalResult::None => {
                let before = self.offset_at(&local.checked_sub_signed(Duration::days(1))?);
                let utc = before.from_local_datetime(local).single()?.naive_utc();
                tz.from_utc_datetime(&utc)
            }
        };
        Some(dt.with_timezone(&dt.offset().fix()))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Named(tz) => write!(f, "{}", tz.name()),
            Location::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

fn invalid_timezone(tz: &str) -> Error {
    ValidationError::malformed("invalid timezone")
        .with_diagnostics(format!("found {tz:?}"))
        .into()
}

/// Seconds east of UTC for a `±HH:MM` offset; empty and `Z` mean UTC
pub fn offset_to_seconds(offset: &str) -> Result<i32> {
    if offset.is_empty() || offset == UTC {
        return Ok(0);
    }
    let caps = patterns::FIXED_OFFSET
        .captures(offset)
        .ok_or_else(|| invalid_timezone(offset))?;
    let sign = if &caps[1] == "-" { -1 } else { 1 };
    // Two digits each, so these never overflow.
    let hours: i32 = caps[2].parse().map_err(|_| invalid_timezone(offset))?;
    let minutes: i32 = caps[3].parse().map_err(|_| invalid_timezone(offset))?;
    if hours > 23 || minutes > 59 {
        return Err(invalid_timezone(offset));
    }
    Ok(sign * (hours * 3600 + minutes * 60))
}

/// Resolve a timezone string, trying an IANA name before a fixed offset.
pub fn location(tz: &str) -> Result<Location> {
    if tz.is_empty() || tz == UTC {
        return Ok(Location::Fixed(utc_offset()));
    }
    if let Ok(named) = tz.parse::<Tz>() {
        return Ok(Location::Named(named));
    }
    let seconds = offset_to_seconds(tz)?;
    FixedOffset::east_opt(seconds)
        .map(Location::Fixed)
        .ok_or_else(|| invalid_timezone(tz))
}

/// `±HH:MM` offset of a zoned timestamp
pub fn extract_timezone(dt: &ChronoDateTime<FixedOffset>) -> String {
    format_offset(dt.offset().local_minus_utc())
}

fn format_offset(seconds: i32) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let seconds = seconds.abs();
    format!("{}{:02}:{:02}", sign, seconds / 3600, seconds % 3600 / 60)
}

/// Microseconds since the Unix epoch
pub fn timestamp_micros<Z: TimeZone>(dt: &ChronoDateTime<Z>) -> i64 {
    let seconds = dt.timestamp();
    seconds
        .checked_mul(MICROS_PER_SECOND)
        .and_then(|us| us.checked_add(i64::from(dt.timestamp_subsec_micros())))
        .unwrap_or_else(|| seconds.saturating_mul(MICROS_PER_SECOND))
}

/// Timestamp for `us` microseconds since the epoch, expressed in `tz`
pub fn time_from_micros(us: i64, tz: &str) -> Result<ChronoDateTime<FixedOffset>> {
    let location = location(tz)?;
    let seconds = us.div_euclid(MICROS_PER_SECOND);
    let nanos = u32::try_from(us.rem_euclid(MICROS_PER_SECOND) * 1000)
        .map_err(|_| Error::TimestampOutOfRange)?;
    let utc = ChronoDateTime::<Utc>::from_timestamp(seconds, nanos)
        .ok_or(Error::TimestampOutOfRange)?;
    let offset = location.offset_at(&utc.naive_utc());
    Ok(utc.with_timezone(&offset))
}

fn zone_suffix(dt: &ChronoDateTime<FixedOffset>, tz: &str) -> String {
    if tz.is_empty() || tz == UTC {
        UTC.to_string()
    } else {
        extract_timezone(dt)
    }
}

// ============================================================================
// time
// ============================================================================

/// Parse a FHIR `time` into microseconds since midnight.
pub fn parse_time(input: &str) -> Result<Time> {
    if !patterns::TIME.is_match(input) {
        return Err(ValidationError::malformed("invalid time").into());
    }
    let precision = if patterns::SUB_MILLI_TIME.is_match(input) {
        TimePrecision::Microsecond
    } else if patterns::SUB_SECOND_TIME.is_match(input) {
        TimePrecision::Millisecond
    } else {
        TimePrecision::Second
    };
    let parsed = NaiveTime::parse_from_str(input, "%H:%M:%S%.f").map_err(|_| {
        Error::from(ValidationError::malformed("invalid time layout").with_diagnostics(input))
    })?;
    Ok(Time {
        precision,
        value_us: i64::from(parsed.num_seconds_from_midnight()) * MICROS_PER_SECOND
            + i64::from(parsed.nanosecond() / 1000),
    })
}

/// Format microseconds since midnight; values outside one day wrap.
pub fn serialize_time(value_us: i64, precision: TimePrecision) -> Result<String> {
    let layout = match precision {
        TimePrecision::Second => "%H:%M:%S",
        TimePrecision::Millisecond => "%H:%M:%S%.3f",
        TimePrecision::Microsecond => "%H:%M:%S%.6f",
        TimePrecision::Unspecified => {
            return Err(Error::InvalidPrecision {
                kind: "time",
                precision: format!("{precision:?}"),
            })
        }
    };
    let us = value_us.rem_euclid(MICROS_PER_DAY);
    let time = u32::try_from(us / MICROS_PER_SECOND)
        .ok()
        .zip(u32::try_from(us % MICROS_PER_SECOND * 1000).ok())
        .and_then(|(secs, nanos)| NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos))
        .ok_or(Error::TimestampOutOfRange)?;
    Ok(time.format(layout).to_string())
}

// ============================================================================
// date
// ============================================================================

/// Parse a FHIR `date`; the value is local midnight in `default_tz`.
pub fn parse_date(input: &str, default_tz: &str) -> Result<Date> {
    if !patterns::DATE.is_match(input) {
        return Err(ValidationError::malformed("invalid date").into());
    }
    let (precision, naive) = parse_date_parts(input)?;
    let value_us = local_midnight_micros(&naive, default_tz)?;
    Ok(Date {
        precision,
        value_us,
        timezone: default_tz.to_string(),
    })
}

pub fn serialize_date(value_us: i64, precision: DatePrecision, tz: &str) -> Result<String> {
    let layout = match precision {
        DatePrecision::Year => "%Y",
        DatePrecision::Month => "%Y-%m",
        DatePrecision::Day => "%Y-%m-%d",
        DatePrecision::Unspecified => {
            return Err(Error::InvalidPrecision {
                kind: "date",
                precision: format!("{precision:?}"),
            })
        }
    };
    Ok(time_from_micros(value_us, tz)?.format(layout).to_string())
}

fn parse_date_parts(input: &str) -> Result<(DatePrecision, NaiveDate)> {
    let digits = input.trim_start_matches('-').len();
    let (precision, padded) = match digits {
        4 => (DatePrecision::Year, format!("{input}-01-01")),
        7 => (DatePrecision::Month, format!("{input}-01")),
        10 => (DatePrecision::Day, input.to_string()),
        _ => return Err(ValidationError::malformed("invalid date").into()),
    };
    let naive = NaiveDate::parse_from_str(&padded, "%Y-%m-%d").map_err(|_| {
        Error::from(ValidationError::malformed("invalid date").with_diagnostics(input))
    })?;
    Ok((precision, naive))
}

fn local_midnight_micros(date: &NaiveDate, tz: &str) -> Result<i64> {
    let location = location(tz)?;
    let local = date
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| location.from_local(&midnight))
        .ok_or_else(|| Error::from(ValidationError::malformed("invalid date")))?;
    Ok(timestamp_micros(&local))
}

// ============================================================================
// dateTime / instant
// ============================================================================

/// Parse a FHIR `dateTime`. Date-only forms are anchored to `default_tz`.
pub fn parse_date_time(input: &str, default_tz: &str) -> Result<DateTime> {
    if !patterns::DATE_TIME.is_match(input) {
        return Err(ValidationError::malformed("invalid dateTime").into());
    }
    if !input.contains('T') {
        let (precision, naive) = parse_date_parts(input)?;
        return Ok(DateTime {
            precision: precision.into(),
            value_us: local_midnight_micros(&naive, default_tz)?,
            timezone: default_tz.to_string(),
        });
    }
    let (dt, precision, timezone) = parse_zoned(input, "invalid dateTime")?;
    Ok(DateTime {
        precision: precision.into(),
        value_us: timestamp_micros(&dt),
        timezone,
    })
}

pub fn serialize_date_time(value_us: i64, precision: DateTimePrecision, tz: &str) -> Result<String> {
    match precision {
        DateTimePrecision::Year => serialize_date(value_us, DatePrecision::Year, tz),
        DateTimePrecision::Month => serialize_date(value_us, DatePrecision::Month, tz),
        DateTimePrecision::Day => serialize_date(value_us, DatePrecision::Day, tz),
        DateTimePrecision::Second => serialize_zoned(value_us, TimePrecision::Second, tz),
        DateTimePrecision::Millisecond => serialize_zoned(value_us, TimePrecision::Millisecond, tz),
        DateTimePrecision::Microsecond => serialize_zoned(value_us, TimePrecision::Microsecond, tz),
        DateTimePrecision::Unspecified => Err(Error::InvalidPrecision {
            kind: "dateTime",
            precision: format!("{precision:?}"),
        }),
    }
}

/// Parse a FHIR `instant`, which always carries a time and an offset.
pub fn parse_instant(input: &str) -> Result<Instant> {
    if !patterns::INSTANT.is_match(input) {
        return Err(ValidationError::malformed("invalid instant").into());
    }
    let (dt, precision, timezone) = parse_zoned(input, "invalid instant")?;
    Ok(Instant {
        precision,
        value_us: timestamp_micros(&dt),
        timezone,
    })
}

pub fn serialize_instant(value_us: i64, precision: TimePrecision, tz: &str) -> Result<String> {
    serialize_zoned(value_us, precision, tz)
}

fn parse_zoned(
    input: &str,
    detail: &'static str,
) -> Result<(ChronoDateTime<FixedOffset>, TimePrecision, String)> {
    let precision = if patterns::SUB_MILLI_DATE_TIME.is_match(input) {
        TimePrecision::Microsecond
    } else if patterns::SUB_SECOND_DATE_TIME.is_match(input) {
        TimePrecision::Millisecond
    } else {
        TimePrecision::Second
    };
    let dt = ChronoDateTime::parse_from_rfc3339(input)
        .map_err(|_| Error::from(ValidationError::malformed(detail).with_diagnostics(input)))?;
    let timezone = if input.ends_with(UTC) {
        UTC.to_string()
    } else {
        extract_timezone(&dt)
    };
    Ok((dt, precision, timezone))
}

fn serialize_zoned(value_us: i64, precision: TimePrecision, tz: &str) -> Result<String> {
    let layout = match precision {
        TimePrecision::Second => "%Y-%m-%dT%H:%M:%S",
        TimePrecision::Millisecond => "%Y-%m-%dT%H:%M:%S%.3f",
        TimePrecision::Microsecond => "%Y-%m-%dT%H:%M:%S%.6f",
        TimePrecision::Unspecified => {
            return Err(Error::InvalidPrecision {
                kind: "instant",
                precision: format!("{precision:?}"),
            })
        }
    };
    let dt = time_from_micros(value_us, tz)?;
    Ok(format!("{}{}", dt.format(layout), zone_suffix(&dt, tz)))
}
