use chrono::{FixedOffset, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone as _};
use chrono_tz::Tz;
use std::fmt;
use tracing::debug;

use super::{ForeignObject, InteropError};
use crate::{Shared, builtins::Builtins, types::Type};

const MAX_OFFSET_HOURS: i64 = 18;
const SECONDS_PER_HOUR: i64 = 3600;
const SECONDS_PER_MINUTE: i64 = 60;

/// The rules a [`TimeZone`] resolves offsets with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// A region from the IANA database, e.g. `Europe/Warsaw`.
    Region(Tz),
    /// A constant offset from UTC.
    Fixed(FixedOffset),
    /// A constant offset written after a universal time prefix, e.g. `UTC+01:00`.
    Prefixed(OffsetPrefix, FixedOffset),
}

/// The prefixes an offset id may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetPrefix {
    Utc,
    Gmt,
    Ut,
}

impl OffsetPrefix {
    const ALL: [OffsetPrefix; 3] = [OffsetPrefix::Utc, OffsetPrefix::Gmt, OffsetPrefix::Ut];

    pub fn as_str(self) -> &'static str {
        match self {
            OffsetPrefix::Utc => "UTC",
            OffsetPrefix::Gmt => "GMT",
            OffsetPrefix::Ut => "UT",
        }
    }

    /// Splits `GMT+2` into its prefix and the signed offset that follows it.
    fn split(text: &str) -> Option<(Self, &str)> {
        Self::ALL.into_iter().find_map(|prefix| {
            text.strip_prefix(prefix.as_str())
                .filter(|rest| rest.starts_with(['+', '-']))
                .map(|rest| (prefix, rest))
        })
    }
}

impl Zone {
    pub fn id(&self) -> String {
        match self {
            Zone::Region(tz) => tz.name().to_string(),
            Zone::Fixed(offset) => offset_id(offset.local_minus_utc()),
            Zone::Prefixed(prefix, offset) => match offset.local_minus_utc() {
                0 => prefix.as_str().to_string(),
                seconds => format!("{}{}", prefix.as_str(), offset_id(seconds)),
            },
        }
    }

    /// Offset from UTC in seconds at the given local date-time.
    ///
    /// In a gap the offset before the transition is used, in an overlap the earlier one.
    pub fn offset_at(&self, local: NaiveDateTime) -> i32 {
        match self {
            Zone::Fixed(offset) | Zone::Prefixed(_, offset) => offset.local_minus_utc(),
            Zone::Region(tz) => match tz.offset_from_local_datetime(&local) {
                LocalResult::Single(offset) | LocalResult::Ambiguous(offset, _) => {
                    offset.fix().local_minus_utc()
                }
                LocalResult::None => {
                    let before = local.checked_sub_signed(TimeDelta::days(1)).unwrap_or(local);
                    tz.offset_from_utc_datetime(&before).fix().local_minus_utc()
                }
            },
        }
    }
}

/// A time zone value. Offset queries are pure functions of the zone and the instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeZone {
    zone: Zone,
}

impl TimeZone {
    pub fn new(zone: Zone) -> Self {
        Self { zone }
    }

    pub fn utc() -> Self {
        Self::new(Zone::Region(Tz::UTC))
    }

    /// Parses a region id (`Europe/Warsaw`, `UTC`), an offset id (`Z`, `+01:30`, `-0500`)
    /// or a prefixed offset id (`UTC+01:00`, `GMT-5`, `UT`).
    pub fn parse(text: &str) -> Result<Self, InteropError> {
        if text == "Z" {
            return Self::from_offset(0, 0, 0);
        }

        if text.starts_with(['+', '-']) {
            let seconds = parse_offset_id(text)?;
            return fixed_offset(seconds).map(|offset| Self::new(Zone::Fixed(offset)));
        }

        let prefixed = if text == OffsetPrefix::Ut.as_str() {
            Some((OffsetPrefix::Ut, 0))
        } else if let Some((prefix, rest)) = OffsetPrefix::split(text) {
            let seconds = parse_offset_id(rest).map_err(|_| {
                InteropError::InvalidDateTime(format!("Invalid ID for offset-based zone: {text}"))
            })?;
            Some((prefix, seconds))
        } else {
            None
        };
        if let Some((prefix, seconds)) = prefixed {
            return fixed_offset(seconds).map(|offset| Self::new(Zone::Prefixed(prefix, offset)));
        }

        text.parse::<Tz>()
            .map(|tz| Self::new(Zone::Region(tz)))
            .map_err(|err| InteropError::ZoneRules {
                id: text.to_string(),
                reason: err.to_string(),
            })
    }

    /// A fixed offset zone built from hours, minutes and seconds.
    ///
    /// All components must share the sign of the non-zero ones, minutes and seconds
    /// must lie within -59..=59 and the total within -18:00..=+18:00.
    pub fn from_offset(hours: i64, minutes: i64, seconds: i64) -> Result<Self, InteropError> {
        let total = validate_offset(hours, minutes, seconds)?;
        fixed_offset(total).map(|offset| Self::new(Zone::Fixed(offset)))
    }

    /// The default zone of the process: `TZ` when it names a known zone, then the region
    /// configured in the operating system, and the current local offset as a last resort.
    pub fn system() -> Self {
        Self::system_from(
            std::env::var("TZ").ok().as_deref(),
            iana_time_zone::get_timezone().ok().as_deref(),
        )
    }

    fn system_from(tz: Option<&str>, os_zone: Option<&str>) -> Self {
        tz.map(|id| id.trim_start_matches(':'))
            .into_iter()
            .chain(os_zone)
            .find_map(|id| Self::parse(id).ok())
            .unwrap_or_else(|| {
                debug!("No system time zone region found, using the current local offset");
                Self::new(Zone::Fixed(*chrono::Local::now().offset()))
            })
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn zone_id(&self) -> String {
        self.zone.id()
    }

    /// Offset of this zone in seconds at the instant described by `at`.
    ///
    /// Returns 0 when `at` does not expose both a date and a time.
    // TODO: consider raising an unsupported message instead of answering 0 once callers
    // stop relying on the lenient behaviour.
    pub fn offset(&self, at: &dyn ForeignObject) -> i64 {
        match (at.as_date(), at.as_time()) {
            (Ok(date), Ok(time)) => i64::from(self.zone.offset_at(date.and_time(time))),
            _ => {
                debug!(
                    zone = %self.zone_id(),
                    at = %at.to_display_string(),
                    "Value has no date and time, using zero offset"
                );
                0
            }
        }
    }
}

impl fmt::Display for TimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.zone_id())
    }
}

impl ForeignObject for TimeZone {
    fn to_display_string(&self) -> String {
        self.zone_id()
    }

    fn has_meta_object(&self) -> bool {
        true
    }

    fn meta_object(&self, builtins: &Builtins) -> Result<Shared<Type>, InteropError> {
        Ok(Shared::clone(builtins.time_zone()))
    }

    fn has_type(&self) -> bool {
        true
    }

    fn type_of(&self, builtins: &Builtins) -> Result<Shared<Type>, InteropError> {
        Ok(Shared::clone(builtins.time_zone()))
    }

    fn is_time_zone(&self) -> bool {
        true
    }

    fn as_time_zone(&self) -> Result<Zone, InteropError> {
        Ok(self.zone)
    }
}

fn fixed_offset(seconds: i64) -> Result<FixedOffset, InteropError> {
    i32::try_from(seconds)
        .ok()
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            InteropError::InvalidDateTime(format!("Zone offset {seconds}s is out of range"))
        })
}

fn validate_offset(hours: i64, minutes: i64, seconds: i64) -> Result<i64, InteropError> {
    if !(-MAX_OFFSET_HOURS..=MAX_OFFSET_HOURS).contains(&hours) {
        return Err(InteropError::InvalidDateTime(format!(
            "Zone offset hours not in valid range: value {hours} is not in the range -18 to 18"
        )));
    }

    if hours > 0 {
        if minutes < 0 || seconds < 0 {
            return Err(InteropError::InvalidDateTime(
                "Zone offset minutes and seconds must be positive because hours is positive"
                    .to_string(),
            ));
        }
    } else if hours < 0 {
        if minutes > 0 || seconds > 0 {
            return Err(InteropError::InvalidDateTime(
                "Zone offset minutes and seconds must be negative because hours is negative"
                    .to_string(),
            ));
        }
    } else if (minutes > 0 && seconds < 0) || (minutes < 0 && seconds > 0) {
        return Err(InteropError::InvalidDateTime(
            "Zone offset minutes and seconds must have the same sign".to_string(),
        ));
    }

    if !(-59..=59).contains(&minutes) {
        return Err(InteropError::InvalidDateTime(format!(
            "Zone offset minutes not in valid range: value {minutes} is not in the range -59 to 59"
        )));
    }

    if !(-59..=59).contains(&seconds) {
        return Err(InteropError::InvalidDateTime(format!(
            "Zone offset seconds not in valid range: value {seconds} is not in the range -59 to 59"
        )));
    }

    if hours.abs() == MAX_OFFSET_HOURS && (minutes != 0 || seconds != 0) {
        return Err(InteropError::InvalidDateTime(
            "Zone offset not in valid range: -18:00 to +18:00".to_string(),
        ));
    }

    Ok(hours * SECONDS_PER_HOUR + minutes * SECONDS_PER_MINUTE + seconds)
}

fn parse_offset_id(text: &str) -> Result<i64, InteropError> {
    let invalid = || {
        InteropError::InvalidDateTime(format!("Invalid ID for zone offset, invalid format: {text}"))
    };

    if !text.is_ascii() {
        return Err(invalid());
    }

    let (sign, digits) = text.split_at(1);
    let sign = if sign == "-" { -1 } else { 1 };
    let bytes = digits.as_bytes();
    let number = |range: std::ops::Range<usize>| -> Result<i64, InteropError> {
        let part = &digits[range];
        if part.bytes().all(|b| b.is_ascii_digit()) {
            part.parse::<i64>().map_err(|_| invalid())
        } else {
            Err(invalid())
        }
    };

    let (hours, minutes, seconds) = match bytes.len() {
        1 => (number(0..1)?, 0, 0),
        2 => (number(0..2)?, 0, 0),
        4 => (number(0..2)?, number(2..4)?, 0),
        5 if bytes[2] == b':' => (number(0..2)?, number(3..5)?, 0),
        6 => (number(0..2)?, number(2..4)?, number(4..6)?),
        8 if bytes[2] == b':' && bytes[5] == b':' => {
            (number(0..2)?, number(3..5)?, number(6..8)?)
        }
        _ => return Err(invalid()),
    };

    validate_offset(sign * hours, sign * minutes, sign * seconds)
}

fn offset_id(total_seconds: i32) -> String {
    if total_seconds == 0 {
        return "Z".to_string();
    }

    let sign = if total_seconds < 0 { '-' } else { '+' };
    let total = total_seconds.unsigned_abs();
    let (hours, minutes, seconds) = (total / 3600, total / 60 % 60, total % 60);

    if seconds == 0 {
        format!("{sign}{hours:02}:{minutes:02}")
    } else {
        format!("{sign}{hours:02}:{minutes:02}:{seconds:02}")
    }
}
