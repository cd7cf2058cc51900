//! Timestamp codec for the TickTick wire format.
//!
//! # Design
//! Most endpoints write dates as `2019-11-13T03:00:00+0000`, but some send
//! fractional seconds and some send a bare millisecond epoch integer for the
//! same field. Decoding accepts every one of those shapes; encoding always
//! writes the second-precision string. Reads are tolerant, writes canonical.
//!
//! The zero `Time` means "no date". It encodes as `""` and is what both `""`
//! and `null` decode to. Whether a key is sent at all is decided by the
//! request record (`Option<Time>`), never by this codec.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, TimeZone};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TimeError;

/// Layout written on encode.
pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Layout accepted on decode. `%.f` matches an optional `.` fraction.
const PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

const MAX_FRACTION_DIGITS: usize = 9;

/// A point in time with a fixed UTC offset, or the zero "no date" value.
///
/// Equality compares instants, so `03:00+0000` equals `11:00+0800`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Time(Option<DateTime<FixedOffset>>);

impl Time {
    pub fn new<Tz: TimeZone>(datetime: DateTime<Tz>) -> Self {
        Self(Some(datetime.fixed_offset()))
    }

    pub const fn zero() -> Self {
        Self(None)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_none()
    }

    pub fn as_datetime(&self) -> Option<&DateTime<FixedOffset>> {
        self.0.as_ref()
    }

    pub fn into_datetime(self) -> Option<DateTime<FixedOffset>> {
        self.0
    }

    /// Instant `millis` milliseconds after the Unix epoch, in UTC.
    pub fn from_millis(millis: i64) -> Result<Self, TimeError> {
        DateTime::from_timestamp_millis(millis)
            .map(Self::new)
            .ok_or(TimeError::OutOfRange { millis })
    }

    /// Parse the unquoted string form. `""` is the zero value.
    pub fn parse_wire(s: &str) -> Result<Self, TimeError> {
        if s.is_empty() {
            return Ok(Self::zero());
        }
        let malformed = || TimeError::Malformed { raw: s.to_string() };
        if !has_wire_shape(s) {
            return Err(malformed());
        }
        DateTime::parse_from_str(s, PARSE_FORMAT)
            .map(|datetime| Self(Some(datetime)))
            .map_err(|_| malformed())
    }

    /// Decode one raw JSON token: `null`, a quoted string, or a bare integer.
    ///
    /// This is the same rule set the `Deserialize` impl applies inside
    /// records, usable without going through a JSON document.
    pub fn from_json_token(raw: &str) -> Result<Self, TimeError> {
        let token = raw.trim();
        if token == "null" {
            return Ok(Self::zero());
        }
        if let Some(inner) = token
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
        {
            // No escape sequence can appear in a valid layout string.
            if inner.contains(['\\', '"']) {
                return Err(TimeError::Malformed {
                    raw: inner.to_string(),
                });
            }
            return Self::parse_wire(inner);
        }
        let digits = token.strip_prefix('-').unwrap_or(token);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return token
                .parse::<i64>()
                .map_err(|_| TimeError::Malformed {
                    raw: token.to_string(),
                })
                .and_then(Self::from_millis);
        }
        Err(TimeError::Malformed {
            raw: token.to_string(),
        })
    }
}

/// Exact byte shape of the layout: `YYYY-MM-DDTHH:MM:SS`, an optional `.`
/// with 1 to 9 digits, then `+HHMM` or `-HHMM`. chrono alone also takes
/// short fields, signed years and `+HH:MM`.
fn has_wire_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() < 24 {
        return false;
    }
    let (head, mut rest) = bytes.split_at(19);
    let head_ok = head.iter().enumerate().all(|(i, &b)| match i {
        4 | 7 => b == b'-',
        10 => b == b'T',
        13 | 16 => b == b':',
        _ => b.is_ascii_digit(),
    });
    if !head_ok {
        return false;
    }
    if let Some(fraction) = rest.strip_prefix(b".") {
        let digits = fraction.iter().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 || digits > MAX_FRACTION_DIGITS {
            return false;
        }
        rest = &fraction[digits..];
    }
    match rest {
        [b'+' | b'-', offset @ ..] => offset.len() == 4 && offset.iter().all(u8::is_ascii_digit),
        _ => false,
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Time {
    fn from(datetime: DateTime<Tz>) -> Self {
        Self::new(datetime)
    }
}

/// Writes the wire form: `""` for zero, otherwise second precision.
impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(datetime) => write!(f, "{}", datetime.format(WIRE_FORMAT)),
            None => Ok(()),
        }
    }
}

impl FromStr for Time {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_wire(s)
    }
}

impl Serialize for Time {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Time {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TimeVisitor)
    }
}

struct TimeVisitor;

impl<'de> Visitor<'de> for TimeVisitor {
    type Value = Time;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a timestamp string, an epoch-millisecond integer, or null")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Time, E> {
        Time::parse_wire(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Time, E> {
        Time::from_millis(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Time, E> {
        let millis = i64::try_from(v).map_err(|_| {
            E::custom(TimeError::Malformed { raw: v.to_string() })
        })?;
        self.visit_i64(millis)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Time, E> {
        Ok(Time::zero())
    }

    fn visit_none<E: de::Error>(self) -> Result<Time, E> {
        Ok(Time::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike, Utc};

    #[test]
    fn encodes_fixed_layout() {
        let t = Time::new(Utc.with_ymd_and_hms(2019, 11, 13, 3, 0, 0).unwrap());
        assert_eq!(
            serde_json::to_string(&t).unwrap(),
            r#""2019-11-13T03:00:00+0000""#
        );
    }

    #[test]
    fn encodes_zero_as_empty_string() {
        assert_eq!(serde_json::to_string(&Time::zero()).unwrap(), r#""""#);
        assert_eq!(serde_json::to_string(&Time::default()).unwrap(), r#""""#);
    }

    #[test]
    fn encode_keeps_offset_and_drops_fraction() {
        let offset = FixedOffset::east_opt(8 * 3600).unwrap();
        let datetime = offset
            .with_ymd_and_hms(2024, 1, 15, 9, 30, 5)
            .unwrap()
            .with_nanosecond(123_000_000)
            .unwrap();
        assert_eq!(Time::new(datetime).to_string(), "2024-01-15T09:30:05+0800");
    }

    #[test]
    fn decodes_layout_string() {
        let t: Time = serde_json::from_str(r#""2019-11-13T03:00:00+0000""#).unwrap();
        let datetime = t.as_datetime().unwrap();
        assert_eq!((datetime.year(), datetime.month(), datetime.day()), (2019, 11, 13));
        assert_eq!(datetime.hour(), 3);
    }

    #[test]
    fn decodes_empty_string_and_null_as_zero() {
        let empty: Time = serde_json::from_str(r#""""#).unwrap();
        let null: Time = serde_json::from_str("null").unwrap();
        assert!(empty.is_zero());
        assert!(null.is_zero());
    }

    #[test]
    fn decodes_fractional_seconds() {
        let t: Time = serde_json::from_str(r#""2026-02-21T18:00:28.352+0000""#).unwrap();
        let datetime = t.as_datetime().unwrap();
        assert_eq!((datetime.year(), datetime.month(), datetime.day()), (2026, 2, 21));
        assert_eq!(
            (datetime.hour(), datetime.minute(), datetime.second()),
            (18, 0, 28)
        );
        assert_eq!(datetime.nanosecond(), 352_000_000);
    }

    #[test]
    fn decodes_nine_fraction_digits() {
        let t = Time::parse_wire("2026-02-21T18:00:28.123456789+0000").unwrap();
        assert_eq!(t.as_datetime().unwrap().nanosecond(), 123_456_789);
    }

    #[test]
    fn rejects_ten_fraction_digits() {
        assert!(Time::parse_wire("2026-02-21T18:00:28.1234567890+0000").is_err());
    }

    #[test]
    fn rejects_bare_dot() {
        assert!(Time::parse_wire("2026-02-21T18:00:28.+0000").is_err());
    }

    #[test]
    fn rejects_short_fields() {
        assert_eq!(
            Time::parse_wire("2019-1-3T3:0:0+0000"),
            Err(TimeError::Malformed {
                raw: "2019-1-3T3:0:0+0000".to_string()
            })
        );
        assert!(Time::parse_wire("2019-11-13T3:00:00+0000").is_err());
    }

    #[test]
    fn rejects_signed_or_extended_year() {
        assert!(Time::parse_wire("+2019-11-13T03:00:00+0000").is_err());
        assert!(Time::parse_wire("-2019-11-13T03:00:00+0000").is_err());
        assert!(Time::parse_wire("12019-11-13T03:00:00+0000").is_err());
    }

    #[test]
    fn rejects_offset_variants() {
        assert!(Time::parse_wire("2019-11-13T03:00:00+00:00").is_err());
        assert!(Time::parse_wire("2019-11-13T03:00:00.352+00:00").is_err());
        assert!(Time::parse_wire("2019-11-13T03:00:00+00").is_err());
        assert!(Time::parse_wire("2019-11-13T03:00:00Z").is_err());
        assert!(Time::parse_wire("2019-11-13T03:00:00+00000").is_err());
    }

    #[test]
    fn rejects_trailing_text() {
        assert!(Time::parse_wire("2019-11-13T03:00:00+0000 ").is_err());
        assert!(Time::parse_wire(" 2019-11-13T03:00:00+0000").is_err());
    }

    #[test]
    fn token_with_short_fields_is_rejected() {
        assert_eq!(
            Time::from_json_token(r#""2019-1-3T3:0:0+0000""#),
            Err(TimeError::Malformed {
                raw: "2019-1-3T3:0:0+0000".to_string()
            })
        );
        assert!(serde_json::from_str::<Time>(r#""2019-1-3T3:0:0+0000""#).is_err());
    }

    #[test]
    fn decodes_bare_integer_as_epoch_millis() {
        let t: Time = serde_json::from_str("1732885211000").unwrap();
        let expected = DateTime::from_timestamp_millis(1_732_885_211_000).unwrap();
        assert_eq!(t, Time::new(expected));
        assert_eq!(t.as_datetime().unwrap().offset().local_minus_utc(), 0);
    }

    #[test]
    fn rejects_malformed_string_naming_token() {
        let err = serde_json::from_str::<Time>(r#""not-a-date""#).unwrap_err();
        assert!(err.to_string().contains("not-a-date"), "{err}");
    }

    #[test]
    fn rejects_float_and_bool() {
        assert!(serde_json::from_str::<Time>("1.5").is_err());
        assert!(serde_json::from_str::<Time>("true").is_err());
    }

    #[test]
    fn round_trips_at_second_granularity() {
        let original = Utc
            .with_ymd_and_hms(2024, 6, 30, 23, 59, 59)
            .unwrap()
            .with_nanosecond(999_000_000)
            .unwrap();
        let encoded = serde_json::to_string(&Time::new(original)).unwrap();
        let decoded: Time = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, Time::new(original.with_nanosecond(0).unwrap()));
    }

    #[test]
    fn equality_compares_instants() {
        let utc = Time::new(Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap());
        let plus_eight = Time::parse_wire("2024-01-01T11:00:00+0800").unwrap();
        assert_eq!(utc, plus_eight);
    }

    // --- raw token parser ---

    #[test]
    fn token_null_and_empty_are_zero() {
        assert_eq!(Time::from_json_token("null"), Ok(Time::zero()));
        assert_eq!(Time::from_json_token(r#""""#), Ok(Time::zero()));
    }

    #[test]
    fn token_integer_is_millis() {
        let t = Time::from_json_token("1732885211000").unwrap();
        assert_eq!(t, Time::from_millis(1_732_885_211_000).unwrap());
    }

    #[test]
    fn token_quoted_string_is_layout() {
        let t = Time::from_json_token(r#""2026-02-21T18:00:28.352+0000""#).unwrap();
        assert_eq!(t.as_datetime().unwrap().nanosecond(), 352_000_000);
    }

    #[test]
    fn token_malformed_names_inner_text() {
        assert_eq!(
            Time::from_json_token(r#""not-a-date""#),
            Err(TimeError::Malformed {
                raw: "not-a-date".to_string()
            })
        );
    }

    #[test]
    fn token_unquoted_text_is_rejected() {
        assert_eq!(
            Time::from_json_token("2019-11-13T03:00:00+0000"),
            Err(TimeError::Malformed {
                raw: "2019-11-13T03:00:00+0000".to_string()
            })
        );
        assert!(Time::from_json_token("12.5").is_err());
        assert!(Time::from_json_token("-").is_err());
    }

    #[test]
    fn token_out_of_range_millis() {
        assert_eq!(
            Time::from_json_token(&i64::MAX.to_string()),
            Err(TimeError::OutOfRange { millis: i64::MAX })
        );
    }
}
