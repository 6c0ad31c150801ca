//! Temporal value types used on the wire.
//!
//! `Date` is a calendar day encoded as `YYYY-MM-DD`, `Time` is a wall-clock
//! time encoded in lowercase kitchen form (`3:04pm`) and `Timestamp` is an
//! RFC 3339 instant in UTC. All three serialize as newtype structs wrapping
//! their string form, which keeps JSON and query encoding identical while
//! letting `stringify` render them inside braces.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Timelike, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(NaiveDate);

impl Date {
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn parse(value: &str) -> Result<Self, Error> {
        let raw = unquote(value);
        if !has_date_shape(raw) {
            return Err(Error::DateParse(value.to_string()));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| Error::DateParse(value.to_string()))
    }

    pub fn naive(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for Date {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

impl FromStr for Date {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Serialize for Date {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct("Date", &self.to_string())
    }
}

impl<'de> Deserialize<'de> for Date {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(ParseVisitor::<Date>::new("a YYYY-MM-DD date"))
    }
}

/// Wall-clock time of day. The date half is anchored to today in the local
/// zone at parse time and carries no meaning; equality and ordering only
/// look at the time of day.
#[derive(Debug, Clone, Copy)]
pub struct Time(NaiveDateTime);

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool {
        self.0.time() == other.0.time()
    }
}

impl Eq for Time {}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Time {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.time().cmp(&other.0.time())
    }
}

impl std::hash::Hash for Time {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.time().hash(state);
    }
}

impl Time {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(anchor_today)
    }

    /// Accepts `H:MM`, `HH:MM` and kitchen forms like `9:13AM` or `09:39am`.
    pub fn parse(value: &str) -> Result<Self, Error> {
        parse_wall_clock(unquote(value))
            .map(anchor_today)
            .ok_or_else(|| Error::TimeParse(value.to_string()))
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }
}

impl FromStr for Time {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%-I:%M%P"))
    }
}

impl Serialize for Time {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct("Time", &self.to_string())
    }
}

impl<'de> Deserialize<'de> for Time {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(ParseVisitor::<Time>::new("a wall-clock time such as 3:04pm"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn parse(value: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(unquote(value)).map(|moment| Self(moment.with_timezone(&Utc)))
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct("Timestamp", &self.to_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(ParseVisitor::<Timestamp>::new("an RFC 3339 timestamp"))
    }
}

struct ParseVisitor<T> {
    expecting: &'static str,
    marker: std::marker::PhantomData<T>,
}

impl<T> ParseVisitor<T> {
    fn new(expecting: &'static str) -> Self {
        Self {
            expecting,
            marker: std::marker::PhantomData,
        }
    }
}

impl<T> Visitor<'_> for ParseVisitor<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.expecting)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<T, E> {
        value.parse().map_err(E::custom)
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}

fn has_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes
            .iter()
            .enumerate()
            .all(|(index, byte)| match index {
                4 | 7 => *byte == b'-',
                _ => byte.is_ascii_digit(),
            })
}

fn parse_wall_clock(value: &str) -> Option<NaiveTime> {
    let lower = value.to_ascii_lowercase();
    let (clock, meridiem) = if let Some(rest) = lower.strip_suffix("am") {
        (rest, Some(false))
    } else if let Some(rest) = lower.strip_suffix("pm") {
        (rest, Some(true))
    } else {
        (lower.as_str(), None)
    };

    let (hour, minute) = clock.split_once(':')?;
    if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
        return None;
    }
    if !hour.bytes().chain(minute.bytes()).all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;

    let hour = match meridiem {
        None => hour,
        Some(_) if !(1..=12).contains(&hour) => return None,
        Some(false) => hour % 12,
        Some(true) => hour % 12 + 12,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn anchor_today(time: NaiveTime) -> Time {
    Time(Local::now().date_naive().and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_parse_round_trips() {
        let date = Date::parse("2026-02-03").unwrap();
        assert_eq!(date, Date::new(2026, 2, 3).unwrap());
        assert_eq!(date.to_string(), "2026-02-03");
        assert_eq!(Date::parse(&date.to_string()).unwrap(), date);
    }

    #[test]
    fn date_parse_accepts_json_quotes() {
        let date = Date::parse("\"2018-03-30\"").unwrap();
        assert_eq!(date, Date::new(2018, 3, 30).unwrap());
    }

    #[test]
    fn date_parse_rejects_other_shapes() {
        for value in ["", "gibberish", "2006-13-01", "2006-1-1", "02-03-2026"] {
            assert!(
                matches!(Date::parse(value), Err(Error::DateParse(_))),
                "{value:?} should not parse"
            );
        }
    }

    #[test]
    fn date_json_is_quoted_ten_characters() {
        let date = Date::new(2019, 1, 2).unwrap();
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"2019-01-02\"");
        let decoded: Date = serde_json::from_str("\"2019-01-02\"").unwrap();
        assert_eq!(decoded, date);
    }

    #[test]
    fn null_date_decodes_as_absent() {
        let decoded: Option<Date> = serde_json::from_str("null").unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn time_parse_tolerates_common_forms() {
        let cases = [
            ("15:04", 15, 4),
            ("7:34", 7, 34),
            ("9:13AM", 9, 13),
            ("8:13am", 8, 13),
            ("09:39am", 9, 39),
            ("10:13pm", 22, 13),
            ("12:00am", 0, 0),
            ("12:30pm", 12, 30),
        ];
        for (input, hour, minute) in cases {
            for candidate in [input.to_string(), format!("\"{input}\"")] {
                let time = Time::parse(&candidate).unwrap();
                assert_eq!((time.hour(), time.minute()), (hour, minute), "{candidate}");
            }
        }
    }

    #[test]
    fn time_parse_rejects_invalid_values() {
        for value in ["", "13:03pm", "13:03am", "gibberish", "24:00", "7:5", "0:15am"] {
            assert!(
                matches!(Time::parse(value), Err(Error::TimeParse(_))),
                "{value:?} should not parse"
            );
        }
    }

    #[test]
    fn time_emits_lowercase_kitchen_form() {
        assert_eq!(Time::new(15, 4).unwrap().to_string(), "3:04pm");
        assert_eq!(Time::new(0, 5).unwrap().to_string(), "12:05am");
        assert_eq!(
            serde_json::to_string(&Time::new(9, 30).unwrap()).unwrap(),
            "\"9:30am\""
        );
    }

    #[test]
    fn time_compares_time_of_day_only() {
        let yesterday = Local::now().date_naive().pred_opt().unwrap();
        let earlier_day = Time(yesterday.and_hms_opt(15, 4, 0).unwrap());
        let today = Time::new(15, 4).unwrap();
        assert_eq!(earlier_day, today);
        assert!(Time::new(9, 0).unwrap() < Time(yesterday.and_hms_opt(10, 0, 0).unwrap()));
        assert!(Time(yesterday.and_hms_opt(23, 0, 0).unwrap()) > Time::new(1, 0).unwrap());
    }

    #[test]
    fn time_is_anchored_to_today() {
        let time = Time::parse("8:00am").unwrap();
        assert_eq!(time.naive().date(), Local::now().date_naive());
    }

    #[test]
    fn timestamp_emits_utc_z() {
        let stamp = Timestamp::parse("2018-01-31T21:34:30+01:00").unwrap();
        assert_eq!(stamp.to_string(), "2018-01-31T20:34:30Z");
        let decoded: Timestamp = serde_json::from_str("\"2018-01-31T20:34:30Z\"").unwrap();
        assert_eq!(decoded, stamp);
    }
}
