//! Microsecond-precision UTC timestamps.
//!
//! [`UtcDateTime`] is the time type used throughout the crate. It wraps a
//! [`chrono::NaiveDateTime`] that is always interpreted as UTC, and converts
//! to and from floating-point epoch seconds without ever consulting the host
//! timezone.

use std::fmt;
use std::ops::Sub;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};

use crate::{Error, Result};

const MICROS_PER_SECOND: i64 = 1_000_000;

/// 0001-01-01T00:00:00 UTC in epoch microseconds.
const MIN_EPOCH_MICROS: i64 = -62_135_596_800 * MICROS_PER_SECOND;
/// 9999-12-31T23:59:59.999999 UTC in epoch microseconds.
const MAX_EPOCH_MICROS: i64 = 253_402_300_799 * MICROS_PER_SECOND + 999_999;

/// An immutable UTC point in time with microsecond resolution.
///
/// Valid years are 1 through 9999. Equality and ordering follow the
/// calendar.
///
/// # Examples
///
/// ```
/// use seismo_core::UtcDateTime;
///
/// let t = UtcDateTime::from_timestamp(1240561632.005).unwrap();
/// assert_eq!((t.year(), t.month(), t.day()), (2009, 4, 24));
/// assert_eq!((t.hour(), t.minute(), t.second()), (8, 27, 12));
/// assert_eq!(t.microsecond(), 5000);
/// assert_eq!(t.to_epoch(), 1240561632.005);
///
/// let later = t.checked_add_seconds(60.0).unwrap();
/// assert_eq!(later.to_string(), "2009-04-24T08:28:12.005000Z");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(NaiveDateTime);

impl UtcDateTime {
    /// 1970-01-01T00:00:00 UTC.
    pub fn epoch() -> Self {
        Self(DateTime::<Utc>::UNIX_EPOCH.naive_utc())
    }

    /// Build a timestamp from calendar fields.
    ///
    /// Fails with [`Error::InvalidTime`] for out-of-range fields, such as
    /// month 13, February 30, second 60 or a microsecond of one million.
    pub fn new(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        microsecond: u32,
    ) -> Result<Self> {
        if !(1..=9999).contains(&year) {
            return Err(Error::InvalidTime(format!("year {year} out of range 1..=9999")));
        }
        // chrono accepts second=59 with microsecond >= 1_000_000 as a leap second
        if second > 59 || microsecond >= MICROS_PER_SECOND as u32 {
            return Err(Error::InvalidTime(format!(
                "invalid time of day {hour:02}:{minute:02}:{second:02}.{microsecond:06}"
            )));
        }
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            Error::InvalidTime(format!("invalid date {year:04}-{month:02}-{day:02}"))
        })?;
        let naive = date
            .and_hms_micro_opt(hour, minute, second, microsecond)
            .ok_or_else(|| {
                Error::InvalidTime(format!(
                    "invalid time of day {hour:02}:{minute:02}:{second:02}.{microsecond:06}"
                ))
            })?;
        Ok(Self(naive))
    }

    /// Midnight of the given calendar day.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        Self::new(year, month, day, 0, 0, 0, 0)
    }

    /// Interpret `seconds` as seconds since 1970-01-01T00:00:00 UTC.
    ///
    /// The value is quantized to the nearest microsecond, so any value whose
    /// fractional part is a whole number of microseconds round-trips through
    /// [`to_epoch`](Self::to_epoch).
    pub fn from_timestamp(seconds: f64) -> Result<Self> {
        if !seconds.is_finite() {
            return Err(Error::InvalidTime(format!("non-finite timestamp {seconds}")));
        }
        let micros = (seconds * MICROS_PER_SECOND as f64).round();
        if micros < MIN_EPOCH_MICROS as f64 || micros > MAX_EPOCH_MICROS as f64 {
            return Err(Error::InvalidTime(format!(
                "timestamp {seconds} outside years 1..=9999"
            )));
        }
        Self::from_timestamp_micros(micros as i64)
    }

    /// Interpret `micros` as microseconds since the UTC epoch.
    pub fn from_timestamp_micros(micros: i64) -> Result<Self> {
        if !(MIN_EPOCH_MICROS..=MAX_EPOCH_MICROS).contains(&micros) {
            return Err(Error::InvalidTime(format!(
                "timestamp {micros}us outside years 1..=9999"
            )));
        }
        let secs = micros.div_euclid(MICROS_PER_SECOND);
        let nanos = micros.rem_euclid(MICROS_PER_SECOND) as u32 * 1_000;
        DateTime::from_timestamp(secs, nanos)
            .map(|dt| Self(dt.naive_utc()))
            .ok_or_else(|| Error::InvalidTime(format!("timestamp {micros}us not representable")))
    }

    /// Seconds since 1970-01-01T00:00:00 UTC.
    ///
    /// The fractional part is `microsecond / 1_000_000`.
    pub fn to_epoch(&self) -> f64 {
        let whole = self.0.and_utc().timestamp();
        whole as f64 + f64::from(self.microsecond()) / MICROS_PER_SECOND as f64
    }

    /// Microseconds since the UTC epoch.
    pub fn timestamp_micros(&self) -> i64 {
        self.0.and_utc().timestamp_micros()
    }

    /// Shift by a (possibly negative, fractional) number of seconds.
    pub fn checked_add_seconds(&self, seconds: f64) -> Result<Self> {
        if !seconds.is_finite() {
            return Err(Error::InvalidTime(format!("non-finite offset {seconds}")));
        }
        let delta = (seconds * MICROS_PER_SECOND as f64).round();
        if delta.abs() > (MAX_EPOCH_MICROS - MIN_EPOCH_MICROS) as f64 {
            return Err(Error::InvalidTime(format!("offset {seconds}s out of range")));
        }
        Self::from_timestamp_micros(self.timestamp_micros() + delta as i64)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Day of the year, 1-366.
    pub fn julday(&self) -> u32 {
        self.0.ordinal()
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn second(&self) -> u32 {
        self.0.second()
    }

    pub fn microsecond(&self) -> u32 {
        self.0.nanosecond() / 1_000
    }

    /// The wrapped calendar value (UTC).
    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }
}

impl Default for UtcDateTime {
    fn default() -> Self {
        Self::epoch()
    }
}

impl fmt::Display for UtcDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S%.6fZ"))
    }
}

/// Difference in seconds.
impl Sub for UtcDateTime {
    type Output = f64;

    fn sub(self, rhs: Self) -> f64 {
        (self.timestamp_micros() - rhs.timestamp_micros()) as f64 / MICROS_PER_SECOND as f64
    }
}

/// Naive values are taken to be UTC. Sub-microsecond precision is dropped.
impl TryFrom<NaiveDateTime> for UtcDateTime {
    type Error = Error;

    fn try_from(naive: NaiveDateTime) -> Result<Self> {
        let micros = (naive.nanosecond() / 1_000).min(999_999);
        Self::new(
            naive.year(),
            naive.month(),
            naive.day(),
            naive.hour(),
            naive.minute(),
            naive.second(),
            micros,
        )
    }
}

impl<Tz: TimeZone> TryFrom<DateTime<Tz>> for UtcDateTime {
    type Error = Error;

    fn try_from(dt: DateTime<Tz>) -> Result<Self> {
        Self::try_from(dt.naive_utc())
    }
}

impl From<UtcDateTime> for DateTime<Utc> {
    fn from(t: UtcDateTime) -> Self {
        t.0.and_utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use proptest::prelude::*;

    #[test]
    fn test_epoch_zero() {
        let t = UtcDateTime::from_timestamp(0.0).unwrap();
        assert_eq!(t, UtcDateTime::new(1970, 1, 1, 0, 0, 0, 0).unwrap());
        assert_eq!(t, UtcDateTime::epoch());
        assert_eq!(t.to_string(), "1970-01-01T00:00:00.000000Z");
    }

    #[test]
    fn test_one_day() {
        let t = UtcDateTime::from_timestamp(86400.0).unwrap();
        assert_eq!(t, UtcDateTime::from_ymd(1970, 1, 2).unwrap());
        assert_eq!(t.to_epoch(), 86400.0);
    }

    #[test]
    fn test_fractional_timestamp() {
        let t = UtcDateTime::from_timestamp(1240561632.005).unwrap();
        assert_eq!(t, UtcDateTime::new(2009, 4, 24, 8, 27, 12, 5000).unwrap());
        assert_eq!(t.julday(), 114);
        assert_eq!(t.to_epoch(), 1240561632.005);
    }

    #[test]
    fn test_pre_epoch() {
        let t = UtcDateTime::from_timestamp(-0.5).unwrap();
        assert_eq!(t, UtcDateTime::new(1969, 12, 31, 23, 59, 59, 500_000).unwrap());
        assert_eq!(t.to_epoch(), -0.5);
    }

    #[test]
    fn test_invalid_calendar_fields() {
        assert!(matches!(
            UtcDateTime::from_ymd(2009, 13, 1),
            Err(Error::InvalidTime(_))
        ));
        assert!(UtcDateTime::from_ymd(2009, 2, 30).is_err());
        assert!(UtcDateTime::from_ymd(2008, 2, 29).is_ok());
        assert!(UtcDateTime::new(2009, 1, 1, 24, 0, 0, 0).is_err());
        assert!(UtcDateTime::new(2009, 1, 1, 0, 0, 60, 0).is_err());
        assert!(UtcDateTime::new(2009, 1, 1, 0, 0, 59, 1_000_000).is_err());
        assert!(UtcDateTime::from_ymd(0, 1, 1).is_err());
        assert!(UtcDateTime::from_ymd(10000, 1, 1).is_err());
    }

    #[test]
    fn test_invalid_timestamps() {
        assert!(UtcDateTime::from_timestamp(f64::NAN).is_err());
        assert!(UtcDateTime::from_timestamp(f64::INFINITY).is_err());
        assert!(UtcDateTime::from_timestamp(1e300).is_err());
        assert!(UtcDateTime::from_timestamp(-1e12).is_err());
    }

    #[test]
    fn test_range_limits() {
        let first = UtcDateTime::from_timestamp_micros(MIN_EPOCH_MICROS).unwrap();
        assert_eq!(first, UtcDateTime::from_ymd(1, 1, 1).unwrap());
        let last = UtcDateTime::from_timestamp_micros(MAX_EPOCH_MICROS).unwrap();
        assert_eq!(last, UtcDateTime::new(9999, 12, 31, 23, 59, 59, 999_999).unwrap());
        assert!(UtcDateTime::from_timestamp_micros(MAX_EPOCH_MICROS + 1).is_err());
    }

    #[test]
    fn test_from_chrono() {
        let naive = NaiveDate::from_ymd_opt(2009, 5, 24)
            .unwrap()
            .and_hms_nano_opt(8, 28, 12, 5_001_999)
            .unwrap();
        let t = UtcDateTime::try_from(naive).unwrap();
        assert_eq!(t, UtcDateTime::new(2009, 5, 24, 8, 28, 12, 5001).unwrap());

        // 10:28 at +02:00 is 08:28 UTC
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = offset.with_ymd_and_hms(2009, 5, 24, 10, 28, 12).unwrap();
        let t = UtcDateTime::try_from(local).unwrap();
        assert_eq!(t, UtcDateTime::new(2009, 5, 24, 8, 28, 12, 0).unwrap());

        let back: DateTime<Utc> = t.into();
        assert_eq!(back.timestamp(), t.to_epoch() as i64);
    }

    #[test]
    fn test_add_and_sub() {
        let t = UtcDateTime::from_ymd(2016, 12, 31).unwrap();
        let next = t.checked_add_seconds(86400.25).unwrap();
        assert_eq!(next, UtcDateTime::new(2017, 1, 1, 0, 0, 0, 250_000).unwrap());
        assert_eq!(next - t, 86400.25);
        assert_eq!(t - next, -86400.25);
        assert!(t.checked_add_seconds(f64::NAN).is_err());
        assert!(t.checked_add_seconds(1e15).is_err());
    }

    #[test]
    fn test_ordering() {
        let a = UtcDateTime::from_timestamp(10.0).unwrap();
        let b = UtcDateTime::from_timestamp(10.000001).unwrap();
        assert!(a < b);
        assert_eq!(a.max(b), b);
    }

    proptest! {
        #[test]
        fn prop_epoch_roundtrip(secs in -2_000_000_000i64..2_000_000_000, us in 0u32..1_000_000) {
            let x = secs as f64 + f64::from(us) / 1e6;
            let t = UtcDateTime::from_timestamp(x).unwrap();
            prop_assert_eq!(t.microsecond(), us);
            prop_assert_eq!(t.to_epoch(), x);
        }

        #[test]
        fn prop_calendar_roundtrip(
            year in 1902i32..2038,
            month in 1u32..=12,
            day in 1u32..=28,
            hour in 0u32..24,
            minute in 0u32..60,
            second in 0u32..60,
            us in 0u32..1_000_000,
        ) {
            let t = UtcDateTime::new(year, month, day, hour, minute, second, us).unwrap();
            let back = UtcDateTime::from_timestamp(t.to_epoch()).unwrap();
            prop_assert_eq!(back, t);
        }
    }
}
