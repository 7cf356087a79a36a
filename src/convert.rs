//! Type conversion helpers unrelated to HTTP.
//!
//! Extension traits for turning strings into primitive values, byte slices
//! into hex strings, and timestamps into date-time values. Conversions that
//! can fail return `Option` rather than panicking.
//!
//! # Examples
//!
//! ```rust
//! use wiretap::convert::{StrExt, ToHex};
//!
//! assert_eq!("42".to_i32(), Some(42));
//! assert_eq!("not a number".to_i32(), None);
//! assert_eq!([0x7Fu8, 0x2C, 0x4A, 0x00].to_hex(), "7F2C4A00");
//! ```

use bigdecimal::BigDecimal;
use chrono::{DateTime, Datelike, NaiveDateTime, Utc};

/// Conversions from string values to other base data types.
pub trait StrExt {
    /// Parses a 32-bit signed integer, or `None` when the value does not
    /// represent one.
    fn to_i32(&self) -> Option<i32>;

    /// Parses a 64-bit signed integer, or `None` when the value does not
    /// represent one.
    fn to_i64(&self) -> Option<i64>;

    /// Parses a double-precision floating-point number, or `None` when the
    /// value does not represent one.
    fn to_f64(&self) -> Option<f64>;

    /// Parses an arbitrary-precision decimal number, or `None` when the
    /// value does not represent one.
    fn to_decimal(&self) -> Option<BigDecimal>;

    /// `true` for `"true"`, `false` for `"false"` (case-insensitive);
    /// numeric values map to `value != 0`; anything else is `false`.
    fn to_bool(&self) -> bool;

    /// Parses a UTC date-time from RFC 3339 or `"%Y-%m-%d %H:%M:%S"`, or
    /// `None` when neither form matches.
    fn to_datetime(&self) -> Option<DateTime<Utc>>;
}

impl StrExt for str {
    fn to_i32(&self) -> Option<i32> {
        self.trim().parse().ok()
    }

    fn to_i64(&self) -> Option<i64> {
        self.trim().parse().ok()
    }

    fn to_f64(&self) -> Option<f64> {
        self.trim().parse().ok()
    }

    fn to_decimal(&self) -> Option<BigDecimal> {
        self.trim().parse().ok()
    }

    fn to_bool(&self) -> bool {
        match self.trim().to_ascii_lowercase().as_str() {
            "true" => true,
            "false" => false,
            other => other.parse::<f64>().map(|v| v != 0.0).unwrap_or(false),
        }
    }

    fn to_datetime(&self) -> Option<DateTime<Utc>> {
        if let Ok(datetime) = DateTime::parse_from_rfc3339(self.trim()) {
            return Some(datetime.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(self.trim(), "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// Hexadecimal rendering of byte slices.
pub trait ToHex {
    /// Uppercase hex pairs without separators, e.g. `"7F2C4A00"`.
    fn to_hex(&self) -> String;
}

impl ToHex for [u8] {
    fn to_hex(&self) -> String {
        let mut out = String::with_capacity(self.len() * 2);
        for byte in self {
            out.push_str(&format!("{byte:02X}"));
        }
        out
    }
}

/// Conversions from a UTC date-time to other representations.
pub trait DateTimeExt {
    /// Seconds since the Unix epoch.
    fn to_unix(&self) -> i64;

    /// The date as a `yyyyMMdd` integer, e.g. `20260101`.
    fn to_date_i32(&self) -> i32;

    /// The date and time formatted as `yyyy-MM-dd HH:mm:ss`.
    fn to_datetime_string(&self) -> String;
}

impl DateTimeExt for DateTime<Utc> {
    fn to_unix(&self) -> i64 {
        self.timestamp()
    }

    fn to_date_i32(&self) -> i32 {
        self.year() * 10_000 + self.month() as i32 * 100 + self.day() as i32
    }

    fn to_datetime_string(&self) -> String {
        self.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Conversion from Unix seconds to a UTC date-time.
pub trait UnixTimeExt {
    /// The UTC date-time for this Unix timestamp, or `None` when it is out
    /// of the representable range.
    fn to_datetime(&self) -> Option<DateTime<Utc>>;
}

impl UnixTimeExt for i64 {
    fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(*self, 0)
    }
}
