use std::fmt::{self, Display, Formatter};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::mysql::{MySql, MySqlRow, MySqlValueRef};
use sqlx::{Decode, Row, TypeInfo, ValueRef};

use crate::error::{BoxDynError, Error, Result};

/// A host-side scalar: the value of a bound parameter or of a fetched column.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Double(f64),
    String(String),
    /// Column data that is not valid UTF-8 (binary strings, blobs, bit fields).
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The raw bytes of a string or binary value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::String(s) => Some(s.as_bytes()),
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub(crate) fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(s) => Value::String(s),
            Err(err) => Value::Bytes(err.into_bytes()),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::Bytes(v) => f.write_str(&String::from_utf8_lossy(v)),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&'_ str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&'_ [u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_owned())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Decodes every column of `row`, in column order.
pub(crate) fn decode_row(row: &MySqlRow) -> Result<Vec<Value>> {
    (0..row.len())
        .map(|index| {
            let raw = row.try_get_raw(index)?;

            decode_column(raw).map_err(|source| Error::Decode { index, source })
        })
        .collect()
}

// Both the text and the binary protocol are handled by the `Decode` impls, so values are
// decoded by SQL type name rather than through the driver's Rust-type compatibility checks.
fn decode_column(raw: MySqlValueRef<'_>) -> Result<Value, BoxDynError> {
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let name = raw.type_info().name().to_owned();

    Ok(match name.as_str() {
        "NULL" => Value::Null,

        "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            Value::Int(<i64 as Decode<'_, MySql>>::decode(raw)?)
        }

        // values above `i64::MAX` are returned as their decimal string
        _ if name.ends_with(" UNSIGNED") => {
            let value = <u64 as Decode<'_, MySql>>::decode(raw)?;

            i64::try_from(value).map_or_else(|_| Value::String(value.to_string()), Value::Int)
        }

        "FLOAT" | "DOUBLE" => Value::Double(<f64 as Decode<'_, MySql>>::decode(raw)?),

        "DATE" => Value::String(match <NaiveDate as Decode<'_, MySql>>::decode(raw.clone()) {
            Ok(date) => date.format("%Y-%m-%d").to_string(),
            Err(_) => temporal_text(raw, &name)?,
        }),

        "DATETIME" | "TIMESTAMP" => {
            Value::String(match <NaiveDateTime as Decode<'_, MySql>>::decode(raw.clone()) {
                Ok(datetime) => datetime.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
                Err(_) => temporal_text(raw, &name)?,
            })
        }

        "TIME" => Value::String(match <NaiveTime as Decode<'_, MySql>>::decode(raw.clone()) {
            Ok(time) => time.format("%H:%M:%S%.f").to_string(),
            Err(_) => temporal_text(raw, &name)?,
        }),

        // character data, DECIMAL, ENUM, SET and JSON arrive as length-encoded strings;
        // binary strings and blobs stay bytes unless they happen to be valid UTF-8
        _ => Value::from_bytes(<&[u8] as Decode<'_, MySql>>::decode(raw)?.to_owned()),
    })
}

// Zero dates and times outside `00:00:00..24:00:00` have no chrono representation;
// these are rendered the way the server prints them.
fn temporal_text(raw: MySqlValueRef<'_>, name: &str) -> Result<String, BoxDynError> {
    let buf = <&[u8] as Decode<'_, MySql>>::decode(raw)?;

    // text values start with a digit or a sign, binary ones with their length (0..=12)
    match buf.first() {
        None => Err("empty temporal value".into()),
        Some(b'0'..=b'9' | b'-') => Ok(std::str::from_utf8(buf)?.to_owned()),
        Some(_) if name == "TIME" => Ok(binary_time(&buf[1..])),
        Some(_) => Ok(binary_datetime(&buf[1..], name != "DATE")),
    }
}

// year: u16, month, day, [hour, minute, second, [microseconds: u32]]
fn binary_datetime(buf: &[u8], with_time: bool) -> String {
    let byte = |i: usize| buf.get(i).copied().unwrap_or(0);

    let year = u16::from_le_bytes([byte(0), byte(1)]);
    let mut text = format!("{year:04}-{:02}-{:02}", byte(2), byte(3));

    if with_time {
        text.push_str(&format!(" {:02}:{:02}:{:02}", byte(4), byte(5), byte(6)));

        let micros = u32::from_le_bytes([byte(7), byte(8), byte(9), byte(10)]);

        if micros != 0 {
            text.push_str(&format!(".{micros:06}"));
        }
    }

    text
}

// is_negative, days: u32, hour, minute, second, [microseconds: u32]
fn binary_time(buf: &[u8]) -> String {
    let byte = |i: usize| buf.get(i).copied().unwrap_or(0);

    let sign = if byte(0) == 1 { "-" } else { "" };
    let days = u32::from_le_bytes([byte(1), byte(2), byte(3), byte(4)]);
    let hours = u64::from(days) * 24 + u64::from(byte(5));
    let micros = u32::from_le_bytes([byte(8), byte(9), byte(10), byte(11)]);

    let mut text = format!("{sign}{hours:02}:{:02}:{:02}", byte(6), byte(7));

    if micros != 0 {
        text.push_str(&format!(".{micros:06}"));
    }

    text
}

#[test]
fn it_formats_zero_binary_dates() {
    assert_eq!(binary_datetime(&[], false), "0000-00-00");
    assert_eq!(binary_datetime(&[], true), "0000-00-00 00:00:00");
    assert_eq!(binary_datetime(&[0xe4, 0x07, 0, 0], false), "2020-00-00");
}

#[test]
fn it_formats_binary_datetimes_with_micros() {
    let buf = [0xe4, 0x07, 2, 29, 13, 5, 9, 0x40, 0xe2, 0x01, 0x00];

    assert_eq!(binary_datetime(&buf, true), "2020-02-29 13:05:09.123456");
}

#[test]
fn it_formats_times_outside_a_day() {
    // -100:00:00
    assert_eq!(binary_time(&[1, 4, 0, 0, 0, 4, 0, 0]), "-100:00:00");
    // 838:59:59.000001
    assert_eq!(
        binary_time(&[0, 34, 0, 0, 0, 22, 59, 59, 1, 0, 0, 0]),
        "838:59:59.000001"
    );
    assert_eq!(binary_time(&[]), "00:00:00");
}

#[test]
fn it_keeps_valid_utf8_as_string() {
    assert_eq!(
        Value::from_bytes(b"Hello World".to_vec()),
        Value::String("Hello World".into())
    );
}

#[test]
fn it_keeps_invalid_utf8_as_bytes() {
    assert_eq!(
        Value::from_bytes(vec![0xff, 0x00, 0xfe]),
        Value::Bytes(vec![0xff, 0x00, 0xfe])
    );
}

#[test]
fn it_converts_options_to_null() {
    assert_eq!(Value::from(None::<i64>), Value::Null);
    assert_eq!(Value::from(Some("x")), Value::String("x".into()));
}
