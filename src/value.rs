use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{Error, Result};
use crate::node::Node;
use crate::types::DataType;

/// A typed literal: a partition value taken from a file path, or the payload
/// of a constant in a predicate.
///
/// Raw partition values are plain strings; [`Value::parse`] gives them the
/// type declared for their column so they compare correctly against the
/// literals of the predicate.
///
/// # Examples
///
/// ```
/// use sqlprune::types::DataType;
/// use sqlprune::value::Value;
/// use chrono::NaiveDate;
///
/// let dt = Value::parse("2024-03-01", &DataType::Date).unwrap();
/// assert_eq!(dt, Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
///
/// let flag = Value::parse("t", &DataType::Boolean).unwrap();
/// assert_eq!(flag, Value::Boolean(true));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL
    Null,

    Boolean(bool),

    /// Any integer type up to BIGINT
    Integer(i64),

    /// FLOAT or DOUBLE
    Float(f64),

    /// Fixed-point number (DECIMAL)
    Decimal(Decimal),

    String(String),

    Date(NaiveDate),

    /// Timestamp without a zone; zoned input is normalized to UTC
    Timestamp(NaiveDateTime),
}

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

const TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
];

impl Value {
    /// Parses a raw string as a value of `data_type`.
    ///
    /// - BOOLEAN accepts `true`/`false`/`t`/`f`/`1`/`0` in any case
    /// - DATE accepts a day count since 1970-01-01, `yyyy-MM-dd` or `MM/dd/yyyy`
    /// - TIMESTAMP accepts milliseconds since the epoch, RFC 3339,
    ///   `yyyy-MM-dd HH:mm:ss[.f]` (with a space or `T`), `MM/dd/yyyy HH:mm:ss`
    ///   or a bare date
    pub fn parse(raw: &str, data_type: &DataType) -> Result<Value> {
        let text = raw.trim();
        let fail = || Error::TypeConversion {
            value: raw.to_string(),
            target: data_type.to_sql(),
        };

        match data_type {
            DataType::Null | DataType::Varchar => Ok(Value::String(raw.to_string())),

            DataType::Boolean => match text.to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Ok(Value::Boolean(true)),
                "false" | "f" | "0" => Ok(Value::Boolean(false)),
                _ => Err(fail()),
            },

            DataType::TinyInt | DataType::SmallInt | DataType::Integer | DataType::BigInt => {
                let n = text.parse::<i64>().map_err(|_| fail())?;
                let fits = match data_type {
                    DataType::TinyInt => i8::try_from(n).is_ok(),
                    DataType::SmallInt => i16::try_from(n).is_ok(),
                    DataType::Integer => i32::try_from(n).is_ok(),
                    _ => true,
                };
                if fits { Ok(Value::Integer(n)) } else { Err(fail()) }
            }

            DataType::Float | DataType::Double => {
                text.parse::<f64>().map(Value::Float).map_err(|_| fail())
            }

            DataType::Decimal { scale, .. } => {
                let d = text.parse::<Decimal>().map_err(|_| fail())?;
                Ok(Value::Decimal(d.round_dp(u32::from(*scale))))
            }

            DataType::Date => parse_date(text).map(Value::Date).ok_or_else(fail),

            DataType::Timestamp | DataType::TimestampTz => {
                parse_timestamp(text).map(Value::Timestamp).ok_or_else(fail)
            }

            other => Err(Error::UnsupportedShape(format!(
                "cannot read a {} value from text",
                other.to_sql()
            ))),
        }
    }

    /// Reads the payload of a `CONSTANT` node.
    ///
    /// The serializer writes DATE constants as days since the epoch,
    /// TIMESTAMP constants as microseconds since the epoch and DECIMAL
    /// constants as an integer scaled by `type_info.scale`.
    pub fn from_constant(constant: &Node) -> Result<Value> {
        let payload = constant.require("value")?;
        if payload.get("is_null").and_then(Node::as_bool) == Some(true) {
            return Ok(Value::Null);
        }
        let data_type = DataType::from_type_node(payload.require("type")?)?;
        let raw = payload.require("value")?;
        let fail = || Error::TypeConversion {
            value: format!("{:?}", raw),
            target: data_type.to_sql(),
        };

        match &data_type {
            DataType::Null => Ok(Value::Null),
            DataType::Varchar => raw.as_str().map(|s| Value::String(s.to_string())).ok_or_else(fail),
            DataType::Boolean => raw.as_bool().map(Value::Boolean).ok_or_else(fail),
            DataType::TinyInt | DataType::SmallInt | DataType::Integer | DataType::BigInt => {
                raw.as_i64().map(Value::Integer).ok_or_else(fail)
            }
            DataType::Float | DataType::Double => raw.as_f64().map(Value::Float).ok_or_else(fail),
            DataType::Decimal { scale, .. } => raw
                .as_i64()
                .map(|n| Value::Decimal(Decimal::new(n, u32::from(*scale))))
                .ok_or_else(fail),
            DataType::Date => raw
                .as_i64()
                .and_then(date_from_epoch_days)
                .map(Value::Date)
                .ok_or_else(fail),
            DataType::Timestamp | DataType::TimestampTz => raw
                .as_i64()
                .and_then(DateTime::from_timestamp_micros)
                .map(|ts| Value::Timestamp(ts.naive_utc()))
                .ok_or_else(fail),
            other => Err(Error::UnsupportedShape(format!(
                "constants of type {} are not supported",
                other.to_sql()
            ))),
        }
    }

    /// Converts to `target`, going through the text form when the variant changes.
    pub fn cast(&self, target: &DataType) -> Result<Value> {
        let same = matches!(
            (self, target),
            (Value::Null, _)
                | (Value::Boolean(_), DataType::Boolean)
                | (Value::String(_), DataType::Varchar)
                | (Value::Date(_), DataType::Date)
                | (Value::Timestamp(_), DataType::Timestamp | DataType::TimestampTz)
                | (Value::Float(_), DataType::Float | DataType::Double)
        );
        if same {
            return Ok(self.clone());
        }
        match (self, target) {
            (Value::Date(d), DataType::Timestamp | DataType::TimestampTz) => {
                Ok(Value::Timestamp(d.and_time(chrono::NaiveTime::MIN)))
            }
            (Value::Timestamp(ts), DataType::Date) => Ok(Value::Date(ts.date())),
            (Value::Integer(n), DataType::Float | DataType::Double) => Ok(Value::Float(*n as f64)),
            _ => Value::parse(&self.render(), target),
        }
    }

    /// Compares two values of compatible types; `None` for NULL or
    /// incompatible operands.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        use Value::*;
        match (self, other) {
            (Null, _) | (_, Null) => None,
            (Boolean(a), Boolean(b)) => Some(a.cmp(b)),
            (Integer(a), Integer(b)) => Some(a.cmp(b)),
            (Decimal(a), Decimal(b)) => Some(a.cmp(b)),
            (Integer(a), Decimal(b)) => Some(rust_decimal::Decimal::from(*a).cmp(b)),
            (Decimal(a), Integer(b)) => Some(a.cmp(&rust_decimal::Decimal::from(*b))),
            (String(a), String(b)) => Some(a.cmp(b)),
            (Date(a), Date(b)) => Some(a.cmp(b)),
            (Timestamp(a), Timestamp(b)) => Some(a.cmp(b)),
            (Date(a), Timestamp(b)) => Some(a.and_time(chrono::NaiveTime::MIN).cmp(b)),
            (Timestamp(a), Date(b)) => Some(a.cmp(&b.and_time(chrono::NaiveTime::MIN))),
            (a, b) => match (a.as_float(), b.as_float()) {
                (Some(x), Some(y)) => x.partial_cmp(&y),
                _ => None,
            },
        }
    }

    /// Reads a string operand as the type of the value it is compared with,
    /// the way an untyped literal like `dt = '2024-01-02'` is implicitly
    /// cast. Anything other than a string against a typed value is returned
    /// unchanged; `None` when the text does not parse.
    pub fn coerce_like(&self, other: &Value) -> Option<Value> {
        let Value::String(text) = self else {
            return Some(self.clone());
        };
        let target = match other {
            Value::Null | Value::String(_) => return Some(self.clone()),
            Value::Boolean(_) => DataType::Boolean,
            Value::Integer(_) => DataType::BigInt,
            Value::Float(_) => DataType::Double,
            Value::Decimal(_) => return text.trim().parse::<Decimal>().ok().map(Value::Decimal),
            Value::Date(_) => DataType::Date,
            Value::Timestamp(_) => DataType::Timestamp,
        };
        Value::parse(text, &target).ok()
    }

    /// Numeric view used for mixed integer/float/decimal comparisons.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            Value::Decimal(d) => d.to_f64(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text form, readable back by [`Value::parse`].
    pub fn render(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(n) => n.to_string(),
            Value::Decimal(d) => d.to_string(),
            Value::String(s) => s.clone(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

fn date_from_epoch_days(days: i64) -> Option<NaiveDate> {
    let days = chrono::TimeDelta::try_days(days)?;
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(days)
}

fn is_integer_text(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    if is_integer_text(text) {
        return text.parse::<i64>().ok().and_then(date_from_epoch_days);
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    if is_integer_text(text) {
        return text
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis)
            .map(|ts| ts.naive_utc());
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.naive_utc());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
}
