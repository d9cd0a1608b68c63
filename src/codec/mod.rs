//! The type codec table: per-validation-type parse/format/SQL-type triplets.
//!
//! Every `text_validation_type_or_show_slider_number` tag of the dictionary
//! maps to one [`ValidationType`], which knows how to cast a raw exported
//! string into a typed [`DataValue`], render it back, and name the SQL column
//! type used by the migration generator.

pub mod number;
pub mod temporal;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use crate::error::{DictionaryError, Result};
pub use temporal::DateOrder;

/// A typed field value produced by a codec.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    /// Free text (pass-through validation types)
    Text(String),
    /// `integer`
    Integer(i64),
    /// `number*` decimal variants
    Number(Decimal),
    /// `date_*`
    Date(NaiveDate),
    /// `datetime_*`
    DateTime(NaiveDateTime),
    /// `time` and `time_mm_ss`
    Time(NaiveTime),
    /// Checkbox aggregate ("any choice selected")
    Bool(bool),
}

impl DataValue {
    /// Numeric view of the value, when one exists.
    ///
    /// Text parses leniently so raw comparisons like `[age] > 18` work when
    /// `age` carries no validation type.
    #[must_use]
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Integer(v) => Some(Decimal::from(*v)),
            Self::Number(v) => Some(*v),
            Self::Bool(v) => Some(Decimal::from(i64::from(*v))),
            Self::Text(s) => Decimal::from_str(s.trim()).ok(),
            _ => None,
        }
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for DataValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<bool> for DataValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl fmt::Display for DataValue {
    /// Canonical textual form, used for string comparisons and logging.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Self::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S")),
            Self::Time(v) => write!(f, "{}", v.format("%H:%M:%S")),
            Self::Bool(v) => f.write_str(if *v { "1" } else { "0" }),
        }
    }
}

/// One entry of the type codec table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationType {
    /// Empty tag: plain text, no validation
    None,
    /// `date_dmy` / `date_mdy` / `date_ymd`
    Date(DateOrder),
    /// `datetime_*` with optional seconds
    Datetime {
        /// Day/month/year ordering
        order: DateOrder,
        /// Whether the format carries seconds
        seconds: bool,
    },
    /// `integer`
    Integer,
    /// `number*`: optional fixed precision, optional comma-decimal locale
    Number {
        /// Declared decimal places (1..=4), `None` for unconstrained
        decimals: Option<u32>,
        /// Comma used as the decimal separator
        comma: bool,
    },
    /// `time` (`%H:%M`)
    Time,
    /// `time_mm_ss` (`%M:%S`)
    TimeMmSs,
    /// `email`
    Email,
    /// `phone`
    Phone,
    /// `phone_australia`
    PhoneAustralia,
    /// `postalcode_australia`
    PostalcodeAustralia,
    /// `postalcode_canada`
    PostalcodeCanada,
    /// `ssn`
    Ssn,
    /// `alpha_only`
    AlphaOnly,
    /// `vmrn` (medical record number)
    Mrn,
    /// `Zipcode` (capitalized in the source dictionaries)
    Zipcode,
    /// Unrecognized tag, treated as pass-through text
    Other(String),
}

impl ValidationType {
    /// Resolve a dictionary tag. Unknown tags become [`ValidationType::Other`]
    /// so newer dictionaries still load; callers may warn on those.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "" => Self::None,
            "date_dmy" => Self::Date(DateOrder::Dmy),
            "date_mdy" => Self::Date(DateOrder::Mdy),
            "date_ymd" => Self::Date(DateOrder::Ymd),
            "datetime_dmy" => Self::Datetime { order: DateOrder::Dmy, seconds: false },
            "datetime_mdy" => Self::Datetime { order: DateOrder::Mdy, seconds: false },
            "datetime_ymd" => Self::Datetime { order: DateOrder::Ymd, seconds: false },
            "datetime_seconds_dmy" => Self::Datetime { order: DateOrder::Dmy, seconds: true },
            "datetime_seconds_mdy" => Self::Datetime { order: DateOrder::Mdy, seconds: true },
            "datetime_seconds_ymd" => Self::Datetime { order: DateOrder::Ymd, seconds: true },
            "integer" => Self::Integer,
            "number" => Self::Number { decimals: None, comma: false },
            "number_comma_decimal" => Self::Number { decimals: None, comma: true },
            "number_1dp" => Self::Number { decimals: Some(1), comma: false },
            "number_1dp_comma_decimal" => Self::Number { decimals: Some(1), comma: true },
            "number_2dp" => Self::Number { decimals: Some(2), comma: false },
            "number_2dp_comma_decimal" => Self::Number { decimals: Some(2), comma: true },
            "number_3dp" => Self::Number { decimals: Some(3), comma: false },
            "number_3dp_comma_decimal" => Self::Number { decimals: Some(3), comma: true },
            "number_4dp" => Self::Number { decimals: Some(4), comma: false },
            "number_4dp_comma_decimal" => Self::Number { decimals: Some(4), comma: true },
            "time" => Self::Time,
            "time_mm_ss" => Self::TimeMmSs,
            "email" => Self::Email,
            "phone" => Self::Phone,
            "phone_australia" => Self::PhoneAustralia,
            "postalcode_australia" => Self::PostalcodeAustralia,
            "postalcode_canada" => Self::PostalcodeCanada,
            "ssn" => Self::Ssn,
            "alpha_only" => Self::AlphaOnly,
            "vmrn" => Self::Mrn,
            "Zipcode" => Self::Zipcode,
            other => Self::Other(other.to_string()),
        }
    }

    /// The dictionary tag for this codec; inverse of [`Self::from_tag`].
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::None => "",
            Self::Date(DateOrder::Dmy) => "date_dmy",
            Self::Date(DateOrder::Mdy) => "date_mdy",
            Self::Date(DateOrder::Ymd) => "date_ymd",
            Self::Datetime { order, seconds } => match (order, seconds) {
                (DateOrder::Dmy, false) => "datetime_dmy",
                (DateOrder::Mdy, false) => "datetime_mdy",
                (DateOrder::Ymd, false) => "datetime_ymd",
                (DateOrder::Dmy, true) => "datetime_seconds_dmy",
                (DateOrder::Mdy, true) => "datetime_seconds_mdy",
                (DateOrder::Ymd, true) => "datetime_seconds_ymd",
            },
            Self::Integer => "integer",
            Self::Number { decimals, comma } => match (decimals, comma) {
                (None, false) => "number",
                (None, true) => "number_comma_decimal",
                (Some(1), false) => "number_1dp",
                (Some(1), true) => "number_1dp_comma_decimal",
                (Some(2), false) => "number_2dp",
                (Some(2), true) => "number_2dp_comma_decimal",
                (Some(3), false) => "number_3dp",
                (Some(3), true) => "number_3dp_comma_decimal",
                (Some(4), false) => "number_4dp",
                (Some(4), true) => "number_4dp_comma_decimal",
                // Constructed only through from_tag, which never builds these
                _ => "number",
            },
            Self::Time => "time",
            Self::TimeMmSs => "time_mm_ss",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::PhoneAustralia => "phone_australia",
            Self::PostalcodeAustralia => "postalcode_australia",
            Self::PostalcodeCanada => "postalcode_canada",
            Self::Ssn => "ssn",
            Self::AlphaOnly => "alpha_only",
            Self::Mrn => "vmrn",
            Self::Zipcode => "Zipcode",
            Self::Other(tag) => tag,
        }
    }

    /// Whether the tag was recognized by the codec table.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Cast a raw exported string to its typed value.
    ///
    /// A malformed string is a [`DictionaryError::MalformedValue`]; no default
    /// is ever substituted.
    pub fn parse(&self, raw: &str) -> Result<DataValue> {
        match self {
            Self::Date(order) => Ok(DataValue::Date(temporal::parse_date(raw, *order, self.tag())?)),
            Self::Datetime { order, seconds } => Ok(DataValue::DateTime(
                temporal::parse_datetime(raw, *order, *seconds, self.tag())?,
            )),
            Self::Integer => raw
                .trim()
                .parse::<i64>()
                .map(DataValue::Integer)
                .map_err(|_| DictionaryError::MalformedValue {
                    raw: raw.to_string(),
                    tag: self.tag().to_string(),
                }),
            Self::Number { decimals, comma } => Ok(DataValue::Number(number::parse_number(
                raw, *decimals, *comma, self.tag(),
            )?)),
            Self::Time => Ok(DataValue::Time(temporal::parse_time(raw, "%H:%M", self.tag())?)),
            Self::TimeMmSs => Ok(DataValue::Time(temporal::parse_minutes_seconds(
                raw,
                self.tag(),
            )?)),
            // Free-text tags pass through unchanged
            _ => Ok(DataValue::Text(raw.to_string())),
        }
    }

    /// Render a typed value back to the dictionary's textual form.
    ///
    /// Left inverse of [`Self::parse`]: `parse(format(parse(s)))` equals
    /// `parse(s)` for every valid `s`.
    #[must_use]
    pub fn format(&self, value: &DataValue) -> String {
        match (self, value) {
            (Self::Date(order), DataValue::Date(d)) => d.format(order.date_format()).to_string(),
            (Self::Datetime { order, seconds }, DataValue::DateTime(dt)) => {
                dt.format(order.datetime_format(*seconds)).to_string()
            }
            (Self::Number { decimals, comma }, DataValue::Number(n)) => {
                number::format_number(n, *decimals, *comma)
            }
            (Self::Time, DataValue::Time(t)) => t.format("%H:%M").to_string(),
            (Self::TimeMmSs, DataValue::Time(t)) => t.format("%M:%S").to_string(),
            // Integer, text tags and codec/value mismatches use the canonical form
            _ => value.to_string(),
        }
    }

    /// SQL column type emitted by the migration generator.
    #[must_use]
    pub const fn sql_type(&self) -> &'static str {
        match self {
            Self::Date(_) => "DATE",
            Self::Datetime { .. } => "DATETIME",
            Self::Integer => "INT",
            Self::Number { .. } => "FLOAT",
            Self::Time | Self::TimeMmSs => "TIME",
            _ => "TEXT",
        }
    }
}

impl Default for ValidationType {
    fn default() -> Self {
        Self::None
    }
}
