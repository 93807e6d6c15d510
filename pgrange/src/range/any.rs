use std::fmt as sfmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::element::ElementKind;

use super::parse::ParseRangeError;
use super::Range;

/// A range whose element kind is only known at runtime, the form handed
/// across the persistence seam together with the column's range type name.
///
/// ```
/// # use pgrange::{AnyRange, ElementKind};
/// let range = AnyRange::parse("[0,18)", ElementKind::Int4).unwrap();
/// assert_eq!(range.kind(), ElementKind::Int4);
/// assert_eq!("[0,18)", range.to_string());
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum AnyRange {
    Int4(Range<i32>),
    Int8(Range<i64>),
    Numeric(Range<Decimal>),
    Date(Range<NaiveDate>),
    Timestamp(Range<NaiveDateTime>),
    Timestamptz(Range<DateTime<FixedOffset>>),
}

impl AnyRange {
    /// Parses a wire literal under the codec selected by `kind`.
    pub fn parse(literal: &str, kind: ElementKind) -> Result<AnyRange, ParseRangeError> {
        match kind {
            ElementKind::Int4 => literal.parse().map(AnyRange::Int4),
            ElementKind::Int8 => literal.parse().map(AnyRange::Int8),
            ElementKind::Numeric => literal.parse().map(AnyRange::Numeric),
            ElementKind::Date => literal.parse().map(AnyRange::Date),
            ElementKind::Timestamp => literal.parse().map(AnyRange::Timestamp),
            ElementKind::Timestamptz => literal.parse().map(AnyRange::Timestamptz),
        }
    }

    /// Parses a wire literal for a declared database range type name.
    ///
    /// The name is resolved before any of the literal is examined, so an
    /// unsupported type never reaches the parser.
    pub fn parse_typed(type_name: &str, literal: &str) -> Result<AnyRange, ParseRangeError> {
        let kind = ElementKind::from_range_type_name(type_name)
            .map_err(|err| ParseRangeError::new(literal, err.into()))?;
        AnyRange::parse(literal, kind)
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            AnyRange::Int4(_) => ElementKind::Int4,
            AnyRange::Int8(_) => ElementKind::Int8,
            AnyRange::Numeric(_) => ElementKind::Numeric,
            AnyRange::Date(_) => ElementKind::Date,
            AnyRange::Timestamp(_) => ElementKind::Timestamp,
            AnyRange::Timestamptz(_) => ElementKind::Timestamptz,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            AnyRange::Int4(range) => range.is_empty(),
            AnyRange::Int8(range) => range.is_empty(),
            AnyRange::Numeric(range) => range.is_empty(),
            AnyRange::Date(range) => range.is_empty(),
            AnyRange::Timestamp(range) => range.is_empty(),
            AnyRange::Timestamptz(range) => range.is_empty(),
        }
    }
}

impl sfmt::Display for AnyRange {
    fn fmt(&self, f: &mut sfmt::Formatter<'_>) -> sfmt::Result {
        match self {
            AnyRange::Int4(range) => range.fmt(f),
            AnyRange::Int8(range) => range.fmt(f),
            AnyRange::Numeric(range) => range.fmt(f),
            AnyRange::Date(range) => range.fmt(f),
            AnyRange::Timestamp(range) => range.fmt(f),
            AnyRange::Timestamptz(range) => range.fmt(f),
        }
    }
}

impl From<Range<i32>> for AnyRange {
    fn from(value: Range<i32>) -> Self {
        AnyRange::Int4(value)
    }
}

impl From<Range<i64>> for AnyRange {
    fn from(value: Range<i64>) -> Self {
        AnyRange::Int8(value)
    }
}

impl From<Range<Decimal>> for AnyRange {
    fn from(value: Range<Decimal>) -> Self {
        AnyRange::Numeric(value)
    }
}

impl From<Range<NaiveDate>> for AnyRange {
    fn from(value: Range<NaiveDate>) -> Self {
        AnyRange::Date(value)
    }
}

impl From<Range<NaiveDateTime>> for AnyRange {
    fn from(value: Range<NaiveDateTime>) -> Self {
        AnyRange::Timestamp(value)
    }
}

impl From<Range<DateTime<FixedOffset>>> for AnyRange {
    fn from(value: Range<DateTime<FixedOffset>>) -> Self {
        AnyRange::Timestamptz(value)
    }
}

/// Serialized as the `{type, value}` pair the driver seam exchanges.
#[derive(Serialize, Deserialize)]
#[serde(rename = "AnyRange")]
struct AnyRangeRepr {
    #[serde(rename = "type")]
    type_name: String,
    value: String,
}

impl Serialize for AnyRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        AnyRangeRepr {
            type_name: self.kind().to_string(),
            value: self.to_string(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AnyRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = AnyRangeRepr::deserialize(deserializer)?;
        AnyRange::parse_typed(&repr.type_name, &repr.value).map_err(de::Error::custom)
    }
}
