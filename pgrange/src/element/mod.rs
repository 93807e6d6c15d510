use std::fmt as sfmt;
use std::str::FromStr;

use derive_more::Display;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

mod num;
mod time;

/// The element type governing the endpoints of a range.
///
/// Each kind corresponds to one of the built-in PostgreSQL range types and
/// displays as that type's name.
///
/// ```
/// # use pgrange::ElementKind;
/// let kind = "numrange".parse::<ElementKind>().unwrap();
/// assert_eq!(kind, ElementKind::Numeric);
/// assert_eq!("numrange", kind.to_string());
/// ```
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Display)]
pub enum ElementKind {
    #[display("int4range")]
    Int4,
    #[display("int8range")]
    Int8,
    #[display("numrange")]
    Numeric,
    #[display("daterange")]
    Date,
    #[display("tsrange")]
    Timestamp,
    #[display("tstzrange")]
    Timestamptz,
}

impl ElementKind {
    /// Resolves a declared database range type name to its element kind.
    ///
    /// This is the dialect seam: callers that know a column's type name use
    /// it to pick the kind before any literal is parsed.
    pub fn from_range_type_name(name: &str) -> Result<ElementKind, UnsupportedRangeType> {
        match name {
            "int4range" => Ok(ElementKind::Int4),
            "int8range" => Ok(ElementKind::Int8),
            "numrange" => Ok(ElementKind::Numeric),
            "daterange" => Ok(ElementKind::Date),
            "tsrange" => Ok(ElementKind::Timestamp),
            "tstzrange" => Ok(ElementKind::Timestamptz),
            _ => Err(UnsupportedRangeType(name.to_owned())),
        }
    }
}

impl FromStr for ElementKind {
    type Err = UnsupportedRangeType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementKind::from_range_type_name(s)
    }
}

impl Serialize for ElementKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ElementKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KindVisitor;

        impl de::Visitor<'_> for KindVisitor {
            type Value = ElementKind;

            fn expecting(&self, f: &mut sfmt::Formatter<'_>) -> sfmt::Result {
                f.write_str("a PostgreSQL range type name")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(KindVisitor)
    }
}

/// The range type name does not map to any supported element kind.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
#[error("unsupported range type '{0}'")]
pub struct UnsupportedRangeType(pub(crate) String);

impl UnsupportedRangeType {
    pub fn type_name(&self) -> &str {
        &self.0
    }
}

/// A bound's raw text could not be parsed as its element type.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
#[error("invalid {kind} bound '{text}': {reason}")]
pub struct ElementParseError {
    kind: ElementKind,
    text: String,
    reason: String,
}

impl ElementParseError {
    pub(crate) fn new<S, R>(kind: ElementKind, text: S, reason: R) -> Self
    where
        S: Into<String>,
        R: ToString,
    {
        ElementParseError {
            kind,
            text: text.into(),
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// The offending bound text, unquoted and unescaped.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Per-element-kind codec between a bound value and its literal text.
///
/// `parse_element` and `fmt_element` are exact inverses for every value the
/// element type can represent.
pub trait RangeElement: Clone + PartialEq + Sized {
    const KIND: ElementKind;

    fn parse_element(text: &str) -> Result<Self, ElementParseError>;

    fn fmt_element(&self, f: &mut sfmt::Formatter<'_>) -> sfmt::Result;
}

/// Element types whose values have a well-defined successor, enabling the
/// lower-inclusive/upper-exclusive canonical form for ranges over them.
pub trait DiscreteElement: RangeElement {
    /// The next representable value, or `None` at the top of the type.
    fn checked_succ(&self) -> Option<Self>;
}
