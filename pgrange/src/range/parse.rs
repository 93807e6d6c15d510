use std::borrow::Cow;
use std::str::FromStr;

use derive_more::Display;
use thiserror::Error;

use crate::element::{ElementParseError, RangeElement, UnsupportedRangeType};

use super::{BoundType, BoundValue, Range, RangeBound};

/// A range literal could not be parsed.
///
/// Carries the full literal and the reason; no partially constructed range
/// ever escapes a failed parse.
#[derive(Error, Debug, PartialEq, Clone)]
#[error("range literal '{literal}' {kind}")]
pub struct ParseRangeError {
    literal: String,
    kind: ParseRangeErrorKind,
}

impl ParseRangeError {
    pub(crate) fn new<S: Into<String>>(literal: S, kind: ParseRangeErrorKind) -> Self {
        ParseRangeError {
            literal: literal.into(),
            kind,
        }
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }

    pub fn kind(&self) -> &ParseRangeErrorKind {
        &self.kind
    }
}

#[derive(Display, Debug, PartialEq, Clone)]
pub enum ParseRangeErrorKind {
    #[display("{_0}")]
    Malformed(MalformedLiteral),
    #[display("has {_0}")]
    UnsupportedType(UnsupportedRangeType),
    #[display("has {_0}")]
    Element(ElementParseError),
}

impl From<MalformedLiteral> for ParseRangeErrorKind {
    fn from(value: MalformedLiteral) -> Self {
        ParseRangeErrorKind::Malformed(value)
    }
}

impl From<UnsupportedRangeType> for ParseRangeErrorKind {
    fn from(value: UnsupportedRangeType) -> Self {
        ParseRangeErrorKind::UnsupportedType(value)
    }
}

impl From<ElementParseError> for ParseRangeErrorKind {
    fn from(value: ElementParseError) -> Self {
        ParseRangeErrorKind::Element(value)
    }
}

/// Structural violations of the range literal grammar.
#[derive(Display, Debug, PartialEq, Eq, Clone, Copy)]
pub enum MalformedLiteral {
    #[display("is missing an opening bracket")]
    MissingOpenBracket,
    #[display("is missing a closing bracket")]
    MissingCloseBracket,
    #[display("is missing the bound separator")]
    MissingSeparator,
    #[display("has more than one unquoted separator")]
    ExtraSeparator,
    #[display("has an unterminated quoted bound")]
    UnterminatedQuote,
    #[display("has stray input after a quoted bound")]
    TrailingAfterQuote,
    #[display("has a dangling escape character")]
    DanglingEscape,
}

/// The structural pieces of a non-empty literal: raw bound slices, still
/// quoted and escaped, plus the inclusivity of each bracket.
pub(crate) struct RawRange<'a> {
    pub lower: &'a str,
    pub upper: &'a str,
    pub lower_type: BoundType,
    pub upper_type: BoundType,
}

pub(crate) enum RawLiteral<'a> {
    Empty,
    Bounds(RawRange<'a>),
}

/// Splits a trimmed literal into its structural pieces without interpreting
/// the bound text. The separator is the first comma that is neither quoted
/// nor escaped; a second one is an error.
pub(crate) fn scan_literal(literal: &str) -> Result<RawLiteral<'_>, MalformedLiteral> {
    let literal = literal.trim();
    if literal.eq_ignore_ascii_case("empty") {
        return Ok(RawLiteral::Empty);
    }

    let lower_type = match literal.as_bytes().first() {
        Some(b'[') => BoundType::Inclusive,
        Some(b'(') => BoundType::Exclusive,
        _ => return Err(MalformedLiteral::MissingOpenBracket),
    };
    let upper_type = match literal.as_bytes().last() {
        Some(b']') if literal.len() > 1 => BoundType::Inclusive,
        Some(b')') if literal.len() > 1 => BoundType::Exclusive,
        _ => return Err(MalformedLiteral::MissingCloseBracket),
    };

    let interior = &literal[1..literal.len() - 1];
    let bytes = interior.as_bytes();
    let mut separator = None;
    let mut in_quotes = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                if i + 1 >= bytes.len() {
                    return Err(MalformedLiteral::DanglingEscape);
                }
                i += 2;
            }
            b'"' => {
                // a doubled quote inside quotes is a literal quote
                if in_quotes && i + 1 < bytes.len() && bytes[i + 1] == b'"' {
                    i += 2;
                } else {
                    in_quotes = !in_quotes;
                    i += 1;
                }
            }
            b',' if !in_quotes => {
                if separator.is_some() {
                    return Err(MalformedLiteral::ExtraSeparator);
                }
                separator = Some(i);
                i += 1;
            }
            _ => i += 1,
        }
    }
    if in_quotes {
        return Err(MalformedLiteral::UnterminatedQuote);
    }
    let separator = separator.ok_or(MalformedLiteral::MissingSeparator)?;

    Ok(RawLiteral::Bounds(RawRange {
        lower: &interior[..separator],
        upper: &interior[separator + 1..],
        lower_type,
        upper_type,
    }))
}

fn is_infinity_token(text: &str) -> bool {
    text.eq_ignore_ascii_case("infinity")
        || text.eq_ignore_ascii_case("-infinity")
        || text.eq_ignore_ascii_case("+infinity")
}

/// Strips the surrounding quotes of a quoted token and resolves `\x` and
/// `""` escapes.
fn unquote(token: &str) -> Result<Cow<'_, str>, MalformedLiteral> {
    debug_assert!(token.starts_with('"'));
    let inner = &token[1..];
    if let Some(body) = inner.strip_suffix('"') {
        if !body.contains('\\') && !body.contains('"') {
            return Ok(Cow::Borrowed(body));
        }
    }
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    loop {
        match chars.next() {
            None => return Err(MalformedLiteral::UnterminatedQuote),
            Some('\\') => match chars.next() {
                Some(c) => out.push(c),
                None => return Err(MalformedLiteral::UnterminatedQuote),
            },
            Some('"') => match chars.next() {
                Some('"') => out.push('"'),
                None => return Ok(Cow::Owned(out)),
                Some(_) => return Err(MalformedLiteral::TrailingAfterQuote),
            },
            Some(c) => out.push(c),
        }
    }
}

/// Resolves `\x` escapes in an unquoted token.
fn unescape(token: &str) -> Result<Cow<'_, str>, MalformedLiteral> {
    if !token.contains('\\') {
        return Ok(Cow::Borrowed(token));
    }
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(escaped) => out.push(escaped),
                None => return Err(MalformedLiteral::DanglingEscape),
            }
        } else {
            out.push(c);
        }
    }
    Ok(Cow::Owned(out))
}

/// Interprets one raw bound slice: empty means unbounded, an unquoted
/// infinity token is an infinite bound, anything else goes to the element
/// codec after unquoting/unescaping.
fn parse_bound<T: RangeElement>(raw: &str) -> Result<BoundValue<T>, ParseRangeErrorKind> {
    let trimmed = raw.trim();
    let text = if trimmed.starts_with('"') {
        unquote(trimmed).map_err(ParseRangeErrorKind::Malformed)?
    } else {
        if trimmed.is_empty() {
            return Ok(BoundValue::Unbounded);
        }
        if is_infinity_token(trimmed) {
            return Ok(BoundValue::Infinite);
        }
        unescape(trimmed).map_err(ParseRangeErrorKind::Malformed)?
    };
    let value = T::parse_element(&text)?;
    Ok(BoundValue::Finite(value))
}

impl<T: RangeElement> FromStr for Range<T> {
    type Err = ParseRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = match scan_literal(s) {
            Ok(RawLiteral::Empty) => return Ok(Range::empty()),
            Ok(RawLiteral::Bounds(raw)) => raw,
            Err(err) => return Err(ParseRangeError::new(s, err.into())),
        };
        let lower = parse_bound(raw.lower).map_err(|kind| ParseRangeError::new(s, kind))?;
        let upper = parse_bound(raw.upper).map_err(|kind| ParseRangeError::new(s, kind))?;
        Ok(Range::new(
            RangeBound::new(lower, raw.lower_type),
            RangeBound::new(upper, raw.upper_type),
        ))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::element::ElementKind;

    use super::*;

    fn parse_int4(literal: &str) -> Result<Range<i32>, ParseRangeError> {
        literal.parse()
    }

    #[test]
    fn parse_half_open() {
        let range = parse_int4("[0,18)").unwrap();
        let lower = range.lower().unwrap();
        let upper = range.upper().unwrap();
        assert_eq!(lower.value, BoundValue::Finite(0));
        assert_eq!(lower.bound_type, BoundType::Inclusive);
        assert_eq!(upper.value, BoundValue::Finite(18));
        assert_eq!(upper.bound_type, BoundType::Exclusive);
    }

    #[rstest]
    #[case::plain("empty")]
    #[case::upper_case("EMPTY")]
    #[case::mixed_case("Empty")]
    #[case::surrounding_space("  empty ")]
    #[case::degenerate("[123,123)")]
    #[case::degenerate_open("(123,123]")]
    #[test]
    fn parse_empty_forms(#[case] literal: &str) {
        let range = parse_int4(literal).unwrap();
        assert!(range.is_empty());
        assert_eq!(range, Range::empty());
    }

    #[rstest]
    #[case::lower_unbounded("(,18)")]
    #[case::upper_unbounded("[0,)")]
    #[case::both_unbounded("(,)")]
    #[test]
    fn parse_unbounded(#[case] literal: &str) {
        let range = parse_int4(literal).unwrap();
        assert!(!range.is_empty());
    }

    #[test]
    fn parse_infinity_tokens() {
        let range = parse_int4("[123,infinity)").unwrap();
        assert_eq!(range.upper().unwrap().value, BoundValue::Infinite);

        let range = parse_int4("[-infinity,123)").unwrap();
        assert_eq!(range.lower().unwrap().value, BoundValue::Infinite);

        let range = parse_int4("[-INFINITY,+Infinity]").unwrap();
        assert_eq!(range.lower().unwrap().value, BoundValue::Infinite);
        assert_eq!(range.upper().unwrap().value, BoundValue::Infinite);
    }

    #[test]
    fn parse_trims_unquoted_whitespace() {
        let range = parse_int4("[ 1 , 2 )").unwrap();
        assert_eq!(range.lower().unwrap().value, BoundValue::Finite(1));
        assert_eq!(range.upper().unwrap().value, BoundValue::Finite(2));

        let range = parse_int4("[ , 2 )").unwrap();
        assert_eq!(range.lower().unwrap().value, BoundValue::Unbounded);
    }

    #[test]
    fn parse_quoted_bounds() {
        let range = parse_int4("[\"1\",\"2\")").unwrap();
        assert_eq!(range.lower().unwrap().value, BoundValue::Finite(1));
        assert_eq!(range.upper().unwrap().value, BoundValue::Finite(2));
    }

    #[rstest]
    #[case::missing_close("[1,2", MalformedLiteral::MissingCloseBracket)]
    #[case::missing_open("1,2)", MalformedLiteral::MissingOpenBracket)]
    #[case::extra_separator("[1,2,3)", MalformedLiteral::ExtraSeparator)]
    #[case::no_separator("[12)", MalformedLiteral::MissingSeparator)]
    #[case::empty_input("", MalformedLiteral::MissingOpenBracket)]
    #[case::bracket_only("[", MalformedLiteral::MissingCloseBracket)]
    #[case::unterminated_quote("[\"1,2)", MalformedLiteral::UnterminatedQuote)]
    #[case::stray_after_quote("[\"1\"x,2)", MalformedLiteral::TrailingAfterQuote)]
    #[case::dangling_escape("[1,2\\", MalformedLiteral::MissingCloseBracket)]
    #[case::escape_before_close("[1,\\)", MalformedLiteral::DanglingEscape)]
    #[test]
    fn parse_malformed(#[case] literal: &str, #[case] expected: MalformedLiteral) {
        let err = parse_int4(literal).expect_err("parse failure");
        assert_eq!(err.literal(), literal);
        assert_eq!(err.kind(), &ParseRangeErrorKind::Malformed(expected));
    }

    #[test]
    fn parse_element_failure_carries_kind_and_text() {
        let err = parse_int4("[zero,18)").expect_err("parse failure");
        match err.kind() {
            ParseRangeErrorKind::Element(element) => {
                assert_eq!(element.kind(), ElementKind::Int4);
                assert_eq!(element.text(), "zero");
            }
            other => panic!("unexpected error kind: {other:?}"),
        }
    }

    #[test]
    fn quoted_infinity_goes_to_the_codec() {
        let err = parse_int4("[\"infinity\",18)").expect_err("parse failure");
        assert!(matches!(err.kind(), ParseRangeErrorKind::Element(_)));
    }

    #[rstest]
    #[case::quoted_comma("\"a,b\"", "a,b")]
    #[case::escaped_quote("\"a\\\"b\"", "a\"b")]
    #[case::doubled_quote("\"a\"\"b\"", "a\"b")]
    #[case::escaped_backslash("\"a\\\\b\"", "a\\b")]
    #[case::empty_token("\"\"", "")]
    #[test]
    fn unquote_tokens(#[case] token: &str, #[case] expected: &str) {
        assert_eq!(unquote(token).unwrap(), expected);
    }

    #[test]
    fn scan_splits_on_first_unquoted_comma() {
        let raw = match scan_literal("[\"a,b\",c)").unwrap() {
            RawLiteral::Bounds(raw) => raw,
            RawLiteral::Empty => panic!("unexpected empty literal"),
        };
        assert_eq!(raw.lower, "\"a,b\"");
        assert_eq!(raw.upper, "c");
        assert_eq!(raw.lower_type, BoundType::Inclusive);
        assert_eq!(raw.upper_type, BoundType::Exclusive);
    }

    #[test]
    fn scan_honors_escaped_comma() {
        let raw = match scan_literal("(a\\,b,c]").unwrap() {
            RawLiteral::Bounds(raw) => raw,
            RawLiteral::Empty => panic!("unexpected empty literal"),
        };
        assert_eq!(raw.lower, "a\\,b");
        assert_eq!(raw.upper, "c");
    }
}
