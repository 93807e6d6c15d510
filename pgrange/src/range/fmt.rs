use std::fmt as sfmt;
use std::fmt::Write;

use crate::element::RangeElement;

use super::{BoundType, BoundValue, Inner, Range};

enum Side {
    Lower,
    Upper,
}

struct DisplayElement<'a, T>(&'a T);

impl<T: RangeElement> sfmt::Display for DisplayElement<'_, T> {
    fn fmt(&self, f: &mut sfmt::Formatter<'_>) -> sfmt::Result {
        self.0.fmt_element(f)
    }
}

/// PostgreSQL quotes an element rendering that is empty or contains a
/// delimiter, quote, backslash or whitespace. Quoting anything less would
/// still re-parse but would not be byte-identical with the server's output.
fn needs_quotes(text: &str) -> bool {
    text.is_empty()
        || text.chars().any(|c| {
            matches!(c, ',' | '"' | '\\' | '[' | ']' | '(' | ')') || c.is_whitespace()
        })
}

fn write_quoted(f: &mut sfmt::Formatter<'_>, text: &str) -> sfmt::Result {
    f.write_char('"')?;
    for c in text.chars() {
        if c == '"' || c == '\\' {
            f.write_char('\\')?;
        }
        f.write_char(c)?;
    }
    f.write_char('"')
}

fn fmt_bound<T: RangeElement>(
    f: &mut sfmt::Formatter<'_>,
    value: &BoundValue<T>,
    side: Side,
) -> sfmt::Result {
    match value {
        BoundValue::Unbounded => Ok(()),
        BoundValue::Infinite => f.write_str(match side {
            Side::Lower => "-infinity",
            Side::Upper => "infinity",
        }),
        BoundValue::Finite(element) => {
            let text = DisplayElement(element).to_string();
            if needs_quotes(&text) {
                write_quoted(f, &text)
            } else {
                f.write_str(&text)
            }
        }
    }
}

/// Renders the canonical wire literal. Total for any well-formed range; the
/// inclusivity brackets come out exactly as stored.
impl<T: RangeElement> sfmt::Display for Range<T> {
    fn fmt(&self, f: &mut sfmt::Formatter<'_>) -> sfmt::Result {
        let (lower, upper) = match &self.inner {
            Inner::Empty => return f.write_str("empty"),
            Inner::Bounds(lower, upper) => (lower, upper),
        };
        f.write_char(match lower.bound_type {
            BoundType::Inclusive => '[',
            BoundType::Exclusive => '(',
        })?;
        fmt_bound(f, &lower.value, Side::Lower)?;
        f.write_char(',')?;
        fmt_bound(f, &upper.value, Side::Upper)?;
        f.write_char(match upper.bound_type {
            BoundType::Inclusive => ']',
            BoundType::Exclusive => ')',
        })
    }
}
