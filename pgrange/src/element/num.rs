use std::fmt as sfmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use super::{DiscreteElement, ElementKind, ElementParseError, RangeElement};

impl RangeElement for i32 {
    const KIND: ElementKind = ElementKind::Int4;

    fn parse_element(text: &str) -> Result<Self, ElementParseError> {
        text.parse()
            .map_err(|err| ElementParseError::new(Self::KIND, text, err))
    }

    fn fmt_element(&self, f: &mut sfmt::Formatter<'_>) -> sfmt::Result {
        write!(f, "{}", self)
    }
}

impl DiscreteElement for i32 {
    fn checked_succ(&self) -> Option<Self> {
        self.checked_add(1)
    }
}

impl RangeElement for i64 {
    const KIND: ElementKind = ElementKind::Int8;

    fn parse_element(text: &str) -> Result<Self, ElementParseError> {
        text.parse()
            .map_err(|err| ElementParseError::new(Self::KIND, text, err))
    }

    fn fmt_element(&self, f: &mut sfmt::Formatter<'_>) -> sfmt::Result {
        write!(f, "{}", self)
    }
}

impl DiscreteElement for i64 {
    fn checked_succ(&self) -> Option<Self> {
        self.checked_add(1)
    }
}

impl RangeElement for Decimal {
    const KIND: ElementKind = ElementKind::Numeric;

    /// Plain decimal notation only. `Decimal::from_str` rejects exponent
    /// forms and overflowing precision, and keeps the scale as supplied, so
    /// `0.50` survives a round trip unchanged.
    fn parse_element(text: &str) -> Result<Self, ElementParseError> {
        Decimal::from_str(text).map_err(|err| ElementParseError::new(Self::KIND, text, err))
    }

    fn fmt_element(&self, f: &mut sfmt::Formatter<'_>) -> sfmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod test {
    use std::fmt as sfmt;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    struct DisplayElement<T>(T);

    impl<T: RangeElement> sfmt::Display for DisplayElement<T> {
        fn fmt(&self, f: &mut sfmt::Formatter<'_>) -> sfmt::Result {
            self.0.fmt_element(f)
        }
    }

    #[rstest]
    #[case::zero("0", 0)]
    #[case::negative("-42", -42)]
    #[case::max("2147483647", i32::MAX)]
    #[case::min("-2147483648", i32::MIN)]
    #[test]
    fn parse_int4(#[case] text: &str, #[case] expected: i32) {
        assert_eq!(i32::parse_element(text).unwrap(), expected);
        assert_eq!(DisplayElement(expected).to_string(), text);
    }

    #[rstest]
    #[case::overflow("2147483648")]
    #[case::underflow("-2147483649")]
    #[case::not_a_number("five")]
    #[case::trailing_junk("5x")]
    #[case::empty("")]
    #[test]
    fn parse_int4_error(#[case] text: &str) {
        let err = i32::parse_element(text).expect_err("parse failure");
        assert_eq!(err.kind(), ElementKind::Int4);
        assert_eq!(err.text(), text);
    }

    #[test]
    fn parse_int8_beyond_int4() {
        assert_eq!(
            i64::parse_element("9223372036854775807").unwrap(),
            i64::MAX
        );
        i64::parse_element("9223372036854775808").expect_err("parse failure");
    }

    #[rstest]
    #[case::integral("5")]
    #[case::fraction("0.5")]
    #[case::trailing_zero_scale("0.50")]
    #[case::negative("-0.89")]
    #[case::high_precision("123456789.123456789")]
    #[test]
    fn numeric_round_trip(#[case] text: &str) {
        let value = Decimal::parse_element(text).unwrap();
        assert_eq!(DisplayElement(value).to_string(), text);
    }

    #[rstest]
    #[case::exponent("1e5")]
    #[case::word("NaN")]
    #[case::empty("")]
    #[test]
    fn numeric_error(#[case] text: &str) {
        let err = Decimal::parse_element(text).expect_err("parse failure");
        assert_eq!(err.kind(), ElementKind::Numeric);
    }
}
