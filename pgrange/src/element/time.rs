use std::fmt as sfmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike};

use super::{ElementKind, ElementParseError, RangeElement};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const TIMESTAMPTZ_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%#z";

/// Emits the fractional seconds the way PostgreSQL does: microsecond
/// precision, trailing zeros trimmed, nothing at all when zero.
fn fmt_fraction(nanos: u32, f: &mut sfmt::Formatter<'_>) -> sfmt::Result {
    let mut micros = (nanos / 1_000) % 1_000_000;
    if micros == 0 {
        return Ok(());
    }
    let mut width = 6;
    while micros % 10 == 0 {
        micros /= 10;
        width -= 1;
    }
    write!(f, ".{:0width$}", micros, width = width)
}

impl RangeElement for NaiveDate {
    const KIND: ElementKind = ElementKind::Date;

    fn parse_element(text: &str) -> Result<Self, ElementParseError> {
        NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map_err(|err| ElementParseError::new(Self::KIND, text, err))
    }

    fn fmt_element(&self, f: &mut sfmt::Formatter<'_>) -> sfmt::Result {
        write!(f, "{}", self.format(DATE_FORMAT))
    }
}

impl RangeElement for NaiveDateTime {
    const KIND: ElementKind = ElementKind::Timestamp;

    fn parse_element(text: &str) -> Result<Self, ElementParseError> {
        NaiveDateTime::parse_from_str(text, TIMESTAMP_PARSE_FORMAT)
            .map_err(|err| ElementParseError::new(Self::KIND, text, err))
    }

    fn fmt_element(&self, f: &mut sfmt::Formatter<'_>) -> sfmt::Result {
        write!(f, "{}", self.format("%Y-%m-%d %H:%M:%S"))?;
        fmt_fraction(self.nanosecond(), f)
    }
}

impl RangeElement for DateTime<FixedOffset> {
    const KIND: ElementKind = ElementKind::Timestamptz;

    /// The offset is taken verbatim from the text and survives formatting;
    /// equality, ordering and hashing go by the absolute instant.
    fn parse_element(text: &str) -> Result<Self, ElementParseError> {
        DateTime::parse_from_str(text, TIMESTAMPTZ_PARSE_FORMAT)
            .map_err(|err| ElementParseError::new(Self::KIND, text, err))
    }

    fn fmt_element(&self, f: &mut sfmt::Formatter<'_>) -> sfmt::Result {
        write!(f, "{}", self.format("%Y-%m-%d %H:%M:%S"))?;
        fmt_fraction(self.nanosecond(), f)?;
        let offset = self.offset().local_minus_utc();
        let (sign, offset) = if offset < 0 {
            ('-', -offset)
        } else {
            ('+', offset)
        };
        write!(f, "{}{:02}:{:02}", sign, offset / 3600, (offset % 3600) / 60)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn display<T: RangeElement>(value: &T) -> String {
        struct DisplayElement<'a, T>(&'a T);

        impl<T: RangeElement> sfmt::Display for DisplayElement<'_, T> {
            fn fmt(&self, f: &mut sfmt::Formatter<'_>) -> sfmt::Result {
                self.0.fmt_element(f)
            }
        }

        DisplayElement(value).to_string()
    }

    #[rstest]
    #[case::plain("2021-06-01")]
    #[case::padded("0001-01-01")]
    #[case::leap_day("2020-02-29")]
    #[test]
    fn date_round_trip(#[case] text: &str) {
        let date = NaiveDate::parse_element(text).unwrap();
        assert_eq!(display(&date), text);
    }

    #[rstest]
    #[case::with_time("2021-06-01 10:00:00")]
    #[case::with_zone("2021-06-01+02:00")]
    #[case::not_a_date("yesterday")]
    #[case::bad_day("2021-02-30")]
    #[test]
    fn date_error(#[case] text: &str) {
        let err = NaiveDate::parse_element(text).expect_err("parse failure");
        assert_eq!(err.kind(), ElementKind::Date);
        assert_eq!(err.text(), text);
    }

    #[rstest]
    #[case::whole_seconds("2021-06-01 10:15:30")]
    #[case::millis("2021-06-01 10:15:30.123")]
    #[case::micros("2021-06-01 10:15:30.123456")]
    #[case::sub_milli("2021-06-01 10:15:30.000001")]
    #[test]
    fn timestamp_round_trip(#[case] text: &str) {
        let ts = NaiveDateTime::parse_element(text).unwrap();
        assert_eq!(display(&ts), text);
    }

    #[test]
    fn timestamp_fraction_is_trimmed() {
        let ts = NaiveDateTime::parse_element("2021-06-01 10:15:30.120000").unwrap();
        assert_eq!(display(&ts), "2021-06-01 10:15:30.12");
    }

    #[rstest]
    #[case::date_only("2021-06-01")]
    #[case::t_separator("2021-06-01T10:15:30")]
    #[case::bad_minutes("2021-06-01 10:75:30")]
    #[test]
    fn timestamp_error(#[case] text: &str) {
        let err = NaiveDateTime::parse_element(text).expect_err("parse failure");
        assert_eq!(err.kind(), ElementKind::Timestamp);
    }

    #[rstest]
    #[case::utc("2021-06-01 10:15:30+00:00")]
    #[case::positive("2021-06-01 10:15:30+05:30")]
    #[case::negative("2021-06-01 10:15:30-08:00")]
    #[case::fraction("2021-06-01 10:15:30.5+01:00")]
    #[test]
    fn timestamptz_round_trip(#[case] text: &str) {
        let ts = <DateTime<FixedOffset>>::parse_element(text).unwrap();
        assert_eq!(display(&ts), text);
    }

    #[test]
    fn timestamptz_short_offset_widens() {
        let ts = <DateTime<FixedOffset>>::parse_element("2021-06-01 10:15:30+05").unwrap();
        assert_eq!(display(&ts), "2021-06-01 10:15:30+05:00");
    }

    #[test]
    fn timestamptz_equality_is_by_instant() {
        let utc = <DateTime<FixedOffset>>::parse_element("2021-06-01 10:00:00+00:00").unwrap();
        let ist = <DateTime<FixedOffset>>::parse_element("2021-06-01 15:30:00+05:30").unwrap();
        assert_eq!(utc, ist);
        assert_ne!(display(&utc), display(&ist));
    }

    #[rstest]
    #[case::missing_offset("2021-06-01 10:15:30")]
    #[case::named_zone("2021-06-01 10:15:30 UTC")]
    #[test]
    fn timestamptz_error(#[case] text: &str) {
        let err = <DateTime<FixedOffset>>::parse_element(text).expect_err("parse failure");
        assert_eq!(err.kind(), ElementKind::Timestamptz);
    }
}
