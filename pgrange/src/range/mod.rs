use std::cmp::Ordering;
use std::fmt as sfmt;
use std::marker::PhantomData;

use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::element::{DiscreteElement, ElementKind, RangeElement};

mod any;
mod fmt;
mod parse;

pub use any::AnyRange;
pub use parse::{MalformedLiteral, ParseRangeError, ParseRangeErrorKind};

/// Whether an endpoint belongs to the range (`[`/`]`) or is excluded from it
/// (`(`/`)`).
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub enum BoundType {
    Inclusive,
    Exclusive,
}

/// One endpoint of a range.
///
/// `Unbounded` is an omitted endpoint (nothing between the bracket and the
/// separator); `Infinite` is the explicit `infinity`/`-infinity` token. The
/// two impose the same (absent) constraint but render differently, so both
/// are kept apart for literal fidelity.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum BoundValue<T> {
    Unbounded,
    Infinite,
    Finite(T),
}

impl<T> BoundValue<T> {
    pub fn is_finite(&self) -> bool {
        matches!(self, BoundValue::Finite(_))
    }

    pub fn as_finite(&self) -> Option<&T> {
        match self {
            BoundValue::Finite(value) => Some(value),
            _ => None,
        }
    }
}

/// An endpoint value together with its inclusivity.
///
/// The inclusivity carries no meaning for `Unbounded` and `Infinite`
/// endpoints but is retained verbatim so a literal reformats exactly as it
/// was written.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct RangeBound<T> {
    pub value: BoundValue<T>,
    pub bound_type: BoundType,
}

impl<T> RangeBound<T> {
    pub fn new(value: BoundValue<T>, bound_type: BoundType) -> Self {
        RangeBound { value, bound_type }
    }

    /// A finite endpoint that belongs to the range.
    pub fn inclusive(value: T) -> Self {
        RangeBound::new(BoundValue::Finite(value), BoundType::Inclusive)
    }

    /// A finite endpoint excluded from the range.
    pub fn exclusive(value: T) -> Self {
        RangeBound::new(BoundValue::Finite(value), BoundType::Exclusive)
    }

    /// An omitted endpoint, rendered as the empty token.
    pub fn unbounded() -> Self {
        RangeBound::new(BoundValue::Unbounded, BoundType::Exclusive)
    }

    /// An explicit `infinity`/`-infinity` endpoint.
    pub fn infinite() -> Self {
        RangeBound::new(BoundValue::Infinite, BoundType::Exclusive)
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Hash)]
enum Inner<T> {
    Empty,
    Bounds(RangeBound<T>, RangeBound<T>),
}

/// A PostgreSQL range value over element type `T`.
///
/// Immutable once constructed. Parse one from its literal form with
/// [`FromStr`], format it back with [`Display`]; the two are exact inverses.
///
/// ```
/// # use pgrange::Range;
/// let range = "[0,18)".parse::<Range<i32>>().unwrap();
/// assert!(range.contains(&17));
/// assert!(!range.contains(&18));
/// assert_eq!("[0,18)", range.to_string());
/// ```
///
/// [`FromStr`]: std::str::FromStr
/// [`Display`]: std::fmt::Display
#[derive(PartialEq, Eq, Clone, Copy, Hash)]
pub struct Range<T> {
    inner: Inner<T>,
}

impl<T> Range<T> {
    /// The canonical empty range.
    pub fn empty() -> Self {
        Range {
            inner: Inner::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.inner, Inner::Empty)
    }

    /// The lower bound, or `None` for the empty range.
    pub fn lower(&self) -> Option<&RangeBound<T>> {
        match &self.inner {
            Inner::Empty => None,
            Inner::Bounds(lower, _) => Some(lower),
        }
    }

    /// The upper bound, or `None` for the empty range.
    pub fn upper(&self) -> Option<&RangeBound<T>> {
        match &self.inner {
            Inner::Empty => None,
            Inner::Bounds(_, upper) => Some(upper),
        }
    }
}

impl<T: PartialEq> Range<T> {
    /// Builds a range from two endpoints.
    ///
    /// A range whose finite endpoints are equal and not both inclusive
    /// denotes the empty set and collapses to the canonical empty range, the
    /// same way PostgreSQL reduces `[123,123)` to `empty`. A reversed range
    /// such as `[5,3)` is kept as written.
    pub fn new(lower: RangeBound<T>, upper: RangeBound<T>) -> Self {
        if let (BoundValue::Finite(low), BoundValue::Finite(high)) = (&lower.value, &upper.value) {
            let both_inclusive = lower.bound_type == BoundType::Inclusive
                && upper.bound_type == BoundType::Inclusive;
            if low == high && !both_inclusive {
                return Range::empty();
            }
        }
        Range {
            inner: Inner::Bounds(lower, upper),
        }
    }
}

impl<T: RangeElement> Range<T> {
    /// The element kind governing this range's endpoints.
    pub fn kind(&self) -> ElementKind {
        T::KIND
    }
}

impl<T: PartialOrd> Range<T> {
    /// Whether `value` lies within the range.
    pub fn contains(&self, value: &T) -> bool {
        let (lower, upper) = match &self.inner {
            Inner::Empty => return false,
            Inner::Bounds(lower, upper) => (lower, upper),
        };
        let above_lower = match (&lower.value, lower.bound_type) {
            (BoundValue::Finite(low), BoundType::Inclusive) => value >= low,
            (BoundValue::Finite(low), BoundType::Exclusive) => value > low,
            _ => true,
        };
        let below_upper = match (&upper.value, upper.bound_type) {
            (BoundValue::Finite(high), BoundType::Inclusive) => value <= high,
            (BoundValue::Finite(high), BoundType::Exclusive) => value < high,
            _ => true,
        };
        above_lower && below_upper
    }
}

impl<T: DiscreteElement> Range<T> {
    /// Rewrites the range into the lower-inclusive/upper-exclusive
    /// convention by stepping finite endpoint values, without changing the
    /// set of contained values.
    ///
    /// Never invoked implicitly: parsing and formatting leave inclusivity
    /// exactly as written, so this is the one deliberate way to change it.
    /// An endpoint whose successor does not exist (the top of the element
    /// type) is left untouched.
    ///
    /// ```
    /// # use pgrange::Range;
    /// let range = "[1,3]".parse::<Range<i32>>().unwrap();
    /// assert_eq!("[1,4)", range.canonicalize().to_string());
    /// ```
    pub fn canonicalize(&self) -> Range<T> {
        let (lower, upper) = match &self.inner {
            Inner::Empty => return Range::empty(),
            Inner::Bounds(lower, upper) => (lower, upper),
        };
        let lower = match (&lower.value, lower.bound_type) {
            (BoundValue::Finite(low), BoundType::Exclusive) => match low.checked_succ() {
                Some(next) => RangeBound::inclusive(next),
                None => lower.clone(),
            },
            _ => lower.clone(),
        };
        let upper = match (&upper.value, upper.bound_type) {
            (BoundValue::Finite(high), BoundType::Inclusive) => match high.checked_succ() {
                Some(next) => RangeBound::exclusive(next),
                None => upper.clone(),
            },
            _ => upper.clone(),
        };
        Range::new(lower, upper)
    }
}

/// Ranks a lower bound: absent constraints sort below every finite value,
/// and at equal finite values an inclusive start comes first.
fn cmp_lower<T: Ord>(a: &RangeBound<T>, b: &RangeBound<T>) -> Ordering {
    fn rank<T>(value: &BoundValue<T>) -> u8 {
        match value {
            BoundValue::Unbounded => 0,
            BoundValue::Infinite => 1,
            BoundValue::Finite(_) => 2,
        }
    }
    match (&a.value, &b.value) {
        (BoundValue::Finite(x), BoundValue::Finite(y)) => x
            .cmp(y)
            .then_with(|| a.bound_type.cmp(&b.bound_type)),
        (x, y) => rank(x)
            .cmp(&rank(y))
            .then_with(|| a.bound_type.cmp(&b.bound_type)),
    }
}

/// Ranks an upper bound: absent constraints sort above every finite value,
/// and at equal finite values an exclusive end comes first.
fn cmp_upper<T: Ord>(a: &RangeBound<T>, b: &RangeBound<T>) -> Ordering {
    fn rank<T>(value: &BoundValue<T>) -> u8 {
        match value {
            BoundValue::Finite(_) => 0,
            BoundValue::Infinite => 1,
            BoundValue::Unbounded => 2,
        }
    }
    match (&a.value, &b.value) {
        (BoundValue::Finite(x), BoundValue::Finite(y)) => x
            .cmp(y)
            .then_with(|| b.bound_type.cmp(&a.bound_type)),
        (x, y) => rank(x)
            .cmp(&rank(y))
            .then_with(|| a.bound_type.cmp(&b.bound_type)),
    }
}

impl<T: Ord> PartialOrd for Range<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A total order for tests and debugging: empty first, then by lower bound,
/// then by upper bound.
impl<T: Ord> Ord for Range<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.inner, &other.inner) {
            (Inner::Empty, Inner::Empty) => Ordering::Equal,
            (Inner::Empty, _) => Ordering::Less,
            (_, Inner::Empty) => Ordering::Greater,
            (Inner::Bounds(al, au), Inner::Bounds(bl, bu)) => {
                cmp_lower(al, bl).then_with(|| cmp_upper(au, bu))
            }
        }
    }
}

impl<T: RangeElement> sfmt::Debug for Range<T> {
    fn fmt(&self, f: &mut sfmt::Formatter<'_>) -> sfmt::Result {
        f.debug_tuple("Range")
            .field(&format_args!("{}", self))
            .finish()
    }
}

impl<T: RangeElement> Serialize for Range<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, T: RangeElement> Deserialize<'de> for Range<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RangeVisitor<T>(PhantomData<T>);

        impl<T: RangeElement> de::Visitor<'_> for RangeVisitor<T> {
            type Value = Range<T>;

            fn expecting(&self, f: &mut sfmt::Formatter<'_>) -> sfmt::Result {
                f.write_str("a PostgreSQL range literal")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(RangeVisitor(PhantomData))
    }
}

#[cfg(any(test, feature = "test"))]
pub mod proptest {
    use ::proptest::prelude::*;
    use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
    use rust_decimal::Decimal;

    use super::*;

    pub fn arb_bound_type() -> impl Strategy<Value = BoundType> {
        prop_oneof![Just(BoundType::Inclusive), Just(BoundType::Exclusive)]
    }

    pub fn arb_bound<T>(
        element: impl Strategy<Value = T>,
    ) -> impl Strategy<Value = RangeBound<T>>
    where
        T: Clone + std::fmt::Debug,
    {
        let value = prop_oneof![
            1 => Just(BoundValue::Unbounded),
            1 => Just(BoundValue::Infinite),
            4 => element.prop_map(BoundValue::Finite),
        ];
        (value, arb_bound_type()).prop_map(|(value, bound_type)| RangeBound::new(value, bound_type))
    }

    pub fn arb_range<T>(element: impl Strategy<Value = T> + Clone) -> impl Strategy<Value = Range<T>>
    where
        T: RangeElement + std::fmt::Debug,
    {
        prop_oneof![
            1 => Just(Range::empty()),
            8 => (arb_bound(element.clone()), arb_bound(element))
                .prop_map(|(lower, upper)| Range::new(lower, upper)),
        ]
    }

    pub fn arb_decimal() -> impl Strategy<Value = Decimal> + Clone {
        (any::<i64>(), 0u32..=9).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
    }

    pub fn arb_date() -> impl Strategy<Value = NaiveDate> + Clone {
        (1i32..=9999, 1u32..=365)
            .prop_map(|(year, ordinal)| NaiveDate::from_yo_opt(year, ordinal).unwrap())
    }

    pub fn arb_timestamp() -> impl Strategy<Value = NaiveDateTime> + Clone {
        (arb_date(), 0u32..86_400, 0u32..1_000_000).prop_map(|(date, seconds, micros)| {
            date.and_hms_micro_opt(seconds / 3600, seconds % 3600 / 60, seconds % 60, micros)
                .unwrap()
        })
    }

    pub fn arb_timestamptz() -> impl Strategy<Value = DateTime<FixedOffset>> + Clone {
        (arb_timestamp(), -14 * 60i32..=14 * 60).prop_map(|(naive, offset_minutes)| {
            FixedOffset::east_opt(offset_minutes * 60)
                .unwrap()
                .from_local_datetime(&naive)
                .unwrap()
        })
    }

    impl Arbitrary for Range<i32> {
        type Parameters = ();
        type Strategy = BoxedStrategy<Range<i32>>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            arb_range(any::<i32>()).boxed()
        }
    }

    impl Arbitrary for Range<i64> {
        type Parameters = ();
        type Strategy = BoxedStrategy<Range<i64>>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            arb_range(any::<i64>()).boxed()
        }
    }

    impl Arbitrary for Range<Decimal> {
        type Parameters = ();
        type Strategy = BoxedStrategy<Range<Decimal>>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            arb_range(arb_decimal()).boxed()
        }
    }

    impl Arbitrary for Range<NaiveDate> {
        type Parameters = ();
        type Strategy = BoxedStrategy<Range<NaiveDate>>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            arb_range(arb_date()).boxed()
        }
    }

    impl Arbitrary for Range<NaiveDateTime> {
        type Parameters = ();
        type Strategy = BoxedStrategy<Range<NaiveDateTime>>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            arb_range(arb_timestamp()).boxed()
        }
    }

    impl Arbitrary for Range<DateTime<FixedOffset>> {
        type Parameters = ();
        type Strategy = BoxedStrategy<Range<DateTime<FixedOffset>>>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            arb_range(arb_timestamptz()).boxed()
        }
    }
}
