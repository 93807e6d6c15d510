// SPDX-FileCopyrightText: 2025 pgrange developers
//
// SPDX-License-Identifier: MIT

//! Parsing, representation and formatting of PostgreSQL range literals.

pub mod element;
pub mod range;

pub use element::{
    DiscreteElement, ElementKind, ElementParseError, RangeElement, UnsupportedRangeType,
};
pub use range::{
    AnyRange, BoundType, BoundValue, MalformedLiteral, ParseRangeError, ParseRangeErrorKind,
    Range, RangeBound,
};
