//! Memo filter expressions: model, URL codec and evaluation
//!
//! A filter bar is an ordered [`FilterSet`] of [`FilterEntry`] values. Each
//! entry constrains one factor of a memo and says how it joins the result
//! of everything before it.
//!
//! # Encoding
//!
//! ```text
//! FACTOR:operator:RELATION:value[,FACTOR:operator:RELATION:value...]
//! ```
//!
//! Operator and value are percent-escaped (every byte outside
//! `A-Z a-z 0-9 - _ . ~`), so any value round-trips exactly.
//!
//! # Factors
//!
//! - `TAG` - `CONTAIN` / `NOT_CONTAIN` a tag name
//! - `TYPE` - `IS` / `IS_NOT` one of `NOT_TAGGED`, `LINKED`, `IMAGED`, `CONNECTED`
//! - `TEXT` - `CONTAIN` / `NOT_CONTAIN` a case-sensitive substring
//! - `DISPLAY_TIME` - `BEFORE` / `AFTER` an ISO date, compared per day
//! - `VISIBILITY` - `IS` / `IS_NOT` one of `PUBLIC`, `PROTECTED`, `PRIVATE`
//!
//! # Examples
//!
//! ```text
//! TAG:CONTAIN:AND:work                              # Memos tagged "work"
//! TAG:CONTAIN:AND:work,TEXT:CONTAIN:OR:urgent       # Tagged "work", or mentioning "urgent"
//! DISPLAY_TIME:AFTER:AND:2024-03-01                 # Displayed after March 1st
//! TEXT:CONTAIN:AND:a%3Db%26c                        # Containing "a=b&c"
//! ```
//!
//! Entries combine strictly left to right: `a AND b OR c` is `(a AND b) OR c`.

pub mod codec;
pub mod combinator;
pub mod error;
pub mod expression;
pub mod model;
pub mod saved;
pub mod set;

pub use codec::{decode, encode, from_query, to_query_param};
pub use combinator::{FilterPass, FilterRecord, RecordFailure, evaluate, filter_records, matches, predicate};
pub use error::{DecodeError, EvaluationError, ExpressionError, ValidationError};
pub use expression::{ExpressionOptions, compile_expression};
pub use model::{
    ContainOperator, EqualityOperator, FactorType, Filter, FilterEntry, MemoType, Relation,
    TimeOperator, Visibility, parse_filter_date, validate,
};
pub use saved::{SavedQueryError, parse_saved_query, to_saved_query};
pub use set::FilterSet;
