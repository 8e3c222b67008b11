use super::error::{DecodeError, ValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The dimension of a memo a filter entry constrains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FactorType {
    /// Filter by tag name
    Tag,
    /// Filter by memo type (e.g., "LINKED", "NOT_TAGGED")
    Type,
    /// Filter by text in the memo content
    Text,
    /// Filter by the day the memo is displayed under
    DisplayTime,
    /// Filter by visibility level
    Visibility,
}

impl FactorType {
    pub const ALL: [FactorType; 5] = [
        FactorType::Tag,
        FactorType::Type,
        FactorType::Text,
        FactorType::DisplayTime,
        FactorType::Visibility,
    ];

    /// Get the canonical token of this factor type
    pub fn canonical_name(&self) -> &'static str {
        match self {
            FactorType::Tag => "TAG",
            FactorType::Type => "TYPE",
            FactorType::Text => "TEXT",
            FactorType::DisplayTime => "DISPLAY_TIME",
            FactorType::Visibility => "VISIBILITY",
        }
    }

    /// Operators accepted for this factor type, first one being the default
    pub fn operators(&self) -> &'static [&'static str] {
        match self {
            FactorType::Tag | FactorType::Text => &["CONTAIN", "NOT_CONTAIN"],
            FactorType::Type | FactorType::Visibility => &["IS", "IS_NOT"],
            FactorType::DisplayTime => &["BEFORE", "AFTER"],
        }
    }
}

impl fmt::Display for FactorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

impl FromStr for FactorType {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Canonical tokens plus the factor names used by the memo filter store
        match s {
            "TAG" | "tag" | "tagSearch" => Ok(FactorType::Tag),
            "TYPE" | "type" => Ok(FactorType::Type),
            "TEXT" | "text" | "contentSearch" => Ok(FactorType::Text),
            "DISPLAY_TIME" | "display_time" | "displayTime" => Ok(FactorType::DisplayTime),
            "VISIBILITY" | "visibility" => Ok(FactorType::Visibility),
            _ => Err(DecodeError::UnknownFactorType(s.to_string())),
        }
    }
}

/// How an entry combines with everything evaluated before it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Relation {
    #[default]
    And,
    Or,
}

impl Relation {
    pub fn token(&self) -> &'static str {
        match self {
            Relation::And => "AND",
            Relation::Or => "OR",
        }
    }

    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "AND" => Some(Relation::And),
            "OR" => Some(Relation::Or),
            _ => None,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A single filter condition as it travels through URLs and saved queries
///
/// The operator is kept as the raw token so that entries decoded from an
/// untrusted string can be represented before they are validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterEntry {
    pub factor: FactorType,
    pub operator: String,
    pub value: String,
    #[serde(default)]
    pub relation: Relation,
}

impl FilterEntry {
    /// Create an entry joined with `AND`
    pub fn new(factor: FactorType, operator: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            factor,
            operator: operator.into(),
            value: value.into(),
            relation: Relation::And,
        }
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relation = relation;
        self
    }

    /// Key used to detect duplicate entries in a filter set
    pub fn key(&self) -> String {
        format!("{}:{}:{}", self.factor, self.operator, self.value)
    }

    /// Convert into the typed view, checking operator and value
    pub fn to_filter(&self) -> Result<Filter, ValidationError> {
        let factor = self.factor;
        match factor {
            FactorType::Tag => Ok(Filter::Tag {
                op: ContainOperator::parse(factor, &self.operator)?,
                tag: non_empty(factor, &self.value)?,
            }),
            FactorType::Type => Ok(Filter::Type {
                op: EqualityOperator::parse(factor, &self.operator)?,
                memo_type: MemoType::from_token(&self.value)
                    .ok_or_else(|| unrecognized(factor, &self.value, MemoType::TOKENS))?,
            }),
            FactorType::Text => Ok(Filter::Text {
                op: ContainOperator::parse(factor, &self.operator)?,
                text: non_empty(factor, &self.value)?,
            }),
            FactorType::DisplayTime => Ok(Filter::DisplayTime {
                op: TimeOperator::parse(factor, &self.operator)?,
                date: parse_filter_date(&self.value).ok_or_else(|| {
                    ValidationError::InvalidValue {
                        factor: factor.canonical_name(),
                        value: self.value.clone(),
                        reason: "expected an ISO-8601 date (YYYY-MM-DD)".to_string(),
                    }
                })?,
            }),
            FactorType::Visibility => Ok(Filter::Visibility {
                op: EqualityOperator::parse(factor, &self.operator)?,
                visibility: Visibility::from_token(&self.value)
                    .ok_or_else(|| unrecognized(factor, &self.value, Visibility::TOKENS))?,
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.to_filter().map(|_| ())
    }
}

/// Check an entry's operator and value against its factor type
pub fn validate(entry: &FilterEntry) -> Result<(), ValidationError> {
    entry.validate()
}

/// Validated, typed form of a [`FilterEntry`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Tag {
        op: ContainOperator,
        tag: String,
    },
    Type {
        op: EqualityOperator,
        memo_type: MemoType,
    },
    Text {
        op: ContainOperator,
        text: String,
    },
    DisplayTime {
        op: TimeOperator,
        date: NaiveDate,
    },
    Visibility {
        op: EqualityOperator,
        visibility: Visibility,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainOperator {
    Contain,
    NotContain,
}

impl ContainOperator {
    fn parse(factor: FactorType, token: &str) -> Result<Self, ValidationError> {
        match token {
            "CONTAIN" => Ok(ContainOperator::Contain),
            "NOT_CONTAIN" => Ok(ContainOperator::NotContain),
            _ => Err(invalid_operator(factor, token)),
        }
    }

    /// Apply the operator to a presence test
    pub fn apply(&self, present: bool) -> bool {
        match self {
            ContainOperator::Contain => present,
            ContainOperator::NotContain => !present,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EqualityOperator {
    Is,
    IsNot,
}

impl EqualityOperator {
    fn parse(factor: FactorType, token: &str) -> Result<Self, ValidationError> {
        match token {
            "IS" => Ok(EqualityOperator::Is),
            "IS_NOT" => Ok(EqualityOperator::IsNot),
            _ => Err(invalid_operator(factor, token)),
        }
    }

    /// Apply the operator to an equality test
    pub fn apply(&self, equal: bool) -> bool {
        match self {
            EqualityOperator::Is => equal,
            EqualityOperator::IsNot => !equal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOperator {
    Before,
    After,
}

impl TimeOperator {
    fn parse(factor: FactorType, token: &str) -> Result<Self, ValidationError> {
        match token {
            "BEFORE" => Ok(TimeOperator::Before),
            "AFTER" => Ok(TimeOperator::After),
            _ => Err(invalid_operator(factor, token)),
        }
    }
}

/// Memo classification derived from its content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoType {
    NotTagged,
    Linked,
    Imaged,
    Connected,
}

impl MemoType {
    pub const TOKENS: &'static [&'static str] = &["NOT_TAGGED", "LINKED", "IMAGED", "CONNECTED"];

    pub fn token(&self) -> &'static str {
        match self {
            MemoType::NotTagged => "NOT_TAGGED",
            MemoType::Linked => "LINKED",
            MemoType::Imaged => "IMAGED",
            MemoType::Connected => "CONNECTED",
        }
    }

    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "NOT_TAGGED" => Some(MemoType::NotTagged),
            "LINKED" => Some(MemoType::Linked),
            "IMAGED" => Some(MemoType::Imaged),
            "CONNECTED" => Some(MemoType::Connected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub const TOKENS: &'static [&'static str] = &["PUBLIC", "PROTECTED", "PRIVATE"];

    pub fn token(&self) -> &'static str {
        match self {
            Visibility::Public => "PUBLIC",
            Visibility::Protected => "PROTECTED",
            Visibility::Private => "PRIVATE",
        }
    }

    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "PUBLIC" => Some(Visibility::Public),
            "PROTECTED" => Some(Visibility::Protected),
            "PRIVATE" => Some(Visibility::Private),
            _ => None,
        }
    }
}

/// Parse a DISPLAY_TIME value into a calendar day
///
/// Accepts a plain `YYYY-MM-DD` date or a full RFC 3339 timestamp, in which
/// case the UTC date is used.
pub fn parse_filter_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|ts| ts.with_timezone(&Utc).date_naive())
    })
}

fn invalid_operator(factor: FactorType, token: &str) -> ValidationError {
    ValidationError::InvalidOperator {
        factor: factor.canonical_name(),
        operator: token.to_string(),
        expected: factor.operators().join(", "),
    }
}

fn non_empty(factor: FactorType, value: &str) -> Result<String, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::InvalidValue {
            factor: factor.canonical_name(),
            value: String::new(),
            reason: "value must not be empty".to_string(),
        });
    }
    Ok(value.to_string())
}

fn unrecognized(factor: FactorType, value: &str, known: &[&str]) -> ValidationError {
    ValidationError::InvalidValue {
        factor: factor.canonical_name(),
        value: value.to_string(),
        reason: format!("expected one of: {}", known.join(", ")),
    }
}
