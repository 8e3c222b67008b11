use thiserror::Error;

/// Errors produced when checking a filter entry against its factor type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid operator '{operator}' for {factor}. Valid operators are: {expected}")]
    InvalidOperator {
        factor: &'static str,
        operator: String,
        expected: String,
    },

    #[error("Invalid value '{value}' for {factor}: {reason}")]
    InvalidValue {
        factor: &'static str,
        value: String,
        reason: String,
    },
}

/// Errors that can occur when decoding an encoded filter set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Malformed filter encoding in entry {entry}: {reason}")]
    MalformedEncoding { entry: usize, reason: String },

    #[error(
        "Unknown filter type: '{0}'. Valid types are: TAG, TYPE, TEXT, DISPLAY_TIME, VISIBILITY"
    )]
    UnknownFactorType(String),
}

impl DecodeError {
    pub(crate) fn malformed(entry: usize, reason: impl Into<String>) -> Self {
        DecodeError::MalformedEncoding {
            entry,
            reason: reason.into(),
        }
    }
}

/// A filter entry could not be evaluated against a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Filter entry {index} cannot be evaluated: {source}")]
pub struct EvaluationError {
    /// Position of the offending entry in its filter set
    pub index: usize,
    #[source]
    pub source: ValidationError,
}

/// A filter set could not be compiled into a server-side expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error(transparent)]
    Invalid(#[from] EvaluationError),

    #[error("Filter entry {index}: {factor} {value} has no server-side field")]
    Unsupported {
        index: usize,
        factor: &'static str,
        value: String,
    },
}

impl ExpressionError {
    /// Position of the entry that could not be compiled
    pub fn index(&self) -> usize {
        match self {
            ExpressionError::Invalid(err) => err.index,
            ExpressionError::Unsupported { index, .. } => *index,
        }
    }
}
