use super::error::{EvaluationError, ValidationError};
use super::model::{Filter, FilterEntry, MemoType, Relation, TimeOperator};
use super::set::FilterSet;
use chrono::{DateTime, Utc};
use tracing::warn;

/// Anything a filter set can be evaluated against
pub trait FilterRecord {
    fn has_tag(&self, tag: &str) -> bool;
    fn memo_type(&self) -> &str;

    /// Whether the record is of the given type
    ///
    /// A record can be of several types at once; the default only knows the
    /// single type literal from [`FilterRecord::memo_type`].
    fn has_type(&self, memo_type: MemoType) -> bool {
        self.memo_type() == memo_type.token()
    }

    fn text(&self) -> &str;
    fn display_time(&self) -> DateTime<Utc>;
    fn visibility(&self) -> &str;
}

/// Evaluate one entry against a record
///
/// The entry is validated first; a value that does not parse is an error,
/// never a silent non-match.
pub fn evaluate<R: FilterRecord + ?Sized>(
    entry: &FilterEntry,
    record: &R,
) -> Result<bool, ValidationError> {
    let hit = match entry.to_filter()? {
        Filter::Tag { op, tag } => op.apply(record.has_tag(&tag)),
        Filter::Type { op, memo_type } => op.apply(record.has_type(memo_type)),
        Filter::Text { op, text } => op.apply(record.text().contains(text.as_str())),
        Filter::DisplayTime { op, date } => {
            // Day granularity: the time of day of the record is dropped
            let day = record.display_time().date_naive();
            match op {
                TimeOperator::Before => day < date,
                TimeOperator::After => day > date,
            }
        }
        Filter::Visibility { op, visibility } => {
            op.apply(record.visibility() == visibility.token())
        }
    };
    Ok(hit)
}

/// Fold a filter set over a record, strictly left to right
///
/// Each entry after the first combines with the accumulated result of all
/// entries before it through its own relation; there is no precedence
/// between AND and OR. An empty set matches every record.
pub fn matches<R: FilterRecord + ?Sized>(
    set: &FilterSet,
    record: &R,
) -> Result<bool, EvaluationError> {
    let mut acc: Option<bool> = None;
    for (index, entry) in set.iter().enumerate() {
        let hit = evaluate(entry, record).map_err(|source| EvaluationError { index, source })?;
        acc = Some(match acc {
            None => hit,
            Some(prev) => match entry.relation {
                Relation::And => prev && hit,
                Relation::Or => prev || hit,
            },
        });
    }
    Ok(acc.unwrap_or(true))
}

/// A record that was excluded because the filter set failed on it
#[derive(Debug, Clone)]
pub struct RecordFailure {
    /// Position of the record in the input slice
    pub record: usize,
    pub error: EvaluationError,
}

/// Outcome of running a filter set over a list of records
#[derive(Debug)]
pub struct FilterPass<'a, R> {
    pub matched: Vec<&'a R>,
    pub failures: Vec<RecordFailure>,
}

/// Filter an in-memory list, record by record
///
/// Evaluation failures exclude the record they happened on and are logged;
/// the remaining records are still processed.
pub fn filter_records<'a, R: FilterRecord>(set: &FilterSet, records: &'a [R]) -> FilterPass<'a, R> {
    let mut pass = FilterPass {
        matched: Vec::new(),
        failures: Vec::new(),
    };

    for (idx, record) in records.iter().enumerate() {
        match matches(set, record) {
            Ok(true) => pass.matched.push(record),
            Ok(false) => {}
            Err(error) => {
                warn!(record = idx, entry = error.index, "excluding record: {}", error);
                pass.failures.push(RecordFailure { record: idx, error });
            }
        }
    }

    pass
}

/// Build a boolean predicate from a filter set for use with `Iterator::filter`
///
/// Records the set fails on are treated as non-matching and logged.
pub fn predicate<R: FilterRecord + ?Sized>(set: &FilterSet) -> impl Fn(&R) -> bool + '_ {
    move |record: &R| match matches(set, record) {
        Ok(hit) => hit,
        Err(error) => {
            warn!(entry = error.index, "excluding record: {}", error);
            false
        }
    }
}
