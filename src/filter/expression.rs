use super::error::{EvaluationError, ExpressionError};
use super::model::{ContainOperator, EqualityOperator, Filter, MemoType, Relation, TimeOperator};
use super::set::FilterSet;
use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

const SECONDS_PER_DAY: i64 = 60 * 60 * 24;

/// Options for rendering a filter set as a server-side filter expression
#[derive(Debug, Clone, Default)]
pub struct ExpressionOptions {
    /// Compare DISPLAY_TIME against `updated_ts` instead of `created_ts`
    pub display_with_update_time: bool,
}

impl ExpressionOptions {
    fn time_field(&self) -> &'static str {
        if self.display_with_update_time {
            "updated_ts"
        } else {
            "created_ts"
        }
    }
}

/// Compile a filter set into the memo service filter language
///
/// The same left fold as [`crate::filter::matches`] is used: every step
/// wraps the accumulated expression in parentheses before joining the next
/// condition, so the server sees exactly the grouping the client evaluates.
/// Returns `None` for an empty set. TYPE entries for IMAGED and CONNECTED
/// have no server-side field and fail with [`ExpressionError::Unsupported`].
pub fn compile_expression(
    set: &FilterSet,
    options: &ExpressionOptions,
) -> Result<Option<String>, ExpressionError> {
    let mut acc: Option<String> = None;

    for (index, entry) in set.iter().enumerate() {
        let filter = entry
            .to_filter()
            .map_err(|source| EvaluationError { index, source })?;
        let condition = condition(&filter, options).ok_or_else(|| ExpressionError::Unsupported {
            index,
            factor: entry.factor.canonical_name(),
            value: entry.value.clone(),
        })?;

        acc = Some(match acc {
            None => condition,
            Some(prev) => {
                let joiner = match entry.relation {
                    Relation::And => "&&",
                    Relation::Or => "||",
                };
                format!("({prev}) {joiner} {condition}")
            }
        });
    }

    if let Some(expr) = &acc {
        debug!(expression = %expr, "compiled filter expression");
    }
    Ok(acc)
}

fn condition(filter: &Filter, options: &ExpressionOptions) -> Option<String> {
    let expr = match filter {
        Filter::Tag { op, tag } => contain(*op, format!("tag in [{}]", quote(tag))),
        Filter::Text { op, text } => contain(*op, format!("content.contains({})", quote(text))),
        Filter::Type { op, memo_type } => match memo_type {
            MemoType::Linked => match op {
                EqualityOperator::Is => "has_link".to_string(),
                EqualityOperator::IsNot => "!has_link".to_string(),
            },
            MemoType::NotTagged => format!("size(tags) {} 0", equality(*op)),
            MemoType::Imaged | MemoType::Connected => return None,
        },
        Filter::Visibility { op, visibility } => {
            format!("visibility {} {}", equality(*op), quote(visibility.token()))
        }
        Filter::DisplayTime { op, date } => {
            let field = options.time_field();
            let day_start = day_start_timestamp(*date);
            match op {
                TimeOperator::Before => format!("{field} < {day_start}"),
                TimeOperator::After => format!("{field} >= {}", day_start + SECONDS_PER_DAY),
            }
        }
    };
    Some(expr)
}

fn contain(op: ContainOperator, expr: String) -> String {
    match op {
        ContainOperator::Contain => expr,
        ContainOperator::NotContain => format!("!({expr})"),
    }
}

fn equality(op: EqualityOperator) -> &'static str {
    match op {
        EqualityOperator::Is => "==",
        EqualityOperator::IsNot => "!=",
    }
}

fn day_start_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
