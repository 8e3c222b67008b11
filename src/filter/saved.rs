//! Saved query import and export
//!
//! Saved queries keep their filters as a JSON list where each filter nests
//! operator and value:
//!
//! ```text
//! [{"type":"TAG","value":{"operator":"CONTAIN","value":"work"},"relation":"AND"}]
//! ```
//!
//! Stored strings are read with JSON5 so hand-edited queries (trailing
//! commas, single quotes, comments) still load.

use super::model::{FactorType, FilterEntry, Relation};
use super::set::FilterSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SavedQueryError {
    #[error("Failed to parse saved query: {0}")]
    Parse(String),

    #[error("Failed to serialize saved query: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedFilter {
    #[serde(rename = "type")]
    factor: FactorType,
    value: SavedFilterValue,
    #[serde(default)]
    relation: Relation,
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedFilterValue {
    operator: String,
    #[serde(default)]
    value: String,
}

/// Parse the filter list of a saved query
pub fn parse_saved_query(raw: &str) -> Result<FilterSet, SavedQueryError> {
    let filters: Vec<SavedFilter> =
        json5::from_str(raw).map_err(|e| SavedQueryError::Parse(e.to_string()))?;
    Ok(filters
        .into_iter()
        .map(|f| FilterEntry {
            factor: f.factor,
            operator: f.value.operator,
            value: f.value.value,
            relation: f.relation,
        })
        .collect())
}

/// Serialize a filter set into the saved query format
pub fn to_saved_query(set: &FilterSet) -> Result<String, SavedQueryError> {
    let filters: Vec<SavedFilter> = set
        .iter()
        .map(|e| SavedFilter {
            factor: e.factor,
            value: SavedFilterValue {
                operator: e.operator.clone(),
                value: e.value.clone(),
            },
            relation: e.relation,
        })
        .collect();
    Ok(serde_json::to_string(&filters)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_saved_query_is_lenient() {
        let raw = r#"[
            // pinned search
            {type: 'TAG', value: {operator: 'CONTAIN', value: 'work'}, relation: 'AND'},
            {type: 'TEXT', value: {operator: 'NOT_CONTAIN', value: 'draft'}, relation: 'OR',},
        ]"#;
        let set = parse_saved_query(raw).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.entries()[1].factor, FactorType::Text);
        assert_eq!(set.entries()[1].relation, Relation::Or);
    }

    #[test]
    fn test_missing_value_defaults_to_empty() {
        let raw = r#"[{"type":"TYPE","value":{"operator":"IS"},"relation":"AND"}]"#;
        let set = parse_saved_query(raw).unwrap();
        assert_eq!(set.entries()[0].value, "");
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let raw = r#"[{"type":"PINNED","value":{"operator":"IS","value":"x"}}]"#;
        assert!(parse_saved_query(raw).is_err());
    }

    #[test]
    fn test_to_saved_query_shape() {
        let set = FilterSet::from(vec![FilterEntry::new(
            FactorType::Visibility,
            "IS",
            "PUBLIC",
        )]);
        assert_eq!(
            to_saved_query(&set).unwrap(),
            r#"[{"type":"VISIBILITY","value":{"operator":"IS","value":"PUBLIC"},"relation":"AND"}]"#
        );
    }
}
