use chrono::{DateTime, Utc};
use memo_filter::filter::{
    FactorType, FilterEntry, FilterSet, Relation, ValidationError, evaluate, filter_records,
    matches, validate,
};
use memo_filter::memo::Memo;
use std::collections::BTreeSet;

fn parse_utc(ts: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(ts)
        .expect("valid RFC3339 timestamp")
        .with_timezone(&Utc)
}

fn memo(tags: &[&str], visibility: &str, content: &str) -> Memo {
    Memo {
        name: String::new(),
        content: content.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
        memo_type: String::new(),
        visibility: visibility.to_string(),
        display_time: parse_utc("2024-03-15T23:59:00Z"),
    }
}

#[test]
fn test_or_applies_to_accumulated_result() {
    let set = FilterSet::from(vec![
        FilterEntry::new(FactorType::Tag, "CONTAIN", "work"),
        FilterEntry::new(FactorType::Visibility, "IS", "PUBLIC").with_relation(Relation::And),
        FilterEntry::new(FactorType::Text, "CONTAIN", "urgent").with_relation(Relation::Or),
    ]);
    let record = memo(&["home"], "PUBLIC", "urgent memo");

    // false AND true = false; false OR true = true
    assert!(matches(&set, &record).expect("all entries are valid"));
}

#[test]
fn test_and_after_or_has_no_precedence() {
    // (a OR b) AND c, never a OR (b AND c)
    let set = FilterSet::from(vec![
        FilterEntry::new(FactorType::Tag, "CONTAIN", "home"),
        FilterEntry::new(FactorType::Tag, "CONTAIN", "work").with_relation(Relation::Or),
        FilterEntry::new(FactorType::Visibility, "IS", "PRIVATE").with_relation(Relation::And),
    ]);
    let record = memo(&["home"], "PUBLIC", "x");
    assert!(!matches(&set, &record).unwrap());
}

#[test]
fn test_display_time_truncates_to_day() {
    let record = memo(&[], "PUBLIC", "x");

    let before_next_day = FilterEntry::new(FactorType::DisplayTime, "BEFORE", "2024-03-16");
    assert!(evaluate(&before_next_day, &record).unwrap());

    let before_same_day = FilterEntry::new(FactorType::DisplayTime, "BEFORE", "2024-03-15");
    assert!(!evaluate(&before_same_day, &record).unwrap());

    let after_same_day = FilterEntry::new(FactorType::DisplayTime, "AFTER", "2024-03-15");
    assert!(!evaluate(&after_same_day, &record).unwrap());

    let after_previous_day = FilterEntry::new(FactorType::DisplayTime, "AFTER", "2024-03-14");
    assert!(evaluate(&after_previous_day, &record).unwrap());
}

#[test]
fn test_tag_and_type_operators() {
    let record = Memo::from_content(
        "read https://example.com #work/reading",
        "PROTECTED",
        parse_utc("2024-01-01T00:00:00Z"),
    );

    let cases = [
        (FactorType::Tag, "CONTAIN", "work", true),
        (FactorType::Tag, "CONTAIN", "work/reading", true),
        (FactorType::Tag, "NOT_CONTAIN", "work", false),
        (FactorType::Type, "IS", "LINKED", true),
        (FactorType::Type, "IS_NOT", "LINKED", false),
        (FactorType::Type, "IS", "NOT_TAGGED", false),
        (FactorType::Visibility, "IS_NOT", "PUBLIC", true),
        (FactorType::Visibility, "IS", "PROTECTED", true),
    ];
    for (factor, operator, value, expected) in cases {
        let entry = FilterEntry::new(factor, operator, value);
        assert_eq!(
            evaluate(&entry, &record).unwrap(),
            expected,
            "{factor} {operator} {value}"
        );
    }
}

#[test]
fn test_validation_rejects_operator_of_other_factor() {
    let entry = FilterEntry::new(FactorType::Type, "CONTAIN", "x");
    assert!(matches!(
        validate(&entry),
        Err(ValidationError::InvalidOperator { .. })
    ));
}

#[test]
fn test_evaluation_error_names_offending_entry() {
    let set = FilterSet::from(vec![
        FilterEntry::new(FactorType::Tag, "CONTAIN", "home"),
        FilterEntry::new(FactorType::Text, "CONTAIN", "x"),
        FilterEntry::new(FactorType::DisplayTime, "AFTER", "2024-13-40"),
    ]);
    let err = matches(&set, &memo(&["home"], "PUBLIC", "x")).unwrap_err();
    assert_eq!(err.index, 2);
    assert!(matches!(err.source, ValidationError::InvalidValue { .. }));
}

#[test]
fn test_batch_filter_continues_after_failures() {
    let memos = vec![
        memo(&["work"], "PUBLIC", "first"),
        memo(&["home"], "PUBLIC", "second"),
        memo(&["work"], "PRIVATE", "third"),
    ];
    let set = FilterSet::from(vec![FilterEntry::new(FactorType::Tag, "CONTAIN", "work")]);
    let pass = filter_records(&set, &memos);
    let contents: Vec<_> = pass.matched.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["first", "third"]);
    assert!(pass.failures.is_empty());

    let broken = FilterSet::from(vec![FilterEntry::new(FactorType::Visibility, "IS", "SECRET")]);
    let pass = filter_records(&broken, &memos);
    assert!(pass.matched.is_empty());
    assert_eq!(pass.failures.len(), 3);
    assert_eq!(pass.failures[2].record, 2);
}

#[test]
fn test_partition_valid_then_evaluate() {
    let set = FilterSet::from(vec![
        FilterEntry::new(FactorType::Tag, "CONTAIN", "work"),
        FilterEntry::new(FactorType::Type, "CONTAIN", "x"),
    ]);
    let (valid, errors) = set.partition_valid();
    assert_eq!(errors.len(), 1);
    assert!(matches(&valid, &memo(&["work"], "PUBLIC", "x")).unwrap());
}

#[test]
fn test_type_filter_matches_every_type_of_a_memo() {
    let record = Memo::from_content(
        "see [@plan](memos/1) and https://example.com",
        "PUBLIC",
        parse_utc("2024-01-01T00:00:00Z"),
    );

    for memo_type in ["CONNECTED", "LINKED", "NOT_TAGGED"] {
        let set = FilterSet::from(vec![FilterEntry::new(FactorType::Type, "IS", memo_type)]);
        assert!(matches(&set, &record).unwrap(), "TYPE IS {memo_type}");
    }

    let imaged = FilterSet::from(vec![FilterEntry::new(FactorType::Type, "IS_NOT", "IMAGED")]);
    assert!(matches(&imaged, &record).unwrap());
}
