use crate::filter::{FilterPass, FilterSet, ValidationError};
use crate::memo::Memo;
use colored::Colorize;
use comfy_table::{Cell, Table};
use serde_json::json;
use std::fmt::Write as _;

/// Render the entries of a filter set as a table
pub fn format_filter_table(set: &FilterSet) -> String {
    if set.is_empty() {
        return format!("{}\n", "No filters".dimmed());
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Relation", "Factor", "Operator", "Value"]);
    for (idx, entry) in set.iter().enumerate() {
        // The first relation has no predecessor to combine with
        let relation = if idx == 0 {
            "-".to_string()
        } else {
            entry.relation.to_string()
        };
        table.add_row(vec![
            Cell::new(idx),
            Cell::new(relation),
            Cell::new(entry.factor),
            Cell::new(&entry.operator),
            Cell::new(&entry.value),
        ]);
    }
    format!("{table}\n")
}

pub fn format_filter_json(set: &FilterSet) -> String {
    serde_json::to_string_pretty(set).unwrap_or_else(|_| "[]".to_string())
}

/// Render per-entry validation results
pub fn format_check_text(
    set: &FilterSet,
    errors: &[(usize, ValidationError)],
    warnings: &[String],
) -> String {
    let mut out = String::new();
    for (idx, entry) in set.iter().enumerate() {
        match errors.iter().find(|(i, _)| *i == idx) {
            Some((_, err)) => {
                let _ = writeln!(out, "{} [{}] {}", "✗".red().bold(), idx, err);
            }
            None => {
                let _ = writeln!(
                    out,
                    "{} [{}] {} {} {}",
                    "✓".green().bold(),
                    idx,
                    entry.factor,
                    entry.operator,
                    entry.value
                );
            }
        }
    }
    for warning in warnings {
        let _ = writeln!(out, "{} {}", "Warning:".yellow().bold(), warning);
    }
    let _ = writeln!(
        out,
        "\n{} of {} entries valid",
        set.len() - errors.len(),
        set.len()
    );
    out
}

pub fn format_check_json(
    set: &FilterSet,
    errors: &[(usize, ValidationError)],
    warnings: &[String],
) -> String {
    let entries: Vec<_> = set
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let error = errors
                .iter()
                .find(|(i, _)| *i == idx)
                .map(|(_, e)| e.to_string());
            json!({
                "index": idx,
                "entry": entry,
                "valid": error.is_none(),
                "error": error,
            })
        })
        .collect();

    serde_json::to_string_pretty(&json!({
        "valid": errors.is_empty(),
        "entries": entries,
        "warnings": warnings,
    }))
    .unwrap_or_else(|_| "{}".to_string())
}

/// Render memos that passed a filter, followed by a summary line
pub fn format_pass_text(pass: &FilterPass<'_, Memo>, total: usize) -> String {
    let mut out = String::new();

    if !pass.matched.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Name", "Display time", "Visibility", "Type", "Tags", "Content"]);
        for memo in &pass.matched {
            table.add_row(vec![
                Cell::new(&memo.name),
                Cell::new(memo.display_time.format("%Y-%m-%d %H:%M")),
                Cell::new(&memo.visibility),
                Cell::new(&memo.memo_type),
                Cell::new(memo.tags.iter().cloned().collect::<Vec<_>>().join(", ")),
                Cell::new(preview(&memo.content, 48)),
            ]);
        }
        let _ = writeln!(out, "{table}");
    }

    let _ = writeln!(
        out,
        "{} of {} memos match",
        pass.matched.len().to_string().bold(),
        total
    );
    if !pass.failures.is_empty() {
        let _ = writeln!(
            out,
            "{} {} memos excluded because the filter could not be evaluated",
            "Warning:".yellow().bold(),
            pass.failures.len()
        );
    }
    out
}

pub fn format_pass_json(pass: &FilterPass<'_, Memo>, total: usize) -> String {
    let failures: Vec<_> = pass
        .failures
        .iter()
        .map(|f| {
            json!({
                "record": f.record,
                "entry": f.error.index,
                "error": f.error.to_string(),
            })
        })
        .collect();

    serde_json::to_string_pretty(&json!({
        "total": total,
        "matched": pass.matched,
        "failures": failures,
    }))
    .unwrap_or_else(|_| "{}".to_string())
}

fn preview(content: &str, max_chars: usize) -> String {
    let single_line = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= max_chars {
        return single_line;
    }
    let mut cut: String = single_line.chars().take(max_chars).collect();
    cut.push('…');
    cut
}
