use crate::filter::{FilterRecord, MemoType};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([^\s#,]+)").expect("valid tag regex"));
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s]+").expect("valid link regex"));
static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[.*?\]\((.+?)\)").expect("valid image regex"));
static MEMO_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[@(.+?)\]\((.+?)\)").expect("valid memo link regex"));

#[derive(Debug, Error)]
pub enum MemoLoadError {
    #[error("Failed to read memo file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse memo on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

fn default_visibility() -> String {
    "PRIVATE".to_string()
}

/// A memo as seen by the filter combinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memo {
    /// Resource name (e.g., "memos/42")
    #[serde(default)]
    pub name: String,
    /// Markdown content
    pub content: String,
    /// Tags, including every parent of a hierarchical tag
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Primary memo type literal, empty when the memo has no particular type
    #[serde(default, rename = "type")]
    pub memo_type: String,
    #[serde(default = "default_visibility")]
    pub visibility: String,
    /// Timestamp the memo is listed under
    pub display_time: DateTime<Utc>,
}

impl Memo {
    /// Build a memo, deriving tags and type from its content
    pub fn from_content(
        content: impl Into<String>,
        visibility: impl Into<String>,
        display_time: DateTime<Utc>,
    ) -> Self {
        Memo {
            name: String::new(),
            content: content.into(),
            tags: BTreeSet::new(),
            memo_type: String::new(),
            visibility: visibility.into(),
            display_time,
        }
        .normalized()
    }

    /// Fill in tags and type from the content when they were not provided
    pub fn normalized(mut self) -> Self {
        if self.tags.is_empty() {
            self.tags = extract_tags(&self.content);
        }
        if self.memo_type.is_empty() {
            if let Some(memo_type) = classify(&self.content, &self.tags) {
                self.memo_type = memo_type.token().to_string();
            }
        }
        self
    }
}

impl FilterRecord for Memo {
    fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    fn memo_type(&self) -> &str {
        &self.memo_type
    }

    fn has_type(&self, memo_type: MemoType) -> bool {
        self.memo_type == memo_type.token() || is_type(&self.content, &self.tags, memo_type)
    }

    fn text(&self) -> &str {
        &self.content
    }

    fn display_time(&self) -> DateTime<Utc> {
        self.display_time
    }

    fn visibility(&self) -> &str {
        &self.visibility
    }
}

/// Collect `#tag` markers, expanding `#a/b/c` into `a`, `a/b` and `a/b/c`
pub fn extract_tags(content: &str) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();
    for cap in TAG_RE.captures_iter(content) {
        let tag = cap[1].trim();
        let mut path = String::new();
        for segment in tag.split('/').filter(|s| !s.is_empty()) {
            if !path.is_empty() {
                path.push('/');
            }
            path.push_str(segment);
            tags.insert(path.clone());
        }
    }
    tags
}

/// Test content for one memo type, independently of the others
pub fn is_type(content: &str, tags: &BTreeSet<String>, memo_type: MemoType) -> bool {
    match memo_type {
        MemoType::NotTagged => tags.is_empty(),
        MemoType::Linked => LINK_RE.is_match(content),
        MemoType::Imaged => IMAGE_RE.is_match(content),
        MemoType::Connected => MEMO_LINK_RE.is_match(content),
    }
}

/// Primary type of a memo, most specific first
pub fn classify(content: &str, tags: &BTreeSet<String>) -> Option<MemoType> {
    if MEMO_LINK_RE.is_match(content) {
        Some(MemoType::Connected)
    } else if IMAGE_RE.is_match(content) {
        Some(MemoType::Imaged)
    } else if LINK_RE.is_match(content) {
        Some(MemoType::Linked)
    } else if tags.is_empty() {
        Some(MemoType::NotTagged)
    } else {
        None
    }
}

/// Parse memos from a JSON array or from JSON lines
pub fn parse_memos(raw: &str) -> Result<Vec<Memo>, MemoLoadError> {
    let trimmed = raw.trim_start();
    let memos: Vec<Memo> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).map_err(|source| MemoLoadError::Parse { line: 1, source })?
    } else {
        raw.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str::<Memo>(line).map_err(|source| MemoLoadError::Parse {
                    line: idx + 1,
                    source,
                })
            })
            .collect::<Result<_, _>>()?
    };

    Ok(memos.into_iter().map(Memo::normalized).collect())
}

pub fn load_memos(path: &Path) -> Result<Vec<Memo>, MemoLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| MemoLoadError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_memos(&raw)
}
