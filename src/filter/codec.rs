use super::error::DecodeError;
use super::model::{FactorType, FilterEntry, Relation};
use super::set::FilterSet;
use tracing::debug;

const ENTRY_SEPARATOR: char = ',';
const FIELD_SEPARATOR: char = ':';
const FIELDS_PER_ENTRY: usize = 4;
const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Encode a filter set into a single URL-component-safe string
///
/// Entries are joined with `,` in their original order; each entry is
/// `FACTOR:operator:RELATION:value` with operator and value escaped.
pub fn encode(set: &FilterSet) -> String {
    let mut out = String::new();
    for (idx, entry) in set.iter().enumerate() {
        if idx > 0 {
            out.push(ENTRY_SEPARATOR);
        }
        encode_entry(&mut out, entry);
    }
    out
}

fn encode_entry(out: &mut String, entry: &FilterEntry) {
    out.push_str(entry.factor.canonical_name());
    out.push(FIELD_SEPARATOR);
    escape_into(out, &entry.operator, b"");
    out.push(FIELD_SEPARATOR);
    out.push_str(entry.relation.token());
    out.push(FIELD_SEPARATOR);
    escape_into(out, &entry.value, b"");
}

/// Decode a string produced by [`encode`]
///
/// Only structural well-formedness is checked; operators and values are
/// left for [`crate::filter::validate`]. Bytes other than `:`, `,` and `%`
/// need not be escaped, so hand-written filters like `TEXT:CONTAIN:AND:a=b`
/// decode as typed.
pub fn decode(raw: &str) -> Result<FilterSet, DecodeError> {
    if raw.is_empty() {
        return Ok(FilterSet::new());
    }

    let set = raw
        .split(ENTRY_SEPARATOR)
        .enumerate()
        .map(|(idx, segment)| decode_entry(idx, segment))
        .collect::<Result<FilterSet, _>>()?;

    debug!(entries = set.len(), "decoded filter set");
    Ok(set)
}

fn decode_entry(idx: usize, segment: &str) -> Result<FilterEntry, DecodeError> {
    if segment.is_empty() {
        return Err(DecodeError::malformed(idx, "empty entry"));
    }

    let fields: Vec<&str> = segment.split(FIELD_SEPARATOR).collect();
    if fields.len() != FIELDS_PER_ENTRY {
        return Err(DecodeError::malformed(
            idx,
            format!(
                "expected {} '{}'-separated fields, found {}",
                FIELDS_PER_ENTRY,
                FIELD_SEPARATOR,
                fields.len()
            ),
        ));
    }

    let factor: FactorType = fields[0].parse()?;
    let operator = unescape(idx, fields[1])?;
    let relation = Relation::from_token(fields[2]).ok_or_else(|| {
        DecodeError::malformed(
            idx,
            format!("invalid relation '{}', expected AND or OR", fields[2]),
        )
    })?;
    let value = unescape(idx, fields[3])?;

    Ok(FilterEntry {
        factor,
        operator,
        value,
        relation,
    })
}

/// Render the filter set as a `name=value` URL query parameter
pub fn to_query_param(set: &FilterSet, name: &str) -> String {
    let mut out = String::new();
    escape_into(&mut out, name, b"");
    out.push('=');
    // ':' and ',' are legal in a query component and keep the URL readable
    escape_into(&mut out, &encode(set), b":,");
    out
}

/// Restore the filter set carried by parameter `name` of a URL query string
///
/// A missing parameter yields an empty set. The parameter value is
/// form-decoded before being handed to [`decode`], so values written by
/// browsers (which escape `:` and `,`) are accepted too.
pub fn from_query(query: &str, name: &str) -> Result<FilterSet, DecodeError> {
    let query = query.strip_prefix('?').unwrap_or(query);
    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if form_decode(key).as_deref() != Ok(name) {
            continue;
        }
        let value = form_decode(value)
            .map_err(|reason| DecodeError::malformed(0, format!("query parameter: {reason}")))?;
        return decode(&value);
    }
    Ok(FilterSet::new())
}

/// Percent-escape every byte outside the unreserved URL set
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_into(&mut out, s, b"");
    out
}

fn escape_into(out: &mut String, s: &str, keep: &[u8]) {
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') || keep.contains(&b)
        {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0x0f) as usize] as char);
        }
    }
}

fn unescape(idx: usize, field: &str) -> Result<String, DecodeError> {
    percent_decode(field, false).map_err(|reason| DecodeError::malformed(idx, reason))
}

fn form_decode(s: &str) -> Result<String, String> {
    percent_decode(s, true)
}

fn percent_decode(s: &str, plus_as_space: bool) -> Result<String, String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .ok_or_else(|| format!("truncated escape sequence at byte {i}"))?;
                match (hex_value(hex[0]), hex_value(hex[1])) {
                    (Some(hi), Some(lo)) => out.push((hi << 4) | lo),
                    _ => {
                        return Err(format!(
                            "invalid escape sequence '%{}' at byte {i}",
                            String::from_utf8_lossy(hex)
                        ));
                    }
                }
                i += 3;
            }
            b'+' if plus_as_space => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).map_err(|_| "escaped bytes are not valid UTF-8".to_string())
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_separators() {
        assert_eq!(escape("a=b&c"), "a%3Db%26c");
        assert_eq!(escape("x:y,z%"), "x%3Ay%2Cz%25");
        assert_eq!(escape("Zürich"), "Z%C3%BCrich");
    }

    #[test]
    fn test_encode_single_entry() {
        let set = FilterSet::from(vec![FilterEntry::new(
            FactorType::Text,
            "CONTAIN",
            "hello world",
        )]);
        assert_eq!(encode(&set), "TEXT:CONTAIN:AND:hello%20world");
    }

    #[test]
    fn test_decode_lowercase_hex() {
        let set = decode("TEXT:CONTAIN:OR:a%3ab").unwrap();
        assert_eq!(set.entries()[0].value, "a:b");
        assert_eq!(set.entries()[0].relation, Relation::Or);
    }

    #[test]
    fn test_decode_keeps_unescaped_reserved_bytes() {
        let set = decode("TEXT:CONTAIN:AND:a=b&c d").unwrap();
        assert_eq!(set.entries()[0].value, "a=b&c d");
        assert!(decode("TEXT:CONTAIN:AND:a:b").is_err());
    }

    #[test]
    fn test_decode_reports_entry_index() {
        let err = decode("TAG:CONTAIN:AND:a,TAG:CONTAIN:AND").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MalformedEncoding { entry: 1, .. }
        ));
    }

    #[test]
    fn test_decode_rejects_bad_escapes() {
        assert!(matches!(
            decode("TAG:CONTAIN:AND:a%2"),
            Err(DecodeError::MalformedEncoding { .. })
        ));
        assert!(matches!(
            decode("TAG:CONTAIN:AND:a%zz"),
            Err(DecodeError::MalformedEncoding { .. })
        ));
        assert!(matches!(
            decode("TAG:CONTAIN:AND:%FF"),
            Err(DecodeError::MalformedEncoding { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_empty_segment() {
        assert!(matches!(
            decode("TAG:CONTAIN:AND:a,"),
            Err(DecodeError::MalformedEncoding { entry: 1, .. })
        ));
    }

    #[test]
    fn test_from_query_accepts_browser_escaping() {
        let set = from_query("?page=2&filter=TAG%3ACONTAIN%3AAND%3Awork", "filter").unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.entries()[0].value, "work");
    }

    #[test]
    fn test_from_query_missing_param() {
        assert!(from_query("page=2", "filter").unwrap().is_empty());
        assert!(from_query("", "filter").unwrap().is_empty());
    }
}
