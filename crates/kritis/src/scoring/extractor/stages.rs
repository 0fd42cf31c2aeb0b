use super::repair::repair_candidates;
use crate::scoring::domain::RawCriterionScores;
use indexmap::IndexMap;
use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::OnceLock;

/// Signal to move on, carrying the text the next stage should work from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Continue {
    pub(crate) carry: String,
    pub(crate) reason: String,
}

impl Continue {
    fn new(carry: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            carry: carry.into(),
            reason: reason.into(),
        }
    }
}

pub(crate) type StageResult = Result<RawCriterionScores, Continue>;

const FEEDBACK_FIELDS: [&str; 2] = ["feedback", "comment"];
const RESERVED_FIELDS: [&str; 4] = ["feedback", "comment", "total", "summary"];

static TRAILING_SEPARATOR: OnceLock<Regex> = OnceLock::new();

// String literals (closed or cut off at the end) are matched first so a
// separator inside feedback text is never touched.
fn trailing_separator() -> &'static Regex {
    TRAILING_SEPARATOR.get_or_init(|| {
        Regex::new(r#"("(?:[^"\\]|\\.)*(?:"|$))|,\s*([}\]])"#)
            .expect("trailing separator pattern compiles")
    })
}

/// Remove a fence (with its language tag) opening the text and a fence closing it.
///
/// Backticks elsewhere belong to the payload and are kept.
pub(crate) fn strip_fences(raw: &str) -> String {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let tag_len = rest
            .char_indices()
            .find(|(_, c)| !c.is_ascii_alphanumeric())
            .map_or(rest.len(), |(idx, _)| idx);
        text = rest[tag_len..].trim_start();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }

    text.to_string()
}

/// Replace typographic quotes, drop invisible and control characters, collapse
/// line breaks, and remove separators left dangling before a closer.
pub(crate) fn normalize_characters(text: &str) -> String {
    let mapped: String = text
        .chars()
        .filter_map(|c| match c {
            '\u{201c}' | '\u{201d}' | '\u{201e}' | '\u{201f}' | '\u{00ab}' | '\u{00bb}'
            | '\u{2033}' => Some('"'),
            '\u{2018}' | '\u{2019}' | '\u{201a}' | '\u{201b}' | '\u{2032}' => Some('\''),
            '\n' | '\r' | '\t' => Some(' '),
            '\u{feff}' | '\u{200b}' | '\u{200c}' | '\u{200d}' => None,
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect();

    trailing_separator()
        .replace_all(mapped.trim(), |caps: &Captures<'_>| match caps.get(1) {
            Some(literal) => literal.as_str().to_string(),
            None => caps[2].to_string(),
        })
        .into_owned()
}

/// Stage 2: the text is already a well-formed record.
pub(crate) fn parse_direct(text: &str) -> StageResult {
    parse_record(text.trim()).map_err(|failure| match failure {
        ParseFailure::DoubleEncoded(inner) => {
            Continue::new(inner, "payload was a JSON string; unwrapped one level")
        }
        ParseFailure::Invalid(reason) => Continue::new(text, reason),
    })
}

/// Stage 3: retry after character normalization.
pub(crate) fn parse_normalized(text: &str) -> StageResult {
    let normalized = normalize_characters(text);
    parse_record(&normalized).map_err(|failure| Continue::new(normalized, failure.describe()))
}

/// Stage 4: parse only the span between the first `{` and the last `}`.
pub(crate) fn parse_within_braces(text: &str) -> StageResult {
    let Some(start) = text.find('{') else {
        return Err(Continue::new(text, "no opening brace"));
    };
    let tail = &text[start..];

    match tail.rfind('}') {
        Some(end) => parse_record(&tail[..=end])
            .map_err(|failure| Continue::new(tail, failure.describe())),
        None => Err(Continue::new(tail, "no closing brace after the opening brace")),
    }
}

/// Stage 5: append the closers a truncated payload is missing.
pub(crate) fn parse_repaired(text: &str) -> StageResult {
    let candidates = repair_candidates(text.trim());
    if candidates.is_empty() {
        return Err(Continue::new(text, "structure cannot be completed by appending"));
    }

    let mut last_reason = String::new();
    for candidate in candidates {
        match parse_record(&candidate) {
            Ok(record) => return Ok(record),
            Err(failure) => last_reason = failure.describe(),
        }
    }
    Err(Continue::new(text, last_reason))
}

enum ParseFailure {
    DoubleEncoded(String),
    Invalid(String),
}

impl ParseFailure {
    fn describe(self) -> String {
        match self {
            ParseFailure::DoubleEncoded(_) => "payload was a JSON string".to_string(),
            ParseFailure::Invalid(reason) => reason,
        }
    }
}

fn parse_record(text: &str) -> Result<RawCriterionScores, ParseFailure> {
    let value = serde_json::from_str::<Value>(text)
        .map_err(|err| ParseFailure::Invalid(format!("invalid JSON: {err}")))?;

    match value {
        Value::String(inner) => Err(ParseFailure::DoubleEncoded(inner)),
        other => record_from_value(other).map_err(ParseFailure::Invalid),
    }
}

/// Interpret a parsed JSON value as a score record.
///
/// Accepts `{"criteria": {...}, "feedback": ..., "total": ...}` or, with no
/// `criteria` field, a flat object whose non-reserved fields are criterion values.
pub(crate) fn record_from_value(value: Value) -> Result<RawCriterionScores, String> {
    let Value::Object(mut object) = value else {
        return Err("payload is not an object".to_string());
    };

    let feedback = FEEDBACK_FIELDS
        .iter()
        .find_map(|field| object.get(*field).filter(|value| !value.is_null()))
        .cloned();
    let reported_total = object.get("total").filter(|value| !value.is_null()).cloned();

    let criteria: IndexMap<String, Value> = match object.remove("criteria") {
        Some(Value::Object(map)) => map.into_iter().collect(),
        Some(_) => return Err("criteria is not an object".to_string()),
        None => object
            .into_iter()
            .filter(|(key, _)| !RESERVED_FIELDS.contains(&key.as_str()))
            .collect(),
    };

    Ok(RawCriterionScores {
        criteria,
        feedback,
        reported_total,
    })
}
