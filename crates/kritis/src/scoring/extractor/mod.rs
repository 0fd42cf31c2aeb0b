//! Best-effort recovery of score records from the remote judge's raw text.
//!
//! The judge is an uncontrolled text generator: replies arrive wrapped in
//! markdown fences, surrounded by prose, cut off by token limits, or encoded
//! twice. Recovery runs a fixed table of pure stages left to right; each stage
//! either yields a record or hands its working text to the next one. When
//! every stage fails the caller still receives a record, never an error.

mod repair;
mod stages;

use super::domain::RawCriterionScores;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stages::{
    normalize_characters, parse_direct, parse_normalized, parse_repaired, parse_within_braces,
    record_from_value, strip_fences, StageResult,
};
use tracing::{debug, warn};

/// Feedback used when nothing readable survives recovery.
pub const UNPARSEABLE_FEEDBACK: &str = "Η αξιολόγηση δεν ήταν δυνατό να αναγνωστεί.";

const FALLBACK_FEEDBACK_LIMIT: usize = 500;
const MAX_UNWRAP_DEPTH: usize = 1;

/// The recovery stage that produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStage {
    Direct,
    Normalized,
    Boundary,
    Truncation,
    Fallback,
}

impl RecoveryStage {
    pub fn label(&self) -> &'static str {
        match self {
            RecoveryStage::Direct => "direct",
            RecoveryStage::Normalized => "normalized",
            RecoveryStage::Boundary => "boundary",
            RecoveryStage::Truncation => "truncation",
            RecoveryStage::Fallback => "fallback",
        }
    }
}

type Stage = fn(&str) -> StageResult;

const STAGES: [(RecoveryStage, Stage); 4] = [
    (RecoveryStage::Direct, parse_direct),
    (RecoveryStage::Normalized, parse_normalized),
    (RecoveryStage::Boundary, parse_within_braces),
    (RecoveryStage::Truncation, parse_repaired),
];

/// Extracted record plus the stage that recovered it.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub scores: RawCriterionScores,
    pub stage: RecoveryStage,
}

/// Recover a score record from raw judge text. Never fails.
pub fn extract(raw: &str) -> Extraction {
    let cleaned = strip_fences(raw);

    match run_stages(&cleaned) {
        Some((scores, stage)) => Extraction {
            scores: unwrap_nested(scores),
            stage,
        },
        None => {
            warn!(
                length = raw.len(),
                "judge output unreadable after every recovery stage"
            );
            Extraction {
                scores: fallback(&cleaned),
                stage: RecoveryStage::Fallback,
            }
        }
    }
}

/// Convenience wrapper returning only the record.
pub fn extract_scores(raw: &str) -> RawCriterionScores {
    extract(raw).scores
}

fn run_stages(text: &str) -> Option<(RawCriterionScores, RecoveryStage)> {
    let mut candidate = text.to_string();

    for (stage, run) in STAGES {
        match run(&candidate) {
            Ok(scores) => {
                debug!(stage = stage.label(), "judge output recovered");
                return Some((scores, stage));
            }
            Err(next) => {
                debug!(stage = stage.label(), reason = %next.reason, "recovery stage failed");
                candidate = next.carry;
            }
        }
    }

    None
}

fn unwrap_nested(mut scores: RawCriterionScores) -> RawCriterionScores {
    for _ in 0..MAX_UNWRAP_DEPTH {
        let Some(inner) = nested_record(scores.feedback.as_ref()) else {
            break;
        };
        debug!("promoting record nested inside feedback");
        scores = promote(scores, inner);
    }
    scores
}

fn nested_record(feedback: Option<&Value>) -> Option<RawCriterionScores> {
    match feedback? {
        Value::String(text) => {
            let stripped = strip_fences(text);
            if looks_structured(&stripped) && stripped.contains("\"criteria\"") {
                run_stages(&stripped).map(|(scores, _)| scores)
            } else {
                None
            }
        }
        Value::Object(object) if object.contains_key("criteria") => {
            record_from_value(Value::Object(object.clone())).ok()
        }
        _ => None,
    }
}

fn promote(mut outer: RawCriterionScores, inner: RawCriterionScores) -> RawCriterionScores {
    outer.criteria.extend(inner.criteria);
    outer.feedback = inner.feedback;
    outer.reported_total = inner.reported_total.or(outer.reported_total);
    outer
}

pub(crate) fn looks_structured(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}

fn fallback(cleaned: &str) -> RawCriterionScores {
    let readable = normalize_characters(cleaned);
    if readable.is_empty() || looks_structured(&readable) {
        return RawCriterionScores::with_feedback(UNPARSEABLE_FEEDBACK);
    }

    let capped: String = readable.chars().take(FALLBACK_FEEDBACK_LIMIT).collect();
    RawCriterionScores::with_feedback(capped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn well_formed_payload_round_trips() {
        let raw = r#"{"criteria":{"Θέση":2,"Αντίρρηση":3},"feedback":"καλή δουλειά","total":5}"#;
        let extraction = extract(raw);

        let expected: RawCriterionScores = serde_json::from_str(raw).expect("valid record");
        assert_eq!(extraction.stage, RecoveryStage::Direct);
        assert_eq!(extraction.scores, expected);
    }

    #[test]
    fn backticks_in_feedback_round_trip_unchanged() {
        let raw = r#"{"criteria":{"a":1},"feedback":"Avoid ```json fences"}"#;
        let extraction = extract(raw);

        assert_eq!(extraction.stage, RecoveryStage::Direct);
        assert_eq!(extraction.scores.feedback_text(), Some("Avoid ```json fences"));

        let fenced = extract(&format!("```json\n{raw}\n```"));
        assert_eq!(fenced.scores, extraction.scores);
    }

    #[test]
    fn nested_payload_keeps_backticks_in_inner_feedback() {
        let inner = r#"{"criteria":{"a":2},"feedback":"use ```code``` sparingly"}"#;
        let raw = json!({ "criteria": {}, "feedback": inner }).to_string();

        let scores = extract_scores(&raw);
        assert_eq!(scores.criteria.get("a"), Some(&json!(2)));
        assert_eq!(scores.feedback_text(), Some("use ```code``` sparingly"));
    }

    #[test]
    fn fenced_payload_is_recovered_directly() {
        let extraction = extract("```json\n{\"criteria\":{\"Θέση\":2},\"feedback\":\"good\"}\n```");

        assert_eq!(extraction.stage, RecoveryStage::Direct);
        assert_eq!(extraction.scores.criteria.get("Θέση"), Some(&json!(2)));
        assert_eq!(extraction.scores.feedback_text(), Some("good"));
    }

    #[test]
    fn missing_final_brace_is_repaired() {
        let extraction = extract(r#"{"criteria":{"Θέση":2},"feedback":"ok""#);

        assert_eq!(extraction.stage, RecoveryStage::Truncation);
        assert_eq!(extraction.scores.criteria.get("Θέση"), Some(&json!(2)));
        assert!(extraction
            .scores
            .feedback_text()
            .is_some_and(|text| text.contains("ok")));
    }

    #[test]
    fn prose_around_payload_uses_boundary_stage() {
        let extraction = extract("Η βαθμολογία είναι: {\"criteria\":{\"Θέση\":1}} Ευχαριστώ.");
        assert_eq!(extraction.stage, RecoveryStage::Boundary);
        assert_eq!(extraction.scores.criteria.get("Θέση"), Some(&json!(1)));
    }

    #[test]
    fn nested_payload_in_feedback_is_promoted_once() {
        let inner = r#"{"criteria":{"Θέση":3},"feedback":"εσωτερικό"}"#;
        let raw = json!({ "criteria": {}, "feedback": inner }).to_string();

        let scores = extract_scores(&raw);
        assert_eq!(scores.criteria.get("Θέση"), Some(&json!(3)));
        assert_eq!(scores.feedback_text(), Some("εσωτερικό"));
    }

    #[test]
    fn nested_unwrap_stops_after_one_level() {
        let innermost = r#"{"criteria":{"a":1},"feedback":"deep"}"#;
        let middle = json!({ "criteria": {"a": 2}, "feedback": innermost }).to_string();
        let raw = json!({ "criteria": {}, "feedback": middle }).to_string();

        let scores = extract_scores(&raw);
        assert_eq!(scores.criteria.get("a"), Some(&json!(2)));
        assert_eq!(scores.feedback_text(), Some(innermost));
    }

    #[test]
    fn object_feedback_with_criteria_is_promoted() {
        let raw = r#"{"feedback":{"criteria":{"a":2},"feedback":"inner"}}"#;
        let scores = extract_scores(raw);
        assert_eq!(scores.criteria.get("a"), Some(&json!(2)));
        assert_eq!(scores.feedback_text(), Some("inner"));
    }

    #[test]
    fn unreadable_text_falls_back_to_capped_feedback() {
        let prose = "Ο παίκτης έδωσε καλή απάντηση. ".repeat(40);
        let extraction = extract(&prose);

        assert_eq!(extraction.stage, RecoveryStage::Fallback);
        assert!(extraction.scores.criteria.is_empty());
        let feedback = extraction.scores.feedback_text().expect("feedback present");
        assert_eq!(feedback.chars().count(), FALLBACK_FEEDBACK_LIMIT);
    }

    #[test]
    fn empty_and_structured_garbage_use_diagnostic() {
        for raw in ["", "   ", "```json\n```", "{{{{", "[1, 2"] {
            let extraction = extract(raw);
            assert!(extraction.scores.criteria.is_empty(), "input {raw:?}");
            assert_eq!(
                extraction.scores.feedback_text(),
                Some(UNPARSEABLE_FEEDBACK),
                "input {raw:?}"
            );
        }
    }

    #[test]
    fn adversarial_inputs_never_panic() {
        let deep = "[".repeat(10_000);
        let deep_objects = "{\"a\":".repeat(5_000);
        let binary: String = (0u8..=255).map(char::from).collect();
        let long = format!("{{\"criteria\":{{\"a\":1}},\"feedback\":\"{}", "x".repeat(200_000));

        for raw in [deep.as_str(), deep_objects.as_str(), binary.as_str(), long.as_str()] {
            let _ = extract(raw);
        }
    }
}
