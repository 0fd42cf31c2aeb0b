use super::domain::{
    CriterionSpec, NormalizedScoreResult, RawCriterionScores, ScaleMode, ScoringContext, BONUS_KEY,
};
use super::extractor::looks_structured;
use super::rubric::ActiveCriteriaSet;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

/// Feedback substituted when upstream feedback is missing or not plain text.
pub const PLACEHOLDER_FEEDBACK: &str = "Δεν υπάρχει διαθέσιμο σχόλιο.";

/// Clamp, zero-fill, apply round overrides, sum, and scale a raw record.
pub fn finalize(
    raw: &RawCriterionScores,
    active: &ActiveCriteriaSet<'_>,
    context: ScoringContext,
    scale: ScaleMode,
) -> NormalizedScoreResult {
    let mut criteria = IndexMap::with_capacity(active.criteria().len() + 1);

    for criterion in active.criteria() {
        let value = coerce(raw.criteria.get(&criterion.key), criterion.max);
        let value = apply_round_override(criterion, &context, value);
        criteria.insert(criterion.key.clone(), value);
    }

    if active.grants_bonus() {
        criteria.insert(BONUS_KEY.to_string(), coerce(raw.criteria.get(BONUS_KEY), 1));
    }

    let out_of = active.out_of();
    let total = criteria
        .values()
        .copied()
        .fold(0u32, u32::saturating_add)
        .min(out_of);

    if let Some(reported) = raw.reported_total.as_ref().and_then(as_integer) {
        if reported != i64::from(total) {
            debug!(reported, computed = total, "judge total differs from computed total");
        }
    }

    let scaled = match scale {
        ScaleMode::Raw => None,
        ScaleMode::TenPoint => Some(scale_to_ten(total, out_of)),
    };

    NormalizedScoreResult {
        criteria,
        total,
        out_of,
        scaled,
        feedback: plain_feedback(raw.feedback.as_ref()),
    }
}

/// Round overrides win over any parsed or heuristic value.
fn apply_round_override(criterion: &CriterionSpec, context: &ScoringContext, value: u32) -> u32 {
    if criterion.applies_in_round(context) {
        value
    } else {
        0
    }
}

fn coerce(value: Option<&Value>, max: u32) -> u32 {
    match value.and_then(as_integer) {
        Some(number) if number > 0 => u32::try_from(number).unwrap_or(u32::MAX).min(max),
        _ => 0,
    }
}

/// Numbers and numeric strings, rounded to the nearest integer.
fn as_integer(value: &Value) -> Option<i64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !number.is_finite() {
        return None;
    }
    let rounded = number.round();
    if rounded >= i64::MAX as f64 {
        Some(i64::MAX)
    } else if rounded <= i64::MIN as f64 {
        Some(i64::MIN)
    } else {
        Some(rounded as i64)
    }
}

fn scale_to_ten(total: u32, out_of: u32) -> u32 {
    if out_of == 0 {
        return 0;
    }
    let scaled = (f64::from(total) / f64::from(out_of) * 10.0).round() as u32;
    scaled.min(10)
}

fn plain_feedback(feedback: Option<&Value>) -> String {
    match feedback {
        Some(Value::String(text)) if !looks_structured(text) => text.clone(),
        _ => PLACEHOLDER_FEEDBACK.to_string(),
    }
}
