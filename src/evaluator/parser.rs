// src/evaluator/parser.rs — Parse judge responses into (feedback, score) pairs

use serde_json::Value;

use crate::core::types::{Dimension, DimensionFeedback, SCORE_MAX};
use crate::infra::errors::RedraftError;
use crate::util::truncate_str;

/// Parse a judge reply of the form `{"feedback": "...", "score": 7.5}`.
///
/// The object may be surrounded by prose or code fences. A reply that is
/// itself a quoted JSON string is unwrapped exactly once before the final
/// decode; a value that is still a string after that is rejected.
pub fn parse_judge_response(
    dimension: Dimension,
    raw: &str,
) -> Result<DimensionFeedback, RedraftError> {
    let malformed = |reason: String| RedraftError::malformed(dimension.as_str(), reason, raw);

    let trimmed = raw.trim();
    let candidate = if is_string_literal(trimmed) {
        trimmed
    } else {
        extract_object(trimmed).ok_or_else(|| malformed("no JSON object found".into()))?
    };
    let value = decode(candidate).map_err(malformed)?;

    let verdict = to_verdict(value).map_err(malformed)?;
    if !(0.0..=SCORE_MAX).contains(&verdict.score) {
        tracing::warn!(
            dimension = %dimension,
            score = verdict.score,
            "Judge returned a score outside 0-10"
        );
    }
    Ok(verdict)
}

/// Render a verdict as a quoted, escaped JSON string: the double-encoded
/// shape some models produce.
pub fn render_as_text(verdict: &DimensionFeedback) -> String {
    let object = serde_json::json!({
        "feedback": verdict.feedback,
        "score": verdict.score,
    })
    .to_string();
    Value::String(object).to_string()
}

/// Whether the whole reply is a single JSON string literal.
fn is_string_literal(text: &str) -> bool {
    text.starts_with('"') && serde_json::from_str::<String>(text).is_ok()
}

/// Greedy span from the first `{` to the last `}`.
pub(crate) fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Decode JSON; a string result gets exactly one more decode of the object inside it.
fn decode(text: &str) -> Result<Value, String> {
    match decode_value(text)? {
        Value::String(inner) => {
            let object = extract_object(&inner)
                .ok_or_else(|| "quoted reply contains no JSON object".to_string())?;
            match decode_value(object)? {
                Value::String(_) => Err("payload is still a string after one unwrap".into()),
                other => Ok(other),
            }
        }
        other => Ok(other),
    }
}

fn decode_value(text: &str) -> Result<Value, String> {
    serde_json::from_str(text)
        .map_err(|e| format!("invalid JSON ({e}) in: {}", truncate_str(text, 200)))
}

fn to_verdict(value: Value) -> Result<DimensionFeedback, String> {
    let Value::Object(map) = value else {
        return Err(format!("expected a JSON object, got {}", kind(&value)));
    };

    let feedback = match map.get("feedback") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => return Err(format!("`feedback` is {}, not a string", kind(other))),
        None => return Err("missing field `feedback`".into()),
    };

    let score = match map.get("score") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        Some(_) => None,
        None => return Err("missing field `score`".into()),
    }
    .ok_or_else(|| "`score` is not a number".to_string())?;

    Ok(DimensionFeedback { feedback, score })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
