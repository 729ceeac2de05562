use serde_json::Value;

use super::domain::{ScreeningVerdict, Verdict};

/// Raised when provider output cannot be reduced to a well-formed verdict.
///
/// The normalizer never retries; the cascade treats this as cause to advance
/// to the next provider.
#[derive(Debug, thiserror::Error)]
pub enum MalformedResponse {
    #[error("provider output is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("provider output is not a JSON object")]
    NotAnObject,
    #[error("provider output is missing required field '{0}'")]
    MissingField(&'static str),
    #[error("provider returned unknown result '{0}'")]
    UnknownResult(String),
    #[error("provider field '{field}' is not numeric: {found}")]
    NotNumeric { field: &'static str, found: String },
}

/// Extract a well-formed verdict from raw provider output, tolerating
/// code-fence wrapping and stray whitespace.
pub fn normalize_verdict(raw: &str) -> Result<ScreeningVerdict, MalformedResponse> {
    let stripped = strip_wrapping(raw);
    let value: Value = serde_json::from_str(stripped)?;
    let object = value.as_object().ok_or(MalformedResponse::NotAnObject)?;

    let result_raw = object
        .get("result")
        .and_then(Value::as_str)
        .ok_or(MalformedResponse::MissingField("result"))?;
    let result = Verdict::from_label(result_raw)
        .ok_or_else(|| MalformedResponse::UnknownResult(result_raw.to_string()))?;

    let reason = object
        .get("reason")
        .and_then(Value::as_str)
        .ok_or(MalformedResponse::MissingField("reason"))?
        .to_string();

    let confidence = numeric_field(object, "confidence")?;
    let job_fit_score = numeric_field(object, "jobFitScore")?;

    Ok(ScreeningVerdict {
        result,
        reason,
        confidence,
        job_fit_score,
    })
}

/// Coerce a JSON number or numeric string. Out-of-range values pass through
/// unclamped.
fn numeric_field(
    object: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<f64, MalformedResponse> {
    let value = object
        .get(field)
        .ok_or(MalformedResponse::MissingField(field))?;
    match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| MalformedResponse::NotNumeric {
                field,
                found: number.to_string(),
            }),
        Value::String(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| MalformedResponse::NotNumeric {
                field,
                found: raw.clone(),
            }),
        other => Err(MalformedResponse::NotNumeric {
            field,
            found: other.to_string(),
        }),
    }
}

/// Drop incidental code-fence markers some providers wrap around JSON output.
fn strip_wrapping(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}
