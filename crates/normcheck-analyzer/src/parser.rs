//! Strict decoding of classifier output
//!
//! The classifier answers in free-form text that is expected to contain
//! exactly one JSON object. Parsing locates the first brace-delimited object
//! (tolerating surrounding prose and markdown fences), decodes it, and
//! coerces the fields into a well-typed verdict. Anything malformed becomes
//! a tagged [`ClassifierOutcome::Fallback`]; this path must never fail.

use normcheck_domain::RiskLabel;
use serde_json::Value;
use tracing::warn;

/// A well-typed classifier verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierVerdict {
    /// Compliant or risky
    pub label: RiskLabel,

    /// Short explanation from the model
    pub comment: String,

    /// The correct position under the cited norms
    pub correct_position: String,

    /// Zero-based indices into the candidate norm list. Values are
    /// list-validated here; range validation happens at the mapping site.
    pub source_indices: Vec<usize>,
}

/// Outcome of decoding one classifier response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifierOutcome {
    /// The response contained a decodable verdict object
    Parsed(ClassifierVerdict),

    /// The response was malformed; callers substitute the conservative
    /// fallback verdict
    Fallback {
        /// What went wrong, for logging
        reason: String,
    },
}

/// Decode a raw classifier response.
pub fn parse_classifier_response(raw: &str) -> ClassifierOutcome {
    let Some(object_str) = extract_json_object(raw) else {
        warn!("classifier response contains no JSON object");
        return ClassifierOutcome::Fallback {
            reason: "no JSON object in response".to_string(),
        };
    };

    let value: Value = match serde_json::from_str(object_str) {
        Ok(value) => value,
        Err(err) => {
            warn!("classifier response is not valid JSON: {}", err);
            return ClassifierOutcome::Fallback {
                reason: format!("invalid JSON: {err}"),
            };
        }
    };

    let Some(object) = value.as_object() else {
        return ClassifierOutcome::Fallback {
            reason: "JSON value is not an object".to_string(),
        };
    };

    let label = object
        .get("label")
        .and_then(Value::as_str)
        .map(RiskLabel::from_model_output)
        .unwrap_or(RiskLabel::Ok);

    let comment = object
        .get("comment")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let correct_position = object
        .get("correct_position")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    // Anything that is not a list of non-negative integers degrades to an
    // empty selection; range checks against the candidate list happen at
    // the mapping site.
    let source_indices = object
        .get("source_indices")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(|v| v.as_u64().map(|n| n as usize))
                .collect()
        })
        .unwrap_or_default();

    ClassifierOutcome::Parsed(ClassifierVerdict {
        label,
        comment,
        correct_position,
        source_indices,
    })
}

/// Locate the first balanced brace-delimited object in `raw`.
///
/// Tracks JSON string boundaries so braces inside string values do not
/// unbalance the scan.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let bytes = raw.as_bytes();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}
