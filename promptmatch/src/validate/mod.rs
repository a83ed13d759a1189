//! Request validation.
//!
//! [`validate`] is the strict path used by the service: it stops at the first
//! problem and reports a [`MatchError`]. Structural checks always run to
//! completion before any vocabulary check, so a request with a missing field
//! and an unknown situation reports [`MatchError::MissingData`].
//!
//! [`inspect`] runs the same checks without short-circuiting and collects
//! readable messages for diagnostics.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::{Config, Vocabulary};
use crate::error::MatchError;

/// Keys every request object must carry.
pub const REQUIRED_FIELDS: [&str; 4] = ["situation", "level", "file_type", "data"];

/// Keys that must be non-blank strings drawn from a vocabulary.
pub const CATEGORICAL_FIELDS: [&str; 3] = ["situation", "level", "file_type"];

/// A validated, normalized match request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRequest {
    /// Trimmed situation.
    pub situation: String,
    /// Trimmed level.
    pub level: String,
    /// Trimmed file type.
    pub file_type: String,
    /// Free-form payload, capped but not trimmed. `None` when sent as null.
    pub data: Option<String>,
}

#[derive(Deserialize)]
struct RawRequest {
    situation: String,
    level: String,
    file_type: String,
    #[serde(default)]
    data: Option<String>,
}

/// Validate a decoded request against the configuration.
pub fn validate(value: &Value, cfg: &Config) -> Result<MatchRequest, MatchError> {
    let req = validate_structure(value, cfg.max_data_length)?;
    validate_values(&req, &cfg.vocabulary)?;
    Ok(req)
}

/// Check shape and types, returning the normalized request.
pub fn validate_structure(value: &Value, max_data_length: usize) -> Result<MatchRequest, MatchError> {
    let Some(obj) = value.as_object() else {
        warn!(got = type_name(value), "request is not an object");
        return Err(MatchError::MissingData);
    };

    let missing = missing_fields(obj, &REQUIRED_FIELDS);
    if !missing.is_empty() {
        warn!(?missing, "missing fields");
        return Err(MatchError::MissingData);
    }

    for field in CATEGORICAL_FIELDS {
        match obj.get(field) {
            None | Some(Value::Null) => {
                warn!(field, "null value");
                return Err(MatchError::MissingData);
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                warn!(field, "empty or whitespace-only value");
                return Err(MatchError::MissingData);
            }
            Some(Value::String(_)) => {}
            Some(other) => {
                warn!(field, got = type_name(other), "expected string");
                return Err(MatchError::MissingData);
            }
        }
    }

    match obj.get("data") {
        None | Some(Value::Null) | Some(Value::String(_)) => {}
        Some(other) => {
            warn!(field = "data", got = type_name(other), "expected string");
            return Err(MatchError::MissingData);
        }
    }

    let raw = RawRequest::deserialize(value).map_err(|e| {
        warn!(error = %e, "request does not map onto a match request");
        MatchError::InvalidFormat
    })?;

    Ok(MatchRequest {
        situation: raw.situation.trim().to_string(),
        level: raw.level.trim().to_string(),
        file_type: raw.file_type.trim().to_string(),
        data: raw.data.map(|d| cap_chars(&d, max_data_length).to_string()),
    })
}

/// Check each categorical field against its vocabulary.
pub fn validate_values(req: &MatchRequest, vocab: &Vocabulary) -> Result<(), MatchError> {
    if !vocab.has_situation(&req.situation) {
        warn!(situation = %req.situation, "invalid situation");
        return Err(MatchError::InvalidPrompt);
    }
    if !vocab.has_level(&req.level) {
        warn!(level = %req.level, "invalid level");
        return Err(MatchError::InvalidPrompt);
    }
    if !vocab.has_file_type(&req.file_type) {
        warn!(file_type = %req.file_type, "invalid file_type");
        return Err(MatchError::InvalidPrompt);
    }
    debug!(
        situation = %req.situation,
        level = %req.level,
        file_type = %req.file_type,
        "request fields valid"
    );
    Ok(())
}

/// Aggregated validation result produced by [`inspect`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    /// Fields that passed their checks, normalized.
    pub sanitized: Map<String, Value>,
    /// Prompt id the request resolves to, when fully valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_prompt: Option<String>,
}

/// Run every check and collect all problems instead of stopping at the first.
pub fn inspect(value: &Value, cfg: &Config) -> ValidationReport {
    let mut report = ValidationReport::default();

    let Some(obj) = value.as_object() else {
        report
            .errors
            .push(format!("request must be a JSON object, got {}", type_name(value)));
        return report;
    };

    let missing = missing_fields(obj, &REQUIRED_FIELDS);
    if !missing.is_empty() {
        report
            .errors
            .push(format!("missing required fields: {}", missing.join(", ")));
    }

    let vocab = &cfg.vocabulary;
    for field in CATEGORICAL_FIELDS {
        let Some(v) = obj.get(field) else { continue };
        let Some(s) = v.as_str() else {
            report
                .errors
                .push(format!("field {field} must be a string, got {}", type_name(v)));
            continue;
        };
        if !is_valid_string(v, false) {
            report.errors.push(format!("field {field} cannot be empty"));
            continue;
        }

        let s = sanitize(s, None);
        let allowed = match field {
            "situation" => &vocab.situations,
            "level" => &vocab.levels,
            _ => &vocab.file_types,
        };
        if !allowed.contains(&s) {
            report.errors.push(format!(
                "invalid value for {field}: {s:?} (allowed: {})",
                allowed.join(", ")
            ));
        }
        report.sanitized.insert(field.to_string(), Value::String(s));
    }

    match obj.get("data") {
        None => {}
        Some(Value::Null) => {
            report.sanitized.insert("data".to_string(), Value::Null);
        }
        Some(Value::String(d)) => {
            let capped = cap_chars(d, cfg.max_data_length).to_string();
            report.sanitized.insert("data".to_string(), Value::String(capped));
        }
        Some(other) => report
            .errors
            .push(format!("field data must be a string, got {}", type_name(other))),
    }

    if report.errors.is_empty() {
        let field = |k: &str| {
            report
                .sanitized
                .get(k)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let (situation, level, file_type) = (field("situation"), field("level"), field("file_type"));
        match cfg.table.lookup(&situation, &level, &file_type) {
            Some(c) => report.matched_prompt = Some(c.id.clone()),
            None => report.errors.push(format!(
                "no prompt for combination: situation={situation:?}, level={level:?}, file_type={file_type:?}"
            )),
        }
    }

    report.is_valid = report.errors.is_empty();
    report
}

/// Whether the value is a string, and non-blank unless `allow_empty`.
pub fn is_valid_string(value: &Value, allow_empty: bool) -> bool {
    match value.as_str() {
        Some(s) => allow_empty || !s.trim().is_empty(),
        None => false,
    }
}

/// Required keys absent from the object, in the order given.
pub fn missing_fields<'a>(obj: &Map<String, Value>, required: &[&'a str]) -> Vec<&'a str> {
    required
        .iter()
        .copied()
        .filter(|f| !obj.contains_key(*f))
        .collect()
}

/// Trim whitespace and optionally cap the length in characters.
pub fn sanitize(value: &str, max_length: Option<usize>) -> String {
    let trimmed = value.trim();
    match max_length {
        Some(max) => cap_chars(trimmed, max).to_string(),
        None => trimmed.to_string(),
    }
}

/// Longest prefix of `s` holding at most `max` characters.
pub fn cap_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests;
