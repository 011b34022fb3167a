//! Parsing of LLM scoring responses.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::controller::validate_score;
use crate::error::{ErrorCode, StrataError, StrataResult};

static CODE_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[a-zA-Z0-9]*\s*([\s\S]*?)\s*```").expect("valid regex"));
static THINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("valid regex"));
static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+(?:\.\d+)?$").expect("valid regex"));

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    score: f64,
}

/// Strip reasoning tags and code fences from a model response.
pub fn clean_response(content: &str) -> String {
    let content = THINK_RE.replace_all(content, "");
    let content = content.trim();

    match CODE_BLOCK_RE.captures(content).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim().to_string(),
        None => content.to_string(),
    }
}

/// Parse an importance score from a model response.
///
/// Accepts `{"score": N}` or a bare number. Anything else, including a
/// value outside 0-100, is a scoring error.
pub fn parse_score(response: &str) -> StrataResult<f64> {
    let cleaned = clean_response(response);
    if cleaned.is_empty() {
        return Err(StrataError::scoring_with_code(
            "oracle returned an empty response",
            ErrorCode::ScoreInvalidOutput,
        ));
    }

    let score = if NUMBER_RE.is_match(&cleaned) {
        cleaned.parse::<f64>().map_err(|e| {
            StrataError::scoring_with_code(
                format!("invalid score '{}': {}", cleaned, e),
                ErrorCode::ScoreInvalidOutput,
            )
        })?
    } else {
        serde_json::from_str::<ScoreResponse>(&cleaned)
            .map_err(|e| {
                StrataError::scoring_with_code(
                    format!("failed to parse score JSON: {}", e),
                    ErrorCode::ScoreInvalidOutput,
                )
            })?
            .score
    };

    validate_score(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_score() {
        assert_eq!(parse_score(r#"{"score": 42}"#).unwrap(), 42.0);
        assert_eq!(parse_score(r#"{"score": 87.5}"#).unwrap(), 87.5);
    }

    #[test]
    fn test_parse_fenced_and_think_wrapped() {
        let response = "<think>\nthe user mentions an allergy\n</think>\n```json\n{\"score\": 95}\n```";
        assert_eq!(parse_score(response).unwrap(), 95.0);
    }

    #[test]
    fn test_parse_bare_number() {
        assert_eq!(parse_score(" 15 ").unwrap(), 15.0);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = parse_score(r#"{"score": 150}"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ScoreOutOfRange);
        assert!(parse_score("-3").is_err());
    }

    #[test]
    fn test_rejects_prose() {
        let err = parse_score("This seems fairly important.").unwrap_err();
        assert!(err.is_scoring());
        assert_eq!(err.code(), ErrorCode::ScoreInvalidOutput);
        assert!(parse_score("").is_err());
    }
}
