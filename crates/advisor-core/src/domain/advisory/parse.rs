//! Strict parsing of inference responses
//!
//! Model output is untrusted text. Responses are located inside any code
//! fences, deserialized into typed structs and validated before use; any
//! mismatch is an [`Error::Parse`].

use serde::de::DeserializeOwned;

use super::normalize::normalize;
use crate::error::{Error, Result};

/// Post-deserialization checks for a response type
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Deserialize and validate an inference response
pub fn parse_response<T>(response: &str) -> Result<T>
where
    T: DeserializeOwned + Validate,
{
    let json = extract_json_from_response(response);
    if json.trim().is_empty() {
        return Err(Error::Parse("empty response".to_string()));
    }

    let parsed: T = serde_json::from_str(json)
        .map_err(|e| Error::Parse(format!("{} (response starts with {:?})", e, preview(json))))?;
    parsed.validate()?;
    Ok(parsed)
}

/// Locate the JSON payload in a model response
///
/// Prefers a ```json fenced block, then any fenced block, then the outermost
/// braces. Returns the trimmed input unchanged when none are found.
pub fn extract_json_from_response(response: &str) -> &str {
    if let Some(start) = response.find("```json") {
        let json_start = start + 7;
        if let Some(end) = response[json_start..].find("```") {
            return response[json_start..json_start + end].trim();
        }
    }

    if let Some(start) = response.find("```") {
        let potential_start = start + 3;
        if let Some(newline) = response[potential_start..].find('\n') {
            let json_start = potential_start + newline + 1;
            if let Some(end) = response[json_start..].find("```") {
                return response[json_start..json_start + end].trim();
            }
        }
    }

    let (open, close) = match (response.find('{'), response.find('[')) {
        (Some(brace), Some(bracket)) if bracket < brace => ('[', ']'),
        (None, Some(_)) => ('[', ']'),
        _ => ('{', '}'),
    };

    if let (Some(start), Some(end)) = (response.find(open), response.rfind(close))
        && start < end
    {
        return &response[start..=end];
    }

    response.trim()
}

/// Check a 0-100 confidence value and convert it to an integer score
pub fn confidence_score(value: f64, field: &str) -> Result<u8> {
    let checked = confidence(value, field)?;
    Ok(checked.round() as u8)
}

/// Check a 0-100 confidence value
pub fn confidence(value: f64, field: &str) -> Result<f32> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(Error::Parse(format!(
            "{} must be within 0-100, got {}",
            field, value
        )));
    }
    Ok(value as f32)
}

/// Reject names that would give an empty node id
pub fn require_name(name: &str, field: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Parse(format!("{} has an empty name", field)));
    }
    if normalize(name).is_empty() {
        return Err(Error::Parse(format!(
            "{} name {:?} has no letters or digits",
            field, name
        )));
    }
    Ok(())
}

fn preview(text: &str) -> String {
    text.chars().take(40).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Entry {
        name: String,
        confidence: f64,
    }

    impl Validate for Entry {
        fn validate(&self) -> Result<()> {
            require_name(&self.name, "entry")?;
            confidence(self.confidence, "entry.confidence")?;
            Ok(())
        }
    }

    #[test]
    fn test_extract_from_json_fence() {
        let response = "Here you go:\n```json\n{\"a\": 1}\n```\nThanks";
        assert_eq!(extract_json_from_response(response), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_from_plain_fence() {
        let response = "```\n{\"a\": 2}\n```";
        assert_eq!(extract_json_from_response(response), "{\"a\": 2}");
    }

    #[test]
    fn test_extract_from_surrounding_prose() {
        let response = "Sure! {\"a\": {\"b\": 3}} Hope that helps.";
        assert_eq!(extract_json_from_response(response), "{\"a\": {\"b\": 3}}");
    }

    #[test]
    fn test_extract_bare_array() {
        let response = "Tools: [{\"name\": \"a\"}, {\"name\": \"b\"}] done";
        assert_eq!(
            extract_json_from_response(response),
            "[{\"name\": \"a\"}, {\"name\": \"b\"}]"
        );
    }

    #[test]
    fn test_extract_without_json() {
        assert_eq!(extract_json_from_response("  nothing here "), "nothing here");
        assert_eq!(extract_json_from_response("} backwards {"), "} backwards {");
    }

    #[test]
    fn test_parse_response_accepts_valid_payload() {
        let entry: Entry = parse_response("```json\n{\"name\": \"x\", \"confidence\": 80}\n```").unwrap();
        assert_eq!(entry.name, "x");
    }

    #[test]
    fn test_parse_response_rejects_bad_payloads() {
        for bad in [
            "",
            "not json at all",
            "{\"name\": \"x\"}",
            "{\"name\": \"\", \"confidence\": 50}",
            "{\"name\": \"x\", \"confidence\": 140}",
            "{\"name\": \"x\", \"confidence\": -1}",
        ] {
            let err = parse_response::<Entry>(bad).unwrap_err();
            assert!(matches!(err, Error::Parse(_)), "expected parse error for {:?}", bad);
        }
    }

    #[test]
    fn test_require_name_needs_an_id() {
        assert!(require_name("Late invoices", "pain point").is_ok());
        assert!(require_name("  ", "pain point").is_err());
        let err = require_name("!!!", "pain point").unwrap_err();
        assert!(matches!(&err, Error::Parse(msg) if msg.contains("no letters or digits")));
    }

    #[test]
    fn test_confidence_score_rounds() {
        assert_eq!(confidence_score(84.6, "c").unwrap(), 85);
        assert_eq!(confidence_score(0.0, "c").unwrap(), 0);
        assert!(confidence_score(f64::NAN, "c").is_err());
    }
}
