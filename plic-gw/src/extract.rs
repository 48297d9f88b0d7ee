//! JSON extraction from free-form model replies
//!
//! Models are asked to return bare JSON but often wrap it in a fenced code
//! block or add a sentence before it. Extraction tries an ordered list of
//! strategies; the first one whose candidate text parses as a JSON object
//! wins. Candidates are never merged across strategies.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Matches a ```json fenced block (tag optional, case-insensitive)
static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```(?:json)?\s*(.*?)\s*```").expect("fenced block regex"));

/// One way of locating JSON inside a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Contents of the first fenced code block
    FencedBlock,
    /// From the first `{` to the last `}`
    BraceSpan,
    /// The whole reply, trimmed
    WholeReply,
}

impl Strategy {
    /// Strategies in the order they are tried
    pub const ORDER: [Strategy; 3] = [Strategy::FencedBlock, Strategy::BraceSpan, Strategy::WholeReply];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::FencedBlock => "fenced_block",
            Strategy::BraceSpan => "brace_span",
            Strategy::WholeReply => "whole_reply",
        }
    }

    /// Candidate text this strategy would parse, if it finds any
    pub fn candidate<'a>(&self, reply: &'a str) -> Option<&'a str> {
        match self {
            Strategy::FencedBlock => FENCED_BLOCK
                .captures(reply)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str()),
            Strategy::BraceSpan => {
                let start = reply.find('{')?;
                let end = reply.rfind('}')?;
                (end > start).then(|| &reply[start..=end])
            }
            Strategy::WholeReply => {
                let trimmed = reply.trim();
                (!trimmed.is_empty()).then_some(trimmed)
            }
        }
    }

    /// Parse this strategy's candidate as a JSON object
    pub fn apply(&self, reply: &str) -> Option<Map<String, Value>> {
        let candidate = self.candidate(reply)?;
        match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(object)) => Some(object),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(strategy = self.name(), error = %e, "Extraction candidate did not parse");
                None
            }
        }
    }
}

/// A JSON object recovered from a reply, with the strategy that found it
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub strategy: Strategy,
    pub object: Map<String, Value>,
}

/// Locate the JSON object in a model reply
///
/// Returns `None` if no strategy yields a JSON object.
pub fn extract_json_object(reply: &str) -> Option<Extracted> {
    Strategy::ORDER.iter().find_map(|strategy| {
        strategy.apply(reply).map(|object| Extracted {
            strategy: *strategy,
            object,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PAYLOAD: &str = r#"{"hasIssues": false, "issues": [], "overallSummary": "ok"}"#;

    fn expected() -> Map<String, Value> {
        match json!({"hasIssues": false, "issues": [], "overallSummary": "ok"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_fenced_block() {
        let reply = format!("```json\n{}\n```", PAYLOAD);
        let extracted = extract_json_object(&reply).unwrap();
        assert_eq!(extracted.strategy, Strategy::FencedBlock);
        assert_eq!(extracted.object, expected());
    }

    #[test]
    fn test_bare_object() {
        let extracted = extract_json_object(PAYLOAD).unwrap();
        assert_eq!(extracted.strategy, Strategy::BraceSpan);
        assert_eq!(extracted.object, expected());
    }

    #[test]
    fn test_leading_prose() {
        let reply = format!("Here is my review of the image:\n\n{}", PAYLOAD);
        let extracted = extract_json_object(&reply).unwrap();
        assert_eq!(extracted.object, expected());
    }

    #[test]
    fn test_all_shapes_agree() {
        let shapes = [
            format!("```json\n{}\n```", PAYLOAD),
            PAYLOAD.to_string(),
            format!("Analysis complete. {}", PAYLOAD),
        ];
        let objects: Vec<_> = shapes
            .iter()
            .map(|s| extract_json_object(s).unwrap().object)
            .collect();
        assert!(objects.iter().all(|o| *o == objects[0]));
    }

    #[test]
    fn test_unlabelled_fence_and_trailing_prose() {
        let reply = format!("```\n{}\n```\nLet me know if you need more.", PAYLOAD);
        let extracted = extract_json_object(&reply).unwrap();
        assert_eq!(extracted.strategy, Strategy::FencedBlock);
        assert_eq!(extracted.object, expected());
    }

    #[test]
    fn test_non_json_fence_falls_through_to_brace_span() {
        let reply = format!("```text\nchecked 4 dimensions\n```\n{}", PAYLOAD);
        let extracted = extract_json_object(&reply).unwrap();
        assert_eq!(extracted.strategy, Strategy::BraceSpan);
    }

    #[test]
    fn test_nested_braces_in_strings() {
        let reply = r#"Result: {"hasIssues": true, "issues": [{"type": "design", "severity": "low", "description": "uses {curly} text", "suggestion": "none"}], "overallSummary": "minor"}"#;
        let extracted = extract_json_object(reply).unwrap();
        assert_eq!(extracted.object["hasIssues"], json!(true));
        assert_eq!(extracted.object["issues"][0]["description"], "uses {curly} text");
    }

    #[test]
    fn test_no_json() {
        assert!(extract_json_object("I cannot analyze this image.").is_none());
        assert!(extract_json_object("").is_none());
        assert!(extract_json_object("{ not json at all }").is_none());
    }

    #[test]
    fn test_array_is_not_an_object() {
        assert!(extract_json_object("[1, 2, 3]").is_none());
    }
}
