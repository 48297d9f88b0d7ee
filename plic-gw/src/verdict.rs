//! Validation and normalization of the model's JSON payload

use plic_common::Finding;
use serde_json::{Map, Value};

use crate::error::AnalysisError;

/// The model's answer, checked against the output contract
#[derive(Debug, Clone, PartialEq)]
pub struct ModelVerdict {
    pub has_issues: bool,
    pub issues: Vec<Finding>,
    pub overall_summary: String,
}

impl ModelVerdict {
    /// Check an extracted object against the contract
    ///
    /// - `hasIssues` is required and must be boolean-like
    /// - `issues` defaults to empty when absent or null
    /// - `overallSummary` defaults to empty when absent or null
    /// - each finding must carry a known type and severity, a description
    ///   and a suggestion
    pub fn from_object(object: &Map<String, Value>) -> Result<Self, AnalysisError> {
        let has_issues = match object.get("hasIssues") {
            None => {
                return Err(AnalysisError::Parse(
                    "Model reply has no hasIssues field".to_string(),
                ))
            }
            Some(value) => bool_like(value).ok_or_else(|| {
                AnalysisError::Parse(format!("hasIssues is not boolean-like: {}", value))
            })?,
        };

        let issues = match object.get("issues") {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => serde_json::from_value::<Vec<Finding>>(value.clone())
                .map_err(|e| AnalysisError::Parse(format!("Malformed issues list: {}", e)))?,
        };

        let overall_summary = match object.get("overallSummary") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(AnalysisError::Parse(format!(
                    "overallSummary is not a string: {}",
                    other
                )))
            }
        };

        Ok(Self {
            has_issues,
            issues,
            overall_summary,
        })
    }
}

/// Interpret `true`/`false`, `"true"`/`"false"` (any case) and `1`/`0`
fn bool_like(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plic_common::{IssueType, Severity};
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test value must be an object"),
        }
    }

    #[test]
    fn test_missing_has_issues_is_parse_error() {
        let err = ModelVerdict::from_object(&object(json!({"issues": [], "overallSummary": "ok"}))).unwrap_err();
        assert!(matches!(err, AnalysisError::Parse(_)));
    }

    #[test]
    fn test_missing_issues_defaults_to_empty() {
        let verdict = ModelVerdict::from_object(&object(json!({"hasIssues": true, "overallSummary": "see notes"}))).unwrap();
        assert!(verdict.has_issues);
        assert!(verdict.issues.is_empty());
        assert_eq!(verdict.overall_summary, "see notes");
    }

    #[test]
    fn test_null_issues_defaults_to_empty() {
        let verdict = ModelVerdict::from_object(&object(json!({"hasIssues": false, "issues": null}))).unwrap();
        assert!(!verdict.has_issues);
        assert!(verdict.issues.is_empty());
        assert_eq!(verdict.overall_summary, "");
    }

    #[test]
    fn test_bool_like_values() {
        for (value, expected) in [
            (json!(true), true),
            (json!("false"), false),
            (json!("TRUE"), true),
            (json!(1), true),
            (json!(0), false),
        ] {
            let verdict = ModelVerdict::from_object(&object(json!({"hasIssues": value}))).unwrap();
            assert_eq!(verdict.has_issues, expected);
        }

        for value in [json!("maybe"), json!(2), json!([]), json!(null)] {
            assert!(ModelVerdict::from_object(&object(json!({"hasIssues": value}))).is_err());
        }
    }

    #[test]
    fn test_findings_kept_in_order() {
        let verdict = ModelVerdict::from_object(&object(json!({
            "hasIssues": true,
            "issues": [
                {"type": "cultural", "severity": "low", "description": "a", "suggestion": "x"},
                {"type": "religious", "severity": "high", "description": "b", "suggestion": "y"}
            ],
            "overallSummary": "two issues"
        })))
        .unwrap();

        assert_eq!(verdict.issues.len(), 2);
        assert_eq!(verdict.issues[0].issue_type, IssueType::Cultural);
        assert_eq!(verdict.issues[0].severity, Severity::Low);
        assert_eq!(verdict.issues[1].severity, Severity::High);
    }

    #[test]
    fn test_malformed_finding_is_parse_error() {
        let err = ModelVerdict::from_object(&object(json!({
            "hasIssues": true,
            "issues": [{"type": "spelling", "severity": "high", "description": "x", "suggestion": "y"}]
        })))
        .unwrap_err();
        assert!(matches!(err, AnalysisError::Parse(_)));
    }

    #[test]
    fn test_finding_without_suggestion_is_parse_error() {
        let err = ModelVerdict::from_object(&object(json!({
            "hasIssues": true,
            "issues": [{"type": "design", "severity": "low", "description": "Low contrast footer"}],
            "overallSummary": "one issue"
        })))
        .unwrap_err();
        assert!(matches!(err, AnalysisError::Parse(_)));
    }
}
