//! Analysis request/response data model
//!
//! Wire names follow the browser contract (camelCase). Findings are produced
//! by the external model only; nothing here synthesizes or edits them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::image_ref::ImageReference;
use crate::{Error, Result};

// ========================================
// Request Types
// ========================================

/// Where the submitted image came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    /// Uploaded bytes, sent inline as a data URL
    File,
    /// Remote URL typed by the user
    Url,
}

impl ImageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSource::File => "file",
            ImageSource::Url => "url",
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "file" => Ok(ImageSource::File),
            "url" => Ok(ImageSource::Url),
            other => Err(Error::InvalidInput(format!(
                "source must be \"file\" or \"url\" (got {:?})",
                other
            ))),
        }
    }
}

/// Analysis request as submitted by the browser
///
/// Fields stay raw strings so that every malformed submission is reported as
/// an input error by the gateway rather than rejected by the deserializer.
/// The legacy names `imageSource`, `imageData` and `fileName` are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// `"file"` or `"url"`
    #[serde(default, alias = "imageSource")]
    pub source: String,

    /// Data URL (file source) or image URL (url source)
    #[serde(default, alias = "imageData")]
    pub encoded_image_or_url: String,

    /// Original file name, shown back in the result
    #[serde(default, alias = "fileName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl AnalysisRequest {
    pub fn from_file(data_url: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            source: ImageSource::File.as_str().to_string(),
            encoded_image_or_url: data_url.into(),
            display_name,
        }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            source: ImageSource::Url.as_str().to_string(),
            encoded_image_or_url: url.into(),
            display_name: None,
        }
    }

    /// Validate the request into a typed source and image reference.
    ///
    /// Performs no I/O.
    pub fn resolve(&self) -> Result<(ImageSource, ImageReference)> {
        if self.source.is_empty() || self.encoded_image_or_url.is_empty() {
            return Err(Error::InvalidInput(
                "Missing required fields: source and encodedImageOrUrl".to_string(),
            ));
        }

        let source: ImageSource = self.source.parse()?;
        let image = match source {
            ImageSource::File => ImageReference::parse_inline(&self.encoded_image_or_url)?,
            ImageSource::Url => ImageReference::parse_remote(&self.encoded_image_or_url)?,
        };

        Ok((source, image))
    }

    /// Name reported in `imageInfo.fileName`
    pub fn file_name(&self, source: ImageSource) -> String {
        match (&self.display_name, source) {
            (Some(name), _) if !name.trim().is_empty() => name.clone(),
            (_, ImageSource::Url) => self.encoded_image_or_url.clone(),
            (_, ImageSource::File) => "uploaded-image".to_string(),
        }
    }
}

// ========================================
// Finding Types
// ========================================

/// Review dimension a finding belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    #[serde(alias = "Language")]
    Language,
    #[serde(alias = "Design")]
    Design,
    #[serde(alias = "Religious")]
    Religious,
    #[serde(alias = "Cultural")]
    Cultural,
}

impl IssueType {
    pub const ALL: [IssueType; 4] = [
        IssueType::Language,
        IssueType::Design,
        IssueType::Religious,
        IssueType::Cultural,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Language => "language",
            IssueType::Design => "design",
            IssueType::Religious => "religious",
            IssueType::Cultural => "cultural",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            IssueType::Language => "Language",
            IssueType::Design => "Design style",
            IssueType::Religious => "Religious taboo",
            IssueType::Cultural => "Cultural sensitivity",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            IssueType::Language => "📝",
            IssueType::Design => "🎨",
            IssueType::Religious => "🕌",
            IssueType::Cultural => "🌍",
        }
    }
}

/// Finding severity
///
/// Ordering follows [`Severity::rank`]: `High < Medium < Low`, so an
/// ascending sort puts the most severe findings first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[serde(alias = "High")]
    High,
    #[serde(alias = "Medium")]
    Medium,
    #[serde(alias = "Low")]
    Low,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    /// Explicit sort rank (high=0, medium=1, low=2)
    pub const fn rank(&self) -> u8 {
        match self {
            Severity::High => 0,
            Severity::Medium => 1,
            Severity::Low => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }

    /// Badge colour (CSS hex)
    pub fn color(&self) -> &'static str {
        match self {
            Severity::High => "#ef4444",
            Severity::Medium => "#f59e0b",
            Severity::Low => "#10b981",
        }
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A single localization issue reported by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: Severity,
    pub description: String,
    pub suggestion: String,
}

/// Findings in display order: by severity rank, input order kept for ties
pub fn findings_by_severity(findings: &[Finding]) -> Vec<&Finding> {
    let mut ordered: Vec<&Finding> = findings.iter().collect();
    ordered.sort_by_key(|f| f.severity.rank());
    ordered
}

// ========================================
// Result Types
// ========================================

/// Metadata describing the analyzed image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub source: ImageSource,
    pub file_name: String,
}

/// Final analysis result returned to the browser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Always `true`; errors use a separate body shape
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    pub image_info: ImageInfo,
    pub has_issues: bool,
    pub issues: Vec<Finding>,
    pub overall_summary: String,
}

impl AnalysisResult {
    /// Issues in display order
    pub fn issues_by_severity(&self) -> Vec<&Finding> {
        findings_by_severity(&self.issues)
    }
}

// ========================================
// Tests
// ========================================

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(severity: Severity, description: &str) -> Finding {
        Finding {
            issue_type: IssueType::Design,
            severity,
            description: description.to_string(),
            suggestion: String::new(),
        }
    }

    #[test]
    fn test_severity_rank_order() {
        assert_eq!(Severity::High.rank(), 0);
        assert_eq!(Severity::Medium.rank(), 1);
        assert_eq!(Severity::Low.rank(), 2);
        assert!(Severity::High < Severity::Medium);
        assert!(Severity::Medium < Severity::Low);
    }

    #[test]
    fn test_findings_sorted_by_severity() {
        let findings = vec![
            finding(Severity::Low, "a"),
            finding(Severity::High, "b"),
            finding(Severity::Medium, "c"),
        ];

        let ordered: Vec<Severity> = findings_by_severity(&findings)
            .iter()
            .map(|f| f.severity)
            .collect();
        assert_eq!(ordered, vec![Severity::High, Severity::Medium, Severity::Low]);
    }

    #[test]
    fn test_findings_sort_is_stable() {
        let findings = vec![
            finding(Severity::Medium, "first"),
            finding(Severity::High, "second"),
            finding(Severity::Medium, "third"),
            finding(Severity::High, "fourth"),
        ];

        let ordered: Vec<&str> = findings_by_severity(&findings)
            .iter()
            .map(|f| f.description.as_str())
            .collect();
        assert_eq!(ordered, vec!["second", "fourth", "first", "third"]);
    }

    #[test]
    fn test_finding_deserialization() {
        let json = r#"{"type": "religious", "severity": "High", "description": "Alcohol shown", "suggestion": "Replace with lassi"}"#;
        let f: Finding = serde_json::from_str(json).unwrap();

        assert_eq!(f.issue_type, IssueType::Religious);
        assert_eq!(f.severity, Severity::High);
        assert_eq!(f.suggestion, "Replace with lassi");
    }

    #[test]
    fn test_finding_rejects_unknown_severity() {
        let json = r#"{"type": "design", "severity": "critical", "description": "x", "suggestion": "y"}"#;
        assert!(serde_json::from_str::<Finding>(json).is_err());
    }

    #[test]
    fn test_finding_requires_suggestion() {
        let json = r#"{"type": "design", "severity": "low", "description": "Low contrast"}"#;
        assert!(serde_json::from_str::<Finding>(json).is_err());
    }

    #[test]
    fn test_request_accepts_legacy_field_names() {
        let json = r#"{"imageSource": "url", "imageData": "https://example.com/a.png", "fileName": "a.png"}"#;
        let request: AnalysisRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.source, "url");
        assert_eq!(request.encoded_image_or_url, "https://example.com/a.png");
        assert_eq!(request.display_name.as_deref(), Some("a.png"));
    }

    #[test]
    fn test_request_resolve_rejects_unknown_source() {
        let request = AnalysisRequest {
            source: "clipboard".to_string(),
            encoded_image_or_url: "https://example.com/a.png".to_string(),
            display_name: None,
        };
        let err = request.resolve().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_request_resolve_rejects_missing_data() {
        let request = AnalysisRequest {
            source: "file".to_string(),
            ..Default::default()
        };
        assert!(request.resolve().is_err());
    }

    #[test]
    fn test_file_name_defaults() {
        let url_request = AnalysisRequest::from_url("https://example.com/banner.jpg");
        assert_eq!(url_request.file_name(ImageSource::Url), "https://example.com/banner.jpg");

        let file_request = AnalysisRequest::from_file("data:image/png;base64,AAAA", None);
        assert_eq!(file_request.file_name(ImageSource::File), "uploaded-image");

        let named = AnalysisRequest::from_file("data:image/png;base64,AAAA", Some("poster.png".to_string()));
        assert_eq!(named.file_name(ImageSource::File), "poster.png");
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = AnalysisResult {
            success: true,
            timestamp: Utc::now(),
            image_info: ImageInfo {
                source: ImageSource::File,
                file_name: "poster.png".to_string(),
            },
            has_issues: false,
            issues: vec![],
            overall_summary: "ok".to_string(),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["hasIssues"], false);
        assert_eq!(json["overallSummary"], "ok");
        assert_eq!(json["imageInfo"]["source"], "file");
        assert_eq!(json["imageInfo"]["fileName"], "poster.png");
        assert!(json["issues"].as_array().unwrap().is_empty());
    }
}
