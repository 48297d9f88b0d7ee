//! Display catalog for the UI
//!
//! GET /api/catalog returns issue-type and severity labels plus the upload
//! limits, so the page renders from the same definitions the server uses.

use axum::Json;
use plic_common::{IssueType, Severity};
use serde::Serialize;

use crate::presentation::{ACCEPTED_UPLOAD_TYPES, MAX_UPLOAD_BYTES};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub issue_types: Vec<IssueTypeEntry>,
    pub severities: Vec<SeverityEntry>,
    pub upload: UploadLimits,
}

#[derive(Debug, Serialize)]
pub struct IssueTypeEntry {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SeverityEntry {
    pub id: &'static str,
    pub label: &'static str,
    pub color: &'static str,
    pub rank: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadLimits {
    pub accepted_types: Vec<&'static str>,
    pub max_bytes: usize,
}

/// GET /api/catalog
pub async fn get_catalog() -> Json<Catalog> {
    Json(Catalog {
        issue_types: IssueType::ALL
            .iter()
            .map(|t| IssueTypeEntry {
                id: t.as_str(),
                label: t.label(),
                icon: t.icon(),
            })
            .collect(),
        severities: Severity::ALL
            .iter()
            .map(|s| SeverityEntry {
                id: s.as_str(),
                label: s.label(),
                color: s.color(),
                rank: s.rank(),
            })
            .collect(),
        upload: UploadLimits {
            accepted_types: ACCEPTED_UPLOAD_TYPES.to_vec(),
            max_bytes: MAX_UPLOAD_BYTES,
        },
    })
}
