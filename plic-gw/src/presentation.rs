//! Presentation model for the single-page UI
//!
//! Holds the rules the browser page follows, in testable form:
//! - intake validation (accepted types, size limit, typed URL)
//! - a single analysis in flight per session
//! - findings rendered by severity rank
//! - reset back to the initial state
//!
//! The page served by [`crate::api::ui`] mirrors this behavior in JavaScript
//! and reads the limits from `GET /api/catalog`.

use async_trait::async_trait;
use plic_common::analysis::findings_by_severity;
use plic_common::{AnalysisRequest, AnalysisResult, Finding, ImageReference, MediaType};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::error::AnalysisError;
use crate::gateway::AnalysisGateway;

/// MIME types the upload control accepts
pub const ACCEPTED_UPLOAD_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/jpg", "image/webp"];

/// Largest accepted upload (10 MiB)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Client-side intake failures, reported before any analysis call
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntakeError {
    #[error("Only PNG, JPEG, JPG and WebP images are supported")]
    UnsupportedType(String),

    #[error("Image is larger than 10 MB ({size} bytes)")]
    TooLarge { size: usize },

    #[error("File content does not match its type ({declared})")]
    ContentMismatch { declared: String },

    #[error("Please enter an image URL")]
    EmptyUrl,

    #[error("Please enter a valid image URL")]
    InvalidUrl,

    #[error("Please upload or enter an image first")]
    NothingSelected,
}

/// Image chosen by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Upload {
        file_name: String,
        image: ImageReference,
    },
    Link {
        url: String,
    },
}

impl Selection {
    /// Source for the preview `<img>`
    pub fn preview(&self) -> &str {
        match self {
            Selection::Upload { image, .. } => image.as_provider_url(),
            Selection::Link { url } => url,
        }
    }

    pub fn to_request(&self) -> AnalysisRequest {
        match self {
            Selection::Upload { file_name, image } => {
                AnalysisRequest::from_file(image.as_provider_url(), Some(file_name.clone()))
            }
            Selection::Link { url } => AnalysisRequest::from_url(url.clone()),
        }
    }
}

/// Validate an uploaded file and encode it for analysis
///
/// The declared type must be accepted, the size bounded, and the magic bytes
/// must agree with the declared type.
pub fn intake_file(file_name: &str, declared_type: &str, bytes: &[u8]) -> Result<Selection, IntakeError> {
    let declared = declared_type.trim().to_ascii_lowercase();
    if !ACCEPTED_UPLOAD_TYPES.contains(&declared.as_str()) {
        return Err(IntakeError::UnsupportedType(declared));
    }

    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(IntakeError::TooLarge { size: bytes.len() });
    }

    let media_type = MediaType::from_mime(&declared)
        .ok_or_else(|| IntakeError::UnsupportedType(declared.clone()))?;
    if MediaType::sniff(bytes) != Some(media_type) {
        return Err(IntakeError::ContentMismatch { declared });
    }

    Ok(Selection::Upload {
        file_name: file_name.to_string(),
        image: ImageReference::from_bytes(media_type, bytes),
    })
}

/// Validate a typed image URL
pub fn intake_url(typed: &str) -> Result<Selection, IntakeError> {
    let url = typed.trim();
    if url.is_empty() {
        return Err(IntakeError::EmptyUrl);
    }
    ImageReference::parse_remote(url).map_err(|_| IntakeError::InvalidUrl)?;

    Ok(Selection::Link {
        url: url.to_string(),
    })
}

/// Anything that can run an analysis for the session
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError>;
}

#[async_trait]
impl AnalysisBackend for AnalysisGateway {
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        AnalysisGateway::analyze(self, &request).await
    }
}

/// Transient UI state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub selection: Option<Selection>,
    pub preview: Option<String>,
    pub result: Option<AnalysisResult>,
    /// At most one error is shown at a time
    pub error: Option<String>,
}

/// What a trigger did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Another analysis was already pending; nothing happened
    Ignored,
    /// No image selected; error state set
    NothingSelected,
    Completed,
    Failed,
    /// Session was reset while the call was pending; outcome dropped
    Discarded,
}

/// Clears the in-flight flag however the trigger ends
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// One user's page session
pub struct AnalysisSession<B> {
    backend: B,
    state: Mutex<SessionState>,
    in_flight: AtomicBool,
    /// Bumped by reset so a pending call cannot repopulate cleared state
    generation: Mutex<u64>,
}

impl<B: AnalysisBackend> AnalysisSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: Mutex::new(SessionState::default()),
            in_flight: AtomicBool::new(false),
            generation: Mutex::new(0),
        }
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Select an uploaded file
    ///
    /// On success replaces the selection and preview and clears any previous
    /// result. On failure only the error is set.
    pub async fn select_file(&self, file_name: &str, declared_type: &str, bytes: &[u8]) -> Result<(), IntakeError> {
        let outcome = intake_file(file_name, declared_type, bytes);
        self.apply_selection(outcome).await
    }

    /// Select a typed URL
    pub async fn select_url(&self, typed: &str) -> Result<(), IntakeError> {
        let outcome = intake_url(typed);
        self.apply_selection(outcome).await
    }

    async fn apply_selection(&self, outcome: Result<Selection, IntakeError>) -> Result<(), IntakeError> {
        let mut state = self.state.lock().await;
        match outcome {
            Ok(selection) => {
                state.preview = Some(selection.preview().to_string());
                state.selection = Some(selection);
                state.result = None;
                state.error = None;
                Ok(())
            }
            Err(e) => {
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Run an analysis of the current selection
    ///
    /// A trigger while another is pending is a no-op.
    pub async fn trigger(&self) -> TriggerOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("Analysis already pending; trigger ignored");
            return TriggerOutcome::Ignored;
        }
        let _in_flight = InFlightGuard(&self.in_flight);

        let generation = *self.generation.lock().await;
        let request = {
            let mut state = self.state.lock().await;
            state.error = None;
            state.result = None;
            match &state.selection {
                Some(selection) => selection.to_request(),
                None => {
                    state.error = Some(IntakeError::NothingSelected.to_string());
                    return TriggerOutcome::NothingSelected;
                }
            }
        };

        let outcome = self.backend.analyze(request).await;

        let current = self.generation.lock().await;
        let mut state = self.state.lock().await;
        if *current != generation {
            TriggerOutcome::Discarded
        } else {
            match outcome {
                Ok(result) => {
                    state.result = Some(result);
                    TriggerOutcome::Completed
                }
                Err(e) => {
                    state.error = Some(e.user_message());
                    TriggerOutcome::Failed
                }
            }
        }
    }

    /// Clear selection, preview, result and error
    pub async fn reset(&self) {
        let mut generation = self.generation.lock().await;
        *generation += 1;
        *self.state.lock().await = SessionState::default();
    }

    /// Current findings in display order
    pub async fn rendered_findings(&self) -> Vec<Finding> {
        let state = self.state.lock().await;
        match &state.result {
            Some(result) => findings_by_severity(&result.issues).into_iter().cloned().collect(),
            None => Vec::new(),
        }
    }
}
