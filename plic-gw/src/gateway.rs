//! Analysis gateway
//!
//! Validates a request, makes exactly one provider call, extracts and checks
//! the model's JSON, and wraps it with request metadata. Stateless: requests
//! share only immutable configuration and the pooled HTTP client.

use chrono::Utc;
use plic_common::config::{Credential, ProviderConfig};
use plic_common::{AnalysisRequest, AnalysisResult, ImageInfo};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::AnalysisError;
use crate::extract::extract_json_object;
use crate::prompt::analysis_prompt;
use crate::provider::ProviderClient;
use crate::verdict::ModelVerdict;

/// Longest slice of an unparseable reply kept in logs
const MAX_LOGGED_REPLY: usize = 4000;

pub struct AnalysisGateway {
    provider: ProviderClient,
    credential: Credential,
}

impl AnalysisGateway {
    pub fn new(provider: ProviderClient, credential: Credential) -> Self {
        Self {
            provider,
            credential,
        }
    }

    pub fn from_config(config: &ProviderConfig, credential: Credential) -> Result<Self, AnalysisError> {
        Ok(Self::new(ProviderClient::new(config)?, credential))
    }

    pub fn is_configured(&self) -> bool {
        self.credential.is_configured()
    }

    pub fn provider(&self) -> &ProviderClient {
        &self.provider
    }

    /// Analyze one image
    ///
    /// Input is validated before the credential is checked, so a malformed
    /// request is always a validation error and never reaches the network.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let span = tracing::info_span!(
            "analysis",
            request_id = %Uuid::new_v4(),
            source = %request.source,
        );
        self.analyze_inner(request).instrument(span).await
    }

    async fn analyze_inner(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let (source, image) = request.resolve().map_err(|e| {
            tracing::info!(error = %e, "Rejected analysis request");
            AnalysisError::from(e)
        })?;

        let api_key = self.credential.api_key().ok_or_else(|| {
            tracing::error!("Provider API key not configured; refusing analysis");
            AnalysisError::Configuration("Provider API key not configured".to_string())
        })?;

        tracing::info!(inline = image.is_inline(), "Requesting image analysis");
        let reply = self
            .provider
            .complete(api_key, analysis_prompt(), image.as_provider_url())
            .await?;

        let extracted = extract_json_object(&reply).ok_or_else(|| {
            log_unparseable_reply(&reply, "no JSON object found");
            AnalysisError::Parse("No JSON object found in model reply".to_string())
        })?;
        tracing::debug!(strategy = extracted.strategy.name(), "Extracted JSON from reply");

        let verdict = ModelVerdict::from_object(&extracted.object).map_err(|e| {
            log_unparseable_reply(&reply, &e.to_string());
            e
        })?;

        tracing::info!(
            has_issues = verdict.has_issues,
            issue_count = verdict.issues.len(),
            "Analysis complete"
        );

        Ok(AnalysisResult {
            success: true,
            timestamp: Utc::now(),
            image_info: ImageInfo {
                source,
                file_name: request.file_name(source),
            },
            has_issues: verdict.has_issues,
            issues: verdict.issues,
            overall_summary: verdict.overall_summary,
        })
    }
}

fn log_unparseable_reply(reply: &str, reason: &str) {
    let logged: String = reply.chars().take(MAX_LOGGED_REPLY).collect();
    tracing::warn!(reason = reason, reply = %logged, "Model reply failed the result contract");
}
