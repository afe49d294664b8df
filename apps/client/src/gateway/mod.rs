//! Remote gateway: the single point of entry for every call to the ApplyEdge service.
//!
//! ARCHITECTURAL RULE: workflow code never touches HTTP directly.
//! All remote operations go through the `RemoteGateway` trait, so the
//! orchestrator can run against `HttpGateway` or a scripted fake.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::analysis::AnalysisResult;
use crate::models::documents::{
    CoverLetterResult, Document, ExportedDocument, InterviewResult, MatchResult, RewriteResult,
    TailorResult, Tone,
};
use crate::models::search::{SearchPage, SearchParams};

pub mod endpoints;
pub mod http;

#[cfg(test)]
pub mod fake;

pub use http::HttpGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never got an answer (connect, DNS, reset, body read).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service refused the input (unsupported file, empty fields, too large).
    #[error("Request rejected (status {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The service ran the operation and reported failure.
    #[error("Operation failed (status {status}): {message}")]
    Failed { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}

/// Contract for the eight remote operations.
///
/// Carried by the orchestrator as `Arc<dyn RemoteGateway>`.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    async fn analyze(&self, document: &Document) -> Result<AnalysisResult, GatewayError>;

    async fn tailor(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<TailorResult, GatewayError>;

    async fn cover_letter(
        &self,
        resume_text: &str,
        job_description: &str,
        tone: Tone,
    ) -> Result<CoverLetterResult, GatewayError>;

    async fn interview_qa(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<InterviewResult, GatewayError>;

    async fn match_job(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<MatchResult, GatewayError>;

    async fn rewrite_bullets(
        &self,
        bullets: &[String],
        job_title: &str,
    ) -> Result<RewriteResult, GatewayError>;

    async fn search_jobs(
        &self,
        params: &SearchParams,
        page: u32,
    ) -> Result<SearchPage, GatewayError>;

    /// `filename` is an already sanitized stem. The returned document is named `<stem>.pdf`.
    async fn export_document(
        &self,
        text: &str,
        filename: &str,
    ) -> Result<ExportedDocument, GatewayError>;
}
