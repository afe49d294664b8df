//! `RemoteGateway` over HTTP.
//!
//! No timeout and no retry: a stalled call stalls its stage until the
//! transport gives up or the user restarts.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::gateway::endpoints::{
    CoverLetterRequest, ExportRequest, ResumeJobRequest, RewriteRequest, ANALYZE_ENDPOINT,
    COVER_LETTER_ENDPOINT, EXPORT_ENDPOINT, INTERVIEW_ENDPOINT, JOBS_ENDPOINT, MATCH_ENDPOINT,
    REWRITE_ENDPOINT, TAILOR_ENDPOINT, UPLOAD_FIELD,
};
use crate::gateway::{GatewayError, RemoteGateway};
use crate::models::analysis::AnalysisResult;
use crate::models::documents::{
    CoverLetterResult, Document, ExportedDocument, InterviewResult, MatchResult, RewriteResult,
    TailorResult, Tone,
};
use crate::models::search::{SearchPage, SearchParams};

/// Error body shape used by the service: `{"detail": ...}`.
/// `detail` is a string for handled errors and a list for schema violations.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client: Client::builder().build()?,
            base_url,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn post_json<B, R>(&self, endpoint: &str, body: &B) -> Result<R, GatewayError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = self.url(endpoint);
        debug!("POST {url}");
        let response = self.client.post(&url).json(body).send().await?;
        read_json(response).await
    }
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn analyze(&self, document: &Document) -> Result<AnalysisResult, GatewayError> {
        let url = self.url(ANALYZE_ENDPOINT);
        let part = Part::bytes(document.bytes.to_vec())
            .file_name(document.filename.clone())
            .mime_str(&document.media_type)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        debug!(
            "POST {url} ({} bytes, {})",
            document.bytes.len(),
            document.media_type
        );
        let response = self.client.post(&url).multipart(form).send().await?;
        read_json(response).await
    }

    async fn tailor(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<TailorResult, GatewayError> {
        let body = ResumeJobRequest {
            resume_text,
            job_description,
        };
        self.post_json(TAILOR_ENDPOINT, &body).await
    }

    async fn cover_letter(
        &self,
        resume_text: &str,
        job_description: &str,
        tone: Tone,
    ) -> Result<CoverLetterResult, GatewayError> {
        let body = CoverLetterRequest {
            resume_text,
            job_description,
            tone: tone.as_str(),
        };
        self.post_json(COVER_LETTER_ENDPOINT, &body).await
    }

    async fn interview_qa(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<InterviewResult, GatewayError> {
        let body = ResumeJobRequest {
            resume_text,
            job_description,
        };
        self.post_json(INTERVIEW_ENDPOINT, &body).await
    }

    async fn match_job(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<MatchResult, GatewayError> {
        let body = ResumeJobRequest {
            resume_text,
            job_description,
        };
        self.post_json(MATCH_ENDPOINT, &body).await
    }

    async fn rewrite_bullets(
        &self,
        bullets: &[String],
        job_title: &str,
    ) -> Result<RewriteResult, GatewayError> {
        let body = RewriteRequest { bullets, job_title };
        self.post_json(REWRITE_ENDPOINT, &body).await
    }

    async fn search_jobs(
        &self,
        params: &SearchParams,
        page: u32,
    ) -> Result<SearchPage, GatewayError> {
        let url = self.url(JOBS_ENDPOINT);
        debug!("GET {url} page={page} keywords={:?}", params.keywords);
        let response = self
            .client
            .get(&url)
            .query(&params.query_pairs(page))
            .send()
            .await?;
        read_json(response).await
    }

    async fn export_document(
        &self,
        text: &str,
        filename: &str,
    ) -> Result<ExportedDocument, GatewayError> {
        let url = self.url(EXPORT_ENDPOINT);
        let body = ExportRequest {
            resume_text: text,
            filename,
        };
        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(status, response).await);
        }
        let bytes = response.bytes().await?;
        Ok(ExportedDocument {
            filename: format!("{filename}.pdf"),
            bytes,
        })
    }
}

async fn read_json<R: DeserializeOwned>(response: Response) -> Result<R, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        return Err(error_from_response(status, response).await);
    }
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(GatewayError::Decode)
}

async fn error_from_response(status: StatusCode, response: Response) -> GatewayError {
    let body = response.text().await.unwrap_or_default();
    warn!("Service returned {status}: {body}");
    classify_failure(status, &body)
}

/// Maps a non-success status to the error taxonomy.
/// Input-shaped rejections are validation failures; everything else is a provider failure.
pub(crate) fn classify_failure(status: StatusCode, body: &str) -> GatewayError {
    let message = detail_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    });
    let status = status.as_u16();
    match status {
        400 | 404 | 413 | 415 | 422 => GatewayError::Rejected { status, message },
        _ => GatewayError::Failed { status, message },
    }
}

fn detail_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ErrorBody>(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_is_rejected_with_detail() {
        let err = classify_failure(
            StatusCode::BAD_REQUEST,
            r#"{"detail": "Only PDF files accepted."}"#,
        );
        match err {
            GatewayError::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Only PDF files accepted.");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn test_unprocessable_with_list_detail_is_rejected() {
        let err = classify_failure(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail": [{"loc": ["body", "resume_text"], "msg": "field required"}]}"#,
        );
        match err {
            GatewayError::Rejected { message, .. } => assert!(message.contains("field required")),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn test_server_error_is_provider_failure() {
        let err = classify_failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"detail": "Tailoring failed: model overloaded"}"#,
        );
        assert!(matches!(err, GatewayError::Failed { status: 500, .. }));
    }

    #[test]
    fn test_non_json_error_body_uses_reason_phrase() {
        let err = classify_failure(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        match err {
            GatewayError::Failed { message, .. } => assert_eq!(message, "Bad Gateway"),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let gateway = HttpGateway::new("http://localhost:8000/").unwrap();
        assert_eq!(gateway.url(TAILOR_ENDPOINT), "http://localhost:8000/tailor");
    }
}
