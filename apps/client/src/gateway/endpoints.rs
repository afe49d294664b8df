// Endpoint paths and request bodies for the ApplyEdge service.
// Response bodies live in `crate::models`; they are shared with the workflow.

use serde::Serialize;

pub const ANALYZE_ENDPOINT: &str = "/analyze";
pub const TAILOR_ENDPOINT: &str = "/tailor";
pub const COVER_LETTER_ENDPOINT: &str = "/cover-letter";
pub const INTERVIEW_ENDPOINT: &str = "/interview-qa";
pub const MATCH_ENDPOINT: &str = "/match-job";
pub const REWRITE_ENDPOINT: &str = "/rewrite";
pub const JOBS_ENDPOINT: &str = "/jobs";
pub const EXPORT_ENDPOINT: &str = "/download-resume";

/// Multipart field the analyze endpoint reads the upload from.
pub const UPLOAD_FIELD: &str = "file";

/// Body shared by tailor, interview-qa and match-job.
#[derive(Debug, Serialize)]
pub struct ResumeJobRequest<'a> {
    pub resume_text: &'a str,
    pub job_description: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CoverLetterRequest<'a> {
    pub resume_text: &'a str,
    pub job_description: &'a str,
    pub tone: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RewriteRequest<'a> {
    pub bullets: &'a [String],
    pub job_title: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ExportRequest<'a> {
    pub resume_text: &'a str,
    pub filename: &'a str,
}
