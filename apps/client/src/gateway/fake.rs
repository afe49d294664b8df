//! Scripted `RemoteGateway` for workflow tests.
//!
//! Each operation has its own queue of canned outcomes, optionally delayed so
//! tests running on paused tokio time can interleave calls deterministically.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::gateway::{GatewayError, RemoteGateway};
use crate::models::analysis::{AnalysisResult, DimensionScores, Skills};
use crate::models::documents::{
    CoverLetterResult, Document, ExportedDocument, InterviewResult, MatchResult, RewriteResult,
    TailorResult, Tone,
};
use crate::models::job::{sample_listing, JobListing};
use crate::models::search::{SearchPage, SearchParams};

type Outcome<T> = (Duration, Result<T, GatewayError>);

struct Script<T> {
    queue: Mutex<VecDeque<Outcome<T>>>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }
}

impl<T> Script<T> {
    fn push(&self, delay: Duration, outcome: Result<T, GatewayError>) {
        self.queue.lock().unwrap().push_back((delay, outcome));
    }

    async fn next(&self, operation: &str) -> Result<T, GatewayError> {
        let scripted = self.queue.lock().unwrap().pop_front();
        match scripted {
            Some((delay, outcome)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                outcome
            }
            None => Err(GatewayError::Failed {
                status: 500,
                message: format!("no scripted response for {operation}"),
            }),
        }
    }
}

#[derive(Default)]
pub struct FakeGateway {
    analyses: Script<AnalysisResult>,
    tailors: Script<TailorResult>,
    cover_letters: Script<CoverLetterResult>,
    interviews: Script<InterviewResult>,
    matches: Script<MatchResult>,
    rewrites: Script<RewriteResult>,
    searches: Script<SearchPage>,
    exports: Script<ExportedDocument>,
    calls: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_analysis(&self, delay: Duration, outcome: Result<AnalysisResult, GatewayError>) {
        self.analyses.push(delay, outcome);
    }

    pub fn push_tailor(&self, delay: Duration, outcome: Result<TailorResult, GatewayError>) {
        self.tailors.push(delay, outcome);
    }

    pub fn push_cover_letter(&self, outcome: Result<CoverLetterResult, GatewayError>) {
        self.cover_letters.push(Duration::ZERO, outcome);
    }

    pub fn push_interview(&self, outcome: Result<InterviewResult, GatewayError>) {
        self.interviews.push(Duration::ZERO, outcome);
    }

    pub fn push_match(&self, delay: Duration, outcome: Result<MatchResult, GatewayError>) {
        self.matches.push(delay, outcome);
    }

    pub fn push_rewrite(&self, outcome: Result<RewriteResult, GatewayError>) {
        self.rewrites.push(Duration::ZERO, outcome);
    }

    pub fn push_search(&self, delay: Duration, outcome: Result<SearchPage, GatewayError>) {
        self.searches.push(delay, outcome);
    }

    pub fn push_export(&self, outcome: Result<ExportedDocument, GatewayError>) {
        self.exports.push(Duration::ZERO, outcome);
    }

    /// Log of calls in the order they reached the gateway.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RemoteGateway for FakeGateway {
    async fn analyze(&self, document: &Document) -> Result<AnalysisResult, GatewayError> {
        self.record(format!("analyze {}", document.filename));
        self.analyses.next("analyze").await
    }

    async fn tailor(&self, _resume: &str, _jd: &str) -> Result<TailorResult, GatewayError> {
        self.record("tailor".to_string());
        self.tailors.next("tailor").await
    }

    async fn cover_letter(
        &self,
        _resume: &str,
        _jd: &str,
        tone: Tone,
    ) -> Result<CoverLetterResult, GatewayError> {
        self.record(format!("cover_letter {}", tone.as_str()));
        self.cover_letters.next("cover_letter").await
    }

    async fn interview_qa(&self, _resume: &str, _jd: &str) -> Result<InterviewResult, GatewayError> {
        self.record("interview_qa".to_string());
        self.interviews.next("interview_qa").await
    }

    async fn match_job(&self, resume: &str, _jd: &str) -> Result<MatchResult, GatewayError> {
        self.record(format!("match_job {resume}"));
        self.matches.next("match_job").await
    }

    async fn rewrite_bullets(
        &self,
        bullets: &[String],
        job_title: &str,
    ) -> Result<RewriteResult, GatewayError> {
        self.record(format!("rewrite_bullets {} {job_title}", bullets.len()));
        self.rewrites.next("rewrite_bullets").await
    }

    async fn search_jobs(
        &self,
        params: &SearchParams,
        page: u32,
    ) -> Result<SearchPage, GatewayError> {
        self.record(format!("search_jobs {} page={page}", params.keywords));
        self.searches.next("search_jobs").await
    }

    async fn export_document(
        &self,
        _text: &str,
        filename: &str,
    ) -> Result<ExportedDocument, GatewayError> {
        self.record(format!("export_document {filename}"));
        self.exports.next("export_document").await
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fixtures
// ────────────────────────────────────────────────────────────────────────────

pub fn analysis_with_score(score: u8) -> AnalysisResult {
    AnalysisResult {
        overall_score: score,
        dimension_scores: DimensionScores {
            clarity: score,
            impact: score,
            keywords: score,
            structure: score,
            ats_compatibility: score,
        },
        strengths: vec!["Consistent formatting".to_string()],
        weaknesses: vec!["Few metrics".to_string()],
        missing_sections: vec![],
        ats_issues: vec!["Header uses a table".to_string()],
        weak_bullets: vec![
            "Worked on backend services".to_string(),
            "Helped with deployments".to_string(),
        ],
        improvement_tips: vec![],
        skills: Skills {
            technical: vec!["Rust".to_string(), "Kubernetes".to_string(), "SQL".to_string()],
            soft: vec!["Mentoring".to_string()],
        },
        resume_text: format!("Resume scored {score}"),
        experience_years: 5.0,
        education: "BSc".to_string(),
    }
}

pub fn tailor_result(text: &str) -> TailorResult {
    TailorResult {
        tailored_resume: text.to_string(),
        changes_made: vec!["Reordered skills".to_string()],
        keywords_added: vec!["Kafka".to_string()],
        match_improvement: "Estimated match improved from 55% to 72%".to_string(),
        bold_keywords: vec![],
    }
}

pub fn match_result(score: u8) -> MatchResult {
    MatchResult {
        match_score: score,
        verdict: "Good Match".to_string(),
        summary: "Solid overlap".to_string(),
        matched_skills: vec!["Rust".to_string()],
        missing_skills: vec!["Go".to_string()],
        missing_keywords: vec![],
        recommendations: vec![],
        should_apply: true,
    }
}

/// A page of `count` listings with ids `{prefix}-0 .. {prefix}-{count-1}`.
pub fn search_page(prefix: &str, count: usize, total: u64, filtered_out: u64) -> SearchPage {
    let results: Vec<JobListing> = (0..count)
        .map(|i| sample_listing(&format!("{prefix}-{i}")))
        .collect();
    SearchPage {
        results,
        total,
        filtered_out,
    }
}

pub fn exported(name: &str) -> ExportedDocument {
    ExportedDocument {
        filename: format!("{name}.pdf"),
        bytes: Bytes::from_static(b"%PDF-1.4"),
    }
}

pub fn provider_failure(message: &str) -> GatewayError {
    GatewayError::Failed {
        status: 500,
        message: message.to_string(),
    }
}
