//! Stage tags and the per-stage state records the orchestrator keeps.
//!
//! One tag is active at a time; every stage keeps its own record whether or
//! not it is visible, so a call that completes off-screen still lands.

use serde::Serialize;

use crate::errors::AppError;
use crate::models::analysis::AnalysisResult;
use crate::models::documents::{
    CoverLetterResult, InterviewResult, MatchResult, RewriteResult, TailorResult, Tone,
};
use crate::models::search::SearchParams;
use crate::workflow::comparator::ScoreComparison;
use crate::workflow::pager::JobSearchPager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Overview,
    AtsCheck,
    JobMatch,
    BulletRewrite,
    Tailor,
    CoverLetter,
    InterviewPrep,
    FindJobs,
    SavedJobs,
}

impl Stage {
    pub const ALL: [Stage; 9] = [
        Stage::Overview,
        Stage::AtsCheck,
        Stage::JobMatch,
        Stage::BulletRewrite,
        Stage::Tailor,
        Stage::CoverLetter,
        Stage::InterviewPrep,
        Stage::FindJobs,
        Stage::SavedJobs,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Stage::Overview => "overview",
            Stage::AtsCheck => "ats",
            Stage::JobMatch => "match",
            Stage::BulletRewrite => "rewrite",
            Stage::Tailor => "tailor",
            Stage::CoverLetter => "cover",
            Stage::InterviewPrep => "interview",
            Stage::FindJobs => "jobs",
            Stage::SavedJobs => "saved",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Overview => "Overview",
            Stage::AtsCheck => "ATS Check",
            Stage::JobMatch => "Job Match",
            Stage::BulletRewrite => "Bullet Rewriter",
            Stage::Tailor => "Tailor Resume",
            Stage::CoverLetter => "Cover Letter",
            Stage::InterviewPrep => "Interview Prep",
            Stage::FindJobs => "Find Jobs",
            Stage::SavedJobs => "Saved Jobs",
        }
    }

    pub fn parse(value: &str) -> Option<Stage> {
        let value = value.trim().to_ascii_lowercase();
        Stage::ALL.into_iter().find(|s| s.slug() == value)
    }
}

/// What the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Upload,
    Results(Stage),
}

// ────────────────────────────────────────────────────────────────────────────
// Per-operation status
// ────────────────────────────────────────────────────────────────────────────

/// Pending flag, latest result and inline error of one remote operation.
#[derive(Debug, Clone)]
pub struct Slot<T> {
    pub pending: bool,
    pub result: Option<T>,
    pub error: Option<String>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            pending: false,
            result: None,
            error: None,
        }
    }
}

impl<T: Clone> Slot<T> {
    /// Marks the operation as running. A second trigger while pending is rejected.
    pub fn begin(&mut self, operation: &'static str) -> Result<(), AppError> {
        if self.pending {
            return Err(AppError::Busy(operation));
        }
        self.pending = true;
        self.error = None;
        Ok(())
    }

    /// Records a locally rejected trigger as the inline error and hands it back.
    pub fn reject(&mut self, err: AppError) -> AppError {
        self.error = Some(err.inline_message());
        err
    }

    /// Records the outcome. A failure keeps the previous result visible.
    pub fn settle(&mut self, outcome: &Result<T, AppError>) {
        self.pending = false;
        match outcome {
            Ok(value) => {
                self.result = Some(value.clone());
                self.error = None;
            }
            Err(e) => self.error = Some(e.inline_message()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stage records
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct MatchState {
    pub job_description: String,
    pub slot: Slot<MatchResult>,
}

#[derive(Debug, Clone, Default)]
pub struct RewriteState {
    /// Indices into `weak_bullets`, in the order they were picked.
    pub selected: Vec<usize>,
    pub seeded: bool,
    pub job_title: String,
    pub slot: Slot<RewriteResult>,
}

impl RewriteState {
    pub fn seed(&mut self, analysis: &AnalysisResult) {
        if !self.seeded {
            self.selected = (0..analysis.weak_bullets.len()).collect();
            self.seeded = true;
        }
    }

    /// Flips one bullet. Returns whether it is now selected.
    pub fn toggle(&mut self, index: usize) -> bool {
        match self.selected.iter().position(|&i| i == index) {
            Some(pos) => {
                self.selected.remove(pos);
                false
            }
            None => {
                self.selected.push(index);
                true
            }
        }
    }

    pub fn selected_bullets(&self, analysis: &AnalysisResult) -> Vec<String> {
        self.selected
            .iter()
            .filter_map(|&i| analysis.weak_bullets.get(i).cloned())
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TailorState {
    pub job_description: String,
    pub slot: Slot<TailorResult>,
    /// Bumped on every successful tailoring; rescoring results carry the
    /// generation they were started for.
    pub generation: u64,
    pub rescoring: bool,
    pub comparison: Option<ScoreComparison>,
    pub exporting: bool,
    pub export_error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CoverLetterState {
    pub job_description: String,
    pub tone: Tone,
    pub slot: Slot<CoverLetterResult>,
}

#[derive(Debug, Clone, Default)]
pub struct InterviewState {
    pub job_description: String,
    pub slot: Slot<InterviewResult>,
}

#[derive(Debug, Default)]
pub struct SearchState {
    /// Form contents, pre-filled from the analysis.
    pub form: SearchParams,
    pub pager: JobSearchPager,
    pub pending: bool,
    pub error: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Session
// ────────────────────────────────────────────────────────────────────────────

/// Everything scoped to one analysis. `reset` replaces it wholesale.
#[derive(Debug)]
pub struct SessionState {
    pub screen: Screen,
    pub analysis: Option<AnalysisResult>,
    pub filename: Option<String>,
    /// Filename of the upload in flight, if any.
    pub uploading: Option<String>,
    pub upload_error: Option<String>,
    /// Bumped by every reset and every accepted analysis. Results started
    /// under an older epoch are dropped on return.
    pub epoch: u64,
    pub job_match: MatchState,
    pub rewrite: RewriteState,
    pub tailor: TailorState,
    pub cover_letter: CoverLetterState,
    pub interview: InterviewState,
    pub search: SearchState,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            screen: Screen::Upload,
            analysis: None,
            filename: None,
            uploading: None,
            upload_error: None,
            epoch: 0,
            job_match: MatchState::default(),
            rewrite: RewriteState::default(),
            tailor: TailorState::default(),
            cover_letter: CoverLetterState::default(),
            interview: InterviewState::default(),
            search: SearchState::default(),
        }
    }
}

impl SessionState {
    pub fn require_analysis(&self) -> Result<&AnalysisResult, AppError> {
        self.analysis.as_ref().ok_or(AppError::NoAnalysis)
    }

    /// Drops the analysis and every stage record, returning to `Upload`.
    pub fn clear(&mut self) {
        let epoch = self.epoch + 1;
        *self = SessionState {
            epoch,
            ..SessionState::default()
        };
    }

    /// Installs a fresh analysis with empty stage records.
    pub fn install(&mut self, filename: String, analysis: AnalysisResult) {
        self.clear();
        self.search.form = SearchParams::with_keywords(analysis.suggested_keywords());
        self.filename = Some(filename);
        self.analysis = Some(analysis);
        self.screen = Screen::Results(Stage::Overview);
    }
}
