//! Workflow orchestrator: the single session behind every stage.
//!
//! All state lives in one `SessionState` behind a mutex that is never held
//! across an await: each operation checks and marks its stage, releases the
//! lock for the remote call, then re-locks to apply the outcome. Outcomes
//! started before a reset (or before a newer analysis replaced the session)
//! are dropped and reported as `AppError::Superseded`.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::bookmarks::BookmarkStore;
use crate::errors::AppError;
use crate::gateway::RemoteGateway;
use crate::models::analysis::AnalysisResult;
use crate::models::documents::{
    sanitize_export_name, CoverLetterResult, Document, ExportedDocument, InterviewResult,
    MatchResult, RewriteResult, TailorResult, Tone, DEFAULT_EXPORT_NAME,
};
use crate::models::job::JobListing;
use crate::models::search::SearchParams;
use crate::workflow::comparator::compare_after_rewrite;
use crate::workflow::pager::{PageRequest, SearchSession};
use crate::workflow::pipeline::{AnalysisPipeline, ProgressSender};
use crate::workflow::stages::{Screen, SessionState, Stage};

#[derive(Clone)]
pub struct WorkflowOrchestrator {
    gateway: Arc<dyn RemoteGateway>,
    pipeline: AnalysisPipeline,
    bookmarks: Arc<BookmarkStore>,
    state: Arc<Mutex<SessionState>>,
    session_id: Uuid,
}

impl WorkflowOrchestrator {
    pub fn new(
        gateway: Arc<dyn RemoteGateway>,
        pipeline: AnalysisPipeline,
        bookmarks: Arc<BookmarkStore>,
    ) -> Self {
        let session_id = Uuid::new_v4();
        info!("Workflow session {session_id} started");
        Self {
            gateway,
            pipeline,
            bookmarks,
            state: Arc::new(Mutex::new(SessionState::default())),
            session_id,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Read access to the whole session.
    pub fn view<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&self.state())
    }

    pub fn screen(&self) -> Screen {
        self.state().screen
    }

    pub fn analysis(&self) -> Option<AnalysisResult> {
        self.state().analysis.clone()
    }

    pub fn filename(&self) -> Option<String> {
        self.state().filename.clone()
    }

    // ────────────────────────────────────────────────────────────────────────
    // Upload & navigation
    // ────────────────────────────────────────────────────────────────────────

    /// Analyzes a document. Success replaces any previous analysis and lands
    /// on `Overview`. Failure returns to `Upload` with the error shown there,
    /// dropping any previous analysis along with its stage state.
    pub async fn upload(
        &self,
        document: Document,
        progress: Option<&ProgressSender>,
    ) -> Result<AnalysisResult, AppError> {
        let epoch = {
            let mut state = self.state();
            if state.uploading.is_some() {
                return Err(AppError::Busy("Analysis"));
            }
            state.uploading = Some(document.filename.clone());
            state.upload_error = None;
            state.epoch
        };
        info!("Session {}: analyzing {}", self.session_id, document.filename);

        let outcome = self.pipeline.analyze(&document, progress).await;

        let mut state = self.state();
        if state.epoch != epoch {
            return Err(self.superseded("analysis"));
        }
        state.uploading = None;
        match outcome {
            Ok(analysis) => {
                state.install(document.filename, analysis.clone());
                info!(
                    "Session {}: analysis ready ({} / {})",
                    self.session_id,
                    analysis.overall_score,
                    analysis.band().label()
                );
                Ok(analysis)
            }
            Err(e) => {
                if state.analysis.is_some() {
                    info!(
                        "Session {}: upload failed, previous analysis discarded",
                        self.session_id
                    );
                }
                state.clear();
                state.upload_error = Some(e.inline_message());
                Err(e)
            }
        }
    }

    /// Switches the visible stage. Nothing in flight is cancelled.
    pub fn select_stage(&self, stage: Stage) -> Result<(), AppError> {
        let mut guard = self.state();
        let state = &mut *guard;
        let analysis = state.analysis.as_ref().ok_or(AppError::NoAnalysis)?;
        if stage == Stage::BulletRewrite {
            state.rewrite.seed(analysis);
        }
        state.screen = Screen::Results(stage);
        debug!("Stage -> {}", stage.label());
        Ok(())
    }

    /// Discards the analysis and all stage state. Saved jobs are untouched.
    pub fn reset(&self) {
        self.state().clear();
        info!(
            "Session {} reset ({} saved jobs kept)",
            self.session_id,
            self.bookmarks.len()
        );
    }

    // ────────────────────────────────────────────────────────────────────────
    // Job match
    // ────────────────────────────────────────────────────────────────────────

    pub async fn run_match(&self, job_description: &str) -> Result<MatchResult, AppError> {
        let (epoch, resume) = self.begin(|state| {
            let resume = state.require_analysis()?.resume_text.clone();
            let stage = &mut state.job_match;
            require_job_description(job_description).map_err(|e| stage.slot.reject(e))?;
            stage.job_description = job_description.to_string();
            stage.slot.begin("Job match")?;
            Ok(resume)
        })?;

        let outcome = self
            .gateway
            .match_job(&resume, job_description)
            .await
            .map_err(AppError::from);

        self.finish(epoch, "job match", outcome, |state, outcome| {
            state.job_match.slot.settle(outcome);
            if let Ok(result) = outcome {
                info!("Job match: {}% ({})", result.match_score, result.verdict);
            }
        })
    }

    // ────────────────────────────────────────────────────────────────────────
    // Bullet rewrite
    // ────────────────────────────────────────────────────────────────────────

    /// Flips the selection of one weak bullet. Returns whether it is now selected.
    pub fn toggle_bullet(&self, index: usize) -> Result<bool, AppError> {
        let mut guard = self.state();
        let state = &mut *guard;
        let analysis = state.analysis.as_ref().ok_or(AppError::NoAnalysis)?;
        if index >= analysis.weak_bullets.len() {
            return Err(AppError::Validation(format!(
                "There is no weak bullet #{}",
                index + 1
            )));
        }
        state.rewrite.seed(analysis);
        Ok(state.rewrite.toggle(index))
    }

    pub fn set_target_title(&self, job_title: &str) -> Result<(), AppError> {
        let mut state = self.state();
        state.require_analysis()?;
        state.rewrite.job_title = job_title.trim().to_string();
        Ok(())
    }

    /// Rewrites the selected bullets for the target title.
    pub async fn run_rewrite(&self) -> Result<RewriteResult, AppError> {
        let (epoch, (bullets, job_title)) = self.begin(|guard| {
            let state = &mut *guard;
            let analysis = state.analysis.as_ref().ok_or(AppError::NoAnalysis)?;
            let stage = &mut state.rewrite;
            stage.seed(analysis);
            let bullets = stage.selected_bullets(analysis);
            if bullets.is_empty() {
                return Err(stage.slot.reject(AppError::Validation(
                    "Select at least one bullet to rewrite".to_string(),
                )));
            }
            stage.slot.begin("Bullet rewrite")?;
            Ok((bullets, stage.job_title.clone()))
        })?;

        let outcome = self
            .gateway
            .rewrite_bullets(&bullets, &job_title)
            .await
            .map_err(AppError::from);

        self.finish(epoch, "bullet rewrite", outcome, |state, outcome| {
            state.rewrite.slot.settle(outcome);
        })
    }

    // ────────────────────────────────────────────────────────────────────────
    // Tailor, rescoring & export
    // ────────────────────────────────────────────────────────────────────────

    /// Tailors the resume to a job description, then re-scores the result in
    /// the background. The comparison appears on the tailor stage once ready.
    pub async fn run_tailor(&self, job_description: &str) -> Result<TailorResult, AppError> {
        let (epoch, (resume, original_score)) = self.begin(|state| {
            let analysis = state.require_analysis()?;
            let inputs = (analysis.resume_text.clone(), analysis.overall_score);
            let stage = &mut state.tailor;
            require_job_description(job_description).map_err(|e| stage.slot.reject(e))?;
            stage.job_description = job_description.to_string();
            stage.slot.begin("Tailoring")?;
            Ok(inputs)
        })?;

        let outcome = self
            .gateway
            .tailor(&resume, job_description)
            .await
            .map_err(AppError::from);

        let generation = {
            let mut state = self.state();
            if state.epoch != epoch {
                return Err(self.superseded("tailoring"));
            }
            let stage = &mut state.tailor;
            stage.slot.settle(&outcome);
            if outcome.is_err() {
                return outcome;
            }
            stage.generation += 1;
            stage.comparison = None;
            stage.rescoring = true;
            stage.generation
        };

        let result = outcome?;
        info!(
            "Tailored resume: {} changes, {} keywords added",
            result.changes_made.len(),
            result.keywords_added.len()
        );
        self.spawn_rescoring(
            epoch,
            generation,
            original_score,
            result.tailored_resume.clone(),
        );
        Ok(result)
    }

    /// Detached rescoring of a tailored resume. Merged only if the same
    /// tailoring is still current; any failure just means no comparison.
    fn spawn_rescoring(
        &self,
        epoch: u64,
        generation: u64,
        original_score: u8,
        tailored_text: String,
    ) {
        let pipeline = self.pipeline.clone();
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            let outcome = compare_after_rewrite(&pipeline, original_score, &tailored_text).await;

            let mut state = lock(&state);
            if state.epoch != epoch || state.tailor.generation != generation {
                debug!("Dropping rescoring for superseded tailoring #{generation}");
                return;
            }
            state.tailor.rescoring = false;
            match outcome {
                Ok(comparison) => {
                    info!(
                        "Tailored resume scored {} ({})",
                        comparison.score,
                        comparison.delta_label()
                    );
                    state.tailor.comparison = Some(comparison);
                }
                Err(e) => debug!("Rescoring failed, no comparison shown: {e}"),
            }
        });
    }

    /// Renders the current tailored resume as a PDF.
    pub async fn export_tailored(&self, filename: Option<&str>) -> Result<ExportedDocument, AppError> {
        let name = sanitize_export_name(filename.unwrap_or(DEFAULT_EXPORT_NAME));
        let (epoch, text) = self.begin(|state| {
            state.require_analysis()?;
            let stage = &mut state.tailor;
            let text = match &stage.slot.result {
                Some(result) => result.tailored_resume.clone(),
                None => {
                    return Err(AppError::Validation(
                        "Tailor your resume before exporting".to_string(),
                    ))
                }
            };
            if stage.exporting {
                return Err(AppError::Busy("Export"));
            }
            stage.exporting = true;
            stage.export_error = None;
            Ok(text)
        })?;

        let outcome = self
            .gateway
            .export_document(&text, &name)
            .await
            .map_err(AppError::from);

        self.finish(epoch, "export", outcome, |state, outcome| {
            state.tailor.exporting = false;
            match outcome {
                Ok(doc) => info!("Exported {} ({} bytes)", doc.filename, doc.bytes.len()),
                Err(e) => state.tailor.export_error = Some(e.inline_message()),
            }
        })
    }

    // ────────────────────────────────────────────────────────────────────────
    // Cover letter & interview prep
    // ────────────────────────────────────────────────────────────────────────

    pub async fn run_cover_letter(
        &self,
        job_description: &str,
        tone: Tone,
    ) -> Result<CoverLetterResult, AppError> {
        let (epoch, resume) = self.begin(|state| {
            let resume = state.require_analysis()?.resume_text.clone();
            let stage = &mut state.cover_letter;
            require_job_description(job_description).map_err(|e| stage.slot.reject(e))?;
            stage.job_description = job_description.to_string();
            stage.tone = tone;
            stage.slot.begin("Cover letter")?;
            Ok(resume)
        })?;

        let outcome = self
            .gateway
            .cover_letter(&resume, job_description, tone)
            .await
            .map_err(AppError::from);

        self.finish(epoch, "cover letter", outcome, |state, outcome| {
            state.cover_letter.slot.settle(outcome);
        })
    }

    pub async fn run_interview(&self, job_description: &str) -> Result<InterviewResult, AppError> {
        let (epoch, resume) = self.begin(|state| {
            let resume = state.require_analysis()?.resume_text.clone();
            let stage = &mut state.interview;
            require_job_description(job_description).map_err(|e| stage.slot.reject(e))?;
            stage.job_description = job_description.to_string();
            stage.slot.begin("Interview prep")?;
            Ok(resume)
        })?;

        let outcome = self
            .gateway
            .interview_qa(&resume, job_description)
            .await
            .map_err(AppError::from);

        self.finish(epoch, "interview prep", outcome, |state, outcome| {
            state.interview.slot.settle(outcome);
            if let Ok(result) = outcome {
                info!("Interview prep: {} questions", result.questions.len());
            }
        })
    }

    // ────────────────────────────────────────────────────────────────────────
    // Job search & bookmarks
    // ────────────────────────────────────────────────────────────────────────

    /// Starts a new query at page 1.
    pub async fn search(&self, params: SearchParams) -> Result<SearchSession, AppError> {
        let (epoch, request) = self.begin(|state| {
            state.require_analysis()?;
            let stage = &mut state.search;
            if stage.pending {
                return Err(AppError::Busy("Job search"));
            }
            stage.pending = true;
            stage.error = None;
            Ok(stage.pager.plan(params, 1))
        })?;
        self.fetch_page(epoch, request).await
    }

    /// Appends the next page of the current query.
    pub async fn load_more(&self) -> Result<SearchSession, AppError> {
        let (epoch, request) = self.begin(|state| {
            state.require_analysis()?;
            let stage = &mut state.search;
            if stage.pending {
                return Err(AppError::Busy("Job search"));
            }
            let request = stage.pager.plan_next().ok_or_else(|| {
                AppError::Validation("There are no more results to load".to_string())
            })?;
            stage.pending = true;
            stage.error = None;
            Ok(request)
        })?;
        self.fetch_page(epoch, request).await
    }

    async fn fetch_page(&self, epoch: u64, request: PageRequest) -> Result<SearchSession, AppError> {
        let outcome = self
            .gateway
            .search_jobs(&request.params, request.page)
            .await
            .map_err(AppError::from);

        let mut state = self.state();
        if state.epoch != epoch {
            return Err(self.superseded("job search"));
        }
        let stage = &mut state.search;
        stage.pending = false;
        match outcome {
            Ok(page) => {
                stage.pager.apply(request, page);
                let session = stage.pager.session().cloned().ok_or_else(|| {
                    AppError::Internal(anyhow::anyhow!("search page was not applied"))
                })?;
                stage.form = session.params.clone();
                Ok(session)
            }
            Err(e) => {
                stage.pager.abandon(&request);
                stage.error = Some(e.inline_message());
                Err(e)
            }
        }
    }

    /// Accumulated search results, each paired with its saved state.
    pub fn search_results_with_saved(&self) -> Vec<(JobListing, bool)> {
        let results = self
            .state()
            .search
            .pager
            .session()
            .map(|session| session.results.clone())
            .unwrap_or_default();
        results
            .into_iter()
            .map(|job| {
                let saved = self.bookmarks.is_saved(&job.id);
                (job, saved)
            })
            .collect()
    }

    pub async fn unsave_job(&self, id: &str) -> Result<(), AppError> {
        info!("Removing saved job {id}");
        self.bookmarks.remove(id).await
    }

    /// Saves or unsaves a listing. Returns whether it is saved afterwards.
    pub async fn toggle_saved(&self, job: JobListing) -> Result<bool, AppError> {
        info!("Toggling saved job {} ({})", job.id, job.title);
        self.bookmarks.toggle(job).await
    }

    pub fn saved_jobs(&self) -> Vec<JobListing> {
        self.bookmarks.list()
    }

    /// Badge count for the saved-jobs stage.
    pub fn saved_count(&self) -> usize {
        self.bookmarks.len()
    }

    // ────────────────────────────────────────────────────────────────────────
    // Helpers
    // ────────────────────────────────────────────────────────────────────────

    fn state(&self) -> MutexGuard<'_, SessionState> {
        lock(&self.state)
    }

    /// Runs the pre-call checks under the lock and captures the current epoch.
    fn begin<R>(
        &self,
        check: impl FnOnce(&mut SessionState) -> Result<R, AppError>,
    ) -> Result<(u64, R), AppError> {
        let mut state = self.state();
        let value = check(&mut state)?;
        Ok((state.epoch, value))
    }

    /// Applies an outcome to its stage unless the session moved on meanwhile.
    fn finish<T>(
        &self,
        epoch: u64,
        operation: &str,
        outcome: Result<T, AppError>,
        apply: impl FnOnce(&mut SessionState, &Result<T, AppError>),
    ) -> Result<T, AppError> {
        let mut state = self.state();
        if state.epoch != epoch {
            return Err(self.superseded(operation));
        }
        apply(&mut state, &outcome);
        outcome
    }

    fn superseded(&self, operation: &str) -> AppError {
        warn!(
            "Session {}: dropping {operation} result started before a reset",
            self.session_id
        );
        AppError::Superseded
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn require_job_description(job_description: &str) -> Result<(), AppError> {
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "Job description cannot be empty".to_string(),
        ));
    }
    Ok(())
}
