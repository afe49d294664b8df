//! Analysis pipeline: upload → analyze, with a simulated progress indicator.
//!
//! The checkpoints are decorative: they advance on a wall-clock tick and know
//! nothing about the real call. Completion forces 100%; failure resets to 0.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::gateway::RemoteGateway;
use crate::models::analysis::AnalysisResult;
use crate::models::documents::Document;

/// Simulated checkpoints, in emission order.
pub const CHECKPOINTS: [(u8, &str); 5] = [
    (18, "Parsing document…"),
    (40, "Scoring content quality…"),
    (62, "Checking ATS compatibility…"),
    (82, "Extracting skills & insights…"),
    (96, "Finalizing report…"),
];

pub const DEFAULT_TICK: Duration = Duration::from_millis(650);
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(400);

/// One reading of the progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub percent: u8,
    pub label: &'static str,
}

impl Progress {
    pub const IDLE: Progress = Progress {
        percent: 0,
        label: "",
    };

    pub const COMPLETE: Progress = Progress {
        percent: 100,
        label: "Complete",
    };
}

pub type ProgressSender = mpsc::UnboundedSender<Progress>;

#[derive(Debug, Clone, Copy)]
pub struct PipelineTiming {
    pub tick: Duration,
    pub settle: Duration,
}

impl Default for PipelineTiming {
    fn default() -> Self {
        Self {
            tick: DEFAULT_TICK,
            settle: DEFAULT_SETTLE,
        }
    }
}

#[derive(Clone)]
pub struct AnalysisPipeline {
    gateway: Arc<dyn RemoteGateway>,
    timing: PipelineTiming,
}

impl AnalysisPipeline {
    pub fn new(gateway: Arc<dyn RemoteGateway>, timing: PipelineTiming) -> Self {
        Self { gateway, timing }
    }

    /// Analyzes a document.
    ///
    /// With an observer attached, checkpoints are emitted on every tick until
    /// the call resolves; success then emits 100% and waits out the settle
    /// delay before returning. Without an observer the call is made bare.
    pub async fn analyze(
        &self,
        document: &Document,
        progress: Option<&ProgressSender>,
    ) -> Result<AnalysisResult, AppError> {
        let report = |p: Progress| {
            if let Some(tx) = progress {
                // Observer gone means nobody is watching; keep going.
                let _ = tx.send(p);
            }
        };

        let call = self.gateway.analyze(document);
        tokio::pin!(call);

        let mut checkpoints = CHECKPOINTS.iter();
        let mut pending_step = if progress.is_some() {
            checkpoints.next()
        } else {
            None
        };

        let outcome = loop {
            tokio::select! {
                biased;
                outcome = &mut call => break outcome,
                _ = tokio::time::sleep(self.timing.tick), if pending_step.is_some() => {
                    if let Some(&(percent, label)) = pending_step {
                        report(Progress { percent, label });
                    }
                    pending_step = checkpoints.next();
                }
            }
        };

        match outcome {
            Ok(result) => {
                report(Progress::COMPLETE);
                info!(
                    "Analyzed {}: score {}/100",
                    document.filename, result.overall_score
                );
                if progress.is_some() {
                    tokio::time::sleep(self.timing.settle).await;
                }
                Ok(result)
            }
            Err(e) => {
                report(Progress::IDLE);
                warn!("Analysis of {} failed: {e}", document.filename);
                Err(e.into())
            }
        }
    }
}
