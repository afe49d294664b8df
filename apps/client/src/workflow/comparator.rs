//! Before/after scoring for rewritten resumes.

use serde::Serialize;

use crate::errors::AppError;
use crate::models::documents::Document;
use crate::workflow::pipeline::AnalysisPipeline;

/// Filename the rewritten text is submitted under.
pub const SYNTHETIC_FILENAME: &str = "tailored.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Classification {
    Improved,
    Declined,
    Unchanged,
}

impl Classification {
    pub fn from_delta(delta: i32) -> Self {
        match delta.signum() {
            1 => Classification::Improved,
            -1 => Classification::Declined,
            _ => Classification::Unchanged,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreComparison {
    pub original: u8,
    pub score: u8,
    pub delta: i32,
    pub classification: Classification,
}

impl ScoreComparison {
    pub fn new(original: u8, score: u8) -> Self {
        let delta = score as i32 - original as i32;
        Self {
            original,
            score,
            delta,
            classification: Classification::from_delta(delta),
        }
    }

    /// `+13`, `-4`, `±0`.
    pub fn delta_label(&self) -> String {
        match self.classification {
            Classification::Unchanged => "±0".to_string(),
            _ => format!("{:+}", self.delta),
        }
    }
}

/// Re-scores rewritten text against the original score.
///
/// Best-effort: callers treat an `Err` as "no comparison", never as a failure
/// of the rewrite it augments.
pub async fn compare_after_rewrite(
    pipeline: &AnalysisPipeline,
    original_score: u8,
    rewritten_text: &str,
) -> Result<ScoreComparison, AppError> {
    let document = Document::synthetic_text(SYNTHETIC_FILENAME, rewritten_text);
    let rescored = pipeline.analyze(&document, None).await?;
    Ok(ScoreComparison::new(original_score, rescored.overall_score))
}
