use serde::{Deserialize, Serialize};

/// Upper bound for every score the analysis service reports.
pub const MAX_SCORE: u8 = 100;

/// Per-dimension quality scores, each 0 – 100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    #[serde(default, deserialize_with = "deserialize_score")]
    pub clarity: u8,
    #[serde(default, deserialize_with = "deserialize_score")]
    pub impact: u8,
    #[serde(default, deserialize_with = "deserialize_score")]
    pub keywords: u8,
    #[serde(default, deserialize_with = "deserialize_score")]
    pub structure: u8,
    #[serde(default, deserialize_with = "deserialize_score")]
    pub ats_compatibility: u8,
}

impl DimensionScores {
    /// Labelled view in display order.
    pub fn entries(&self) -> [(&'static str, u8); 5] {
        [
            ("Clarity", self.clarity),
            ("Impact", self.impact),
            ("Keywords", self.keywords),
            ("Structure", self.structure),
            ("ATS Compatibility", self.ats_compatibility),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skills {
    #[serde(default)]
    pub technical: Vec<String>,
    #[serde(default)]
    pub soft: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementTip {
    pub area: String,
    pub tip: String,
}

/// Output of analyzing one document version.
///
/// `resume_text` is the canonical text every downstream stage works from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(deserialize_with = "deserialize_score")]
    pub overall_score: u8,
    #[serde(rename = "scores", default)]
    pub dimension_scores: DimensionScores,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub missing_sections: Vec<String>,
    #[serde(default)]
    pub ats_issues: Vec<String>,
    #[serde(default)]
    pub weak_bullets: Vec<String>,
    #[serde(default)]
    pub improvement_tips: Vec<ImprovementTip>,
    #[serde(default)]
    pub skills: Skills,
    pub resume_text: String,
    #[serde(default)]
    pub experience_years: f64,
    #[serde(default)]
    pub education: String,
}

impl AnalysisResult {
    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_score(self.overall_score)
    }

    /// Up to two leading technical skills, used to pre-fill the job search.
    pub fn suggested_keywords(&self) -> String {
        self.skills
            .technical
            .iter()
            .take(2)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Coarse rating shown next to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    NeedsWork,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => ScoreBand::Excellent,
            60..=79 => ScoreBand::Good,
            40..=59 => ScoreBand::Fair,
            _ => ScoreBand::NeedsWork,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::Fair => "Fair",
            ScoreBand::NeedsWork => "Needs Work",
        }
    }
}

/// Accepts any JSON number and clamps it into 0 – 100.
/// The service is model-backed; out-of-range or fractional values do occur.
pub(crate) fn deserialize_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(clamp_score(raw))
}

pub(crate) fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, MAX_SCORE as f64) as u8
}
