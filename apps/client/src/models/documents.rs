//! One-shot response objects for the derived stages, plus the document
//! payloads that travel to and from the service.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::models::analysis::deserialize_score;

// ────────────────────────────────────────────────────────────────────────────
// Documents
// ────────────────────────────────────────────────────────────────────────────

/// A document submitted for analysis.
#[derive(Debug, Clone)]
pub struct Document {
    pub filename: String,
    pub media_type: String,
    pub bytes: Bytes,
}

impl Document {
    /// Guesses the media type from the filename extension.
    pub fn from_file(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let filename = filename.into();
        let lower = filename.to_lowercase();
        let media_type = if lower.ends_with(".pdf") {
            "application/pdf"
        } else if lower.ends_with(".txt") {
            "text/plain"
        } else {
            "application/octet-stream"
        };
        Self {
            filename,
            media_type: media_type.to_string(),
            bytes: bytes.into(),
        }
    }

    /// Wraps plain text as a synthetic upload, used to re-score rewritten resumes.
    pub fn synthetic_text(filename: &str, text: &str) -> Self {
        Self {
            filename: filename.to_string(),
            media_type: "text/plain".to_string(),
            bytes: Bytes::copy_from_slice(text.as_bytes()),
        }
    }
}

/// Binary document produced by the export operation.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub filename: String,
    pub bytes: Bytes,
}

pub const DEFAULT_EXPORT_NAME: &str = "tailored_resume";

/// Filename stem safe to hand to the export service: spaces and slashes become `_`.
pub fn sanitize_export_name(name: &str) -> String {
    let trimmed = name.trim();
    let stem = trimmed.strip_suffix(".pdf").unwrap_or(trimmed);
    if stem.is_empty() {
        return DEFAULT_EXPORT_NAME.to_string();
    }
    stem.replace([' ', '/'], "_")
}

// ────────────────────────────────────────────────────────────────────────────
// Job match
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(deserialize_with = "deserialize_score")]
    pub match_score: u8,
    #[serde(default)]
    pub verdict: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub matched_skills: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(default)]
    pub missing_keywords: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub should_apply: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Bullet rewrite
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletRewrite {
    pub original: String,
    pub improved: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteResult {
    #[serde(default)]
    pub rewrites: Vec<BulletRewrite>,
}

// ────────────────────────────────────────────────────────────────────────────
// Tailoring
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailorResult {
    pub tailored_resume: String,
    #[serde(default)]
    pub changes_made: Vec<String>,
    #[serde(default)]
    pub keywords_added: Vec<String>,
    #[serde(default)]
    pub match_improvement: String,
    #[serde(default)]
    pub bold_keywords: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Cover letter
// ────────────────────────────────────────────────────────────────────────────

/// Voice of a generated cover letter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Professional,
    Conversational,
    Enthusiastic,
}

impl Tone {
    pub const ALL: [Tone; 3] = [Tone::Professional, Tone::Conversational, Tone::Enthusiastic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Conversational => "conversational",
            Tone::Enthusiastic => "enthusiastic",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tone::Professional => "Formal & polished",
            Tone::Conversational => "Warm & personable",
            Tone::Enthusiastic => "Energetic & passionate",
        }
    }

    pub fn parse(value: &str) -> Option<Tone> {
        Tone::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverLetterResult {
    pub cover_letter: String,
    #[serde(default)]
    pub subject_line: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub key_requirements: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Interview prep
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionCategory {
    Behavioral,
    Technical,
    Situational,
    #[serde(other)]
    General,
}

impl QuestionCategory {
    pub const ALL: [QuestionCategory; 4] = [
        QuestionCategory::Behavioral,
        QuestionCategory::Technical,
        QuestionCategory::Situational,
        QuestionCategory::General,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub question: String,
    pub category: QuestionCategory,
    #[serde(default)]
    pub ideal_answer: String,
    #[serde(default)]
    pub tip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewResult {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub key_topics_to_study: Vec<String>,
    #[serde(default)]
    pub red_flags_to_avoid: Vec<String>,
    #[serde(default)]
    pub questions: Vec<InterviewQuestion>,
}

impl InterviewResult {
    /// Questions of one category, in the order the service returned them.
    pub fn by_category(&self, category: QuestionCategory) -> Vec<&InterviewQuestion> {
        self.questions
            .iter()
            .filter(|q| q.category == category)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_media_type_from_extension() {
        assert_eq!(Document::from_file("cv.PDF", vec![1u8]).media_type, "application/pdf");
        assert_eq!(Document::from_file("cv.txt", vec![1u8]).media_type, "text/plain");
        assert_eq!(
            Document::from_file("cv.docx", vec![1u8]).media_type,
            "application/octet-stream"
        );
    }

    #[test]
    fn test_sanitize_export_name() {
        assert_eq!(sanitize_export_name("my resume/v2"), "my_resume_v2");
        assert_eq!(sanitize_export_name("final.pdf"), "final");
        assert_eq!(sanitize_export_name("   "), DEFAULT_EXPORT_NAME);
    }

    #[test]
    fn test_tone_parse_and_wire_format() {
        assert_eq!(Tone::parse("Enthusiastic"), Some(Tone::Enthusiastic));
        assert_eq!(Tone::parse("sarcastic"), None);
        assert_eq!(
            serde_json::to_value(Tone::Conversational).unwrap(),
            json!("conversational")
        );
    }

    #[test]
    fn test_unknown_question_category_falls_back_to_general() {
        let q: InterviewQuestion = serde_json::from_value(json!({
            "question": "Why us?",
            "category": "Culture",
            "ideal_answer": "...",
            "tip": "Be specific"
        }))
        .unwrap();
        assert_eq!(q.category, QuestionCategory::General);
    }

    #[test]
    fn test_interview_grouping_preserves_order() {
        let result: InterviewResult = serde_json::from_value(json!({
            "role": "SRE",
            "questions": [
                { "question": "Q1", "category": "Technical" },
                { "question": "Q2", "category": "Behavioral" },
                { "question": "Q3", "category": "Technical" }
            ]
        }))
        .unwrap();
        let technical: Vec<_> = result
            .by_category(QuestionCategory::Technical)
            .iter()
            .map(|q| q.question.as_str())
            .collect();
        assert_eq!(technical, vec!["Q1", "Q3"]);
    }

    #[test]
    fn test_match_score_is_clamped() {
        let m: MatchResult = serde_json::from_value(json!({
            "match_score": 140,
            "verdict": "Good Match",
            "should_apply": true
        }))
        .unwrap();
        assert_eq!(m.match_score, 100);
        assert!(m.should_apply);
    }
}
