//! Plain-text rendering of session state for the terminal driver.

use std::fmt::Write;

use chrono::Utc;

use crate::models::analysis::{AnalysisResult, ScoreBand};
use crate::models::documents::{
    CoverLetterResult, InterviewResult, MatchResult, QuestionCategory, RewriteResult,
    TailorResult, Tone,
};
use crate::models::job::JobListing;
use crate::workflow::comparator::ScoreComparison;
use crate::workflow::pager::SearchSession;
use crate::workflow::pipeline::Progress;
use crate::workflow::stages::{Screen, SessionState, Stage};

pub fn progress(p: Progress) -> String {
    format!("[{:>3}%] {}", p.percent, p.label)
}

fn score_line(label: &str, score: u8) -> String {
    format!(
        "  {label:<20} {score:>3}/100  {}",
        ScoreBand::from_score(score).label()
    )
}

fn bullets(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "{heading}:");
    for item in items {
        let _ = writeln!(out, "  • {item}");
    }
}

pub fn analysis(a: &AnalysisResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Overall score: {}/100 ({})",
        a.overall_score,
        a.band().label()
    );
    for (label, score) in a.dimension_scores.entries() {
        let _ = writeln!(out, "{}", score_line(label, score));
    }
    let _ = writeln!(
        out,
        "Experience: {} years · Education: {}",
        a.experience_years, a.education
    );
    bullets(&mut out, "Strengths", &a.strengths);
    bullets(&mut out, "Weaknesses", &a.weaknesses);
    bullets(&mut out, "Missing sections", &a.missing_sections);
    if !a.improvement_tips.is_empty() {
        let _ = writeln!(out, "Tips:");
        for tip in &a.improvement_tips {
            let _ = writeln!(out, "  [{}] {}", tip.area, tip.tip);
        }
    }
    out
}

pub fn ats(a: &AnalysisResult) -> String {
    let mut out = score_line("ATS Compatibility", a.dimension_scores.ats_compatibility);
    out.push('\n');
    if a.ats_issues.is_empty() {
        out.push_str("No ATS issues found.\n");
    } else {
        bullets(&mut out, "Issues", &a.ats_issues);
    }
    if !a.skills.technical.is_empty() {
        let _ = writeln!(out, "Technical skills: {}", a.skills.technical.join(", "));
    }
    if !a.skills.soft.is_empty() {
        let _ = writeln!(out, "Soft skills: {}", a.skills.soft.join(", "));
    }
    out
}

pub fn job_match(m: &MatchResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Match: {}% · {} · {}",
        m.match_score,
        m.verdict,
        if m.should_apply { "apply" } else { "hold off" }
    );
    if !m.summary.is_empty() {
        let _ = writeln!(out, "{}", m.summary);
    }
    bullets(&mut out, "Matched skills", &m.matched_skills);
    bullets(&mut out, "Missing skills", &m.missing_skills);
    bullets(&mut out, "Missing keywords", &m.missing_keywords);
    bullets(&mut out, "Recommendations", &m.recommendations);
    out
}

pub fn weak_bullets(a: &AnalysisResult, selected: &[usize]) -> String {
    let mut out = String::new();
    if a.weak_bullets.is_empty() {
        out.push_str("No weak bullets found.\n");
    }
    for (i, bullet) in a.weak_bullets.iter().enumerate() {
        let mark = if selected.contains(&i) { "x" } else { " " };
        let _ = writeln!(out, "  [{mark}] {}. {bullet}", i + 1);
    }
    out
}

pub fn rewrite(r: &RewriteResult) -> String {
    let mut out = String::new();
    for rw in &r.rewrites {
        let _ = writeln!(out, "- {}\n+ {}", rw.original, rw.improved);
        if !rw.reason.is_empty() {
            let _ = writeln!(out, "  ({})", rw.reason);
        }
    }
    out
}

pub fn tailor(t: &TailorResult, comparison: Option<&ScoreComparison>, rescoring: bool) -> String {
    let mut out = String::new();
    if !t.match_improvement.is_empty() {
        let _ = writeln!(out, "{}", t.match_improvement);
    }
    match (comparison, rescoring) {
        (Some(c), _) => {
            let _ = writeln!(
                out,
                "Score: {} → {} ({}, {:?})",
                c.original,
                c.score,
                c.delta_label(),
                c.classification
            );
        }
        (None, true) => out.push_str("Re-scoring tailored resume…\n"),
        (None, false) => {}
    }
    bullets(&mut out, "Changes", &t.changes_made);
    bullets(&mut out, "Keywords added", &t.keywords_added);
    let _ = writeln!(out, "\n{}", emphasize(&t.tailored_resume, &t.bold_keywords));
    out
}

/// Wraps each occurrence of a keyword in `**`. Longer keywords win on overlap.
fn emphasize(text: &str, keywords: &[String]) -> String {
    let mut keywords: Vec<&str> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect();
    keywords.sort_by_key(|k| std::cmp::Reverse(k.len()));

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    'scan: while let Some(ch) = rest.chars().next() {
        for &keyword in &keywords {
            if rest.starts_with(keyword) {
                let _ = write!(out, "**{keyword}**");
                rest = &rest[keyword.len()..];
                continue 'scan;
            }
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    out
}

pub fn tones(current: Tone) -> String {
    let mut out = String::new();
    for tone in Tone::ALL {
        let mark = if tone == current { ">" } else { " " };
        let _ = writeln!(out, "{mark} {:<15} {}", tone.as_str(), tone.description());
    }
    out
}

pub fn cover_letter(c: &CoverLetterResult) -> String {
    let mut out = String::new();
    if !c.subject_line.is_empty() {
        let _ = writeln!(out, "Subject: {}", c.subject_line);
    }
    if !c.job_title.is_empty() || !c.company_name.is_empty() {
        let _ = writeln!(out, "For: {} at {}", c.job_title, c.company_name);
    }
    bullets(&mut out, "Key requirements", &c.key_requirements);
    let _ = writeln!(out, "\n{}", c.cover_letter);
    out
}

pub fn interview(i: &InterviewResult) -> String {
    let mut out = String::new();
    if !i.role.is_empty() {
        let _ = writeln!(out, "Role: {}", i.role);
    }
    bullets(&mut out, "Topics to study", &i.key_topics_to_study);
    bullets(&mut out, "Red flags to avoid", &i.red_flags_to_avoid);
    let mut n = 0;
    for category in QuestionCategory::ALL {
        let questions = i.by_category(category);
        if questions.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{category:?} ({})", questions.len());
        for q in questions {
            n += 1;
            let _ = writeln!(out, "  Q{n}. {}", q.question);
            if !q.ideal_answer.is_empty() {
                let _ = writeln!(out, "      A: {}", q.ideal_answer);
            }
            if !q.tip.is_empty() {
                let _ = writeln!(out, "      Tip: {}", q.tip);
            }
        }
    }
    out
}

pub fn listing(n: usize, job: &JobListing, saved: bool) -> String {
    let now = Utc::now();
    let mut meta = vec![job.company.clone(), job.location.clone()];
    meta.extend(job.salary_label());
    meta.extend(job.posted_label(now));
    meta.extend(job.contract.clone());
    meta.retain(|m| !m.is_empty());
    format!(
        "{n:>3}. {}{}\n     {}\n     {}",
        job.title,
        if saved { "  ★ saved" } else { "" },
        meta.join(" · "),
        job.url
    )
}

pub fn search(session: &SearchSession, rows: &[(JobListing, bool)]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} of {} jobs for \"{}\"",
        session.results.len(),
        session.total,
        session.params.keywords
    );
    if session.filtered_out > 0 {
        let _ = writeln!(out, "({} listings filtered out)", session.filtered_out);
    }
    for (i, (job, saved)) in rows.iter().enumerate() {
        let _ = writeln!(out, "{}", listing(i + 1, job, *saved));
    }
    if session.has_more() {
        let _ = writeln!(out, "{} more; type 'more' to load the next page", session.remaining());
    }
    out
}

pub fn saved(jobs: &[JobListing]) -> String {
    if jobs.is_empty() {
        return "No saved jobs yet.\n".to_string();
    }
    let mut out = String::new();
    for (i, job) in jobs.iter().enumerate() {
        let _ = writeln!(out, "{}   [{}]", listing(i + 1, job, true), job.id);
    }
    out
}

/// Shows the visible stage with whatever it currently holds.
pub fn stage(state: &SessionState) -> String {
    let Screen::Results(stage) = state.screen else {
        return "Upload a resume to begin: upload <path>\n".to_string();
    };
    let Some(a) = &state.analysis else {
        return String::new();
    };

    let mut out = format!("── {} ──\n", stage.label());
    let (pending, error) = match stage {
        Stage::Overview => {
            out.push_str(&analysis(a));
            (false, None)
        }
        Stage::AtsCheck => {
            out.push_str(&ats(a));
            (false, None)
        }
        Stage::JobMatch => {
            if let Some(m) = &state.job_match.slot.result {
                out.push_str(&job_match(m));
            }
            (state.job_match.slot.pending, state.job_match.slot.error.as_ref())
        }
        Stage::BulletRewrite => {
            out.push_str(&weak_bullets(a, &state.rewrite.selected));
            if !state.rewrite.job_title.is_empty() {
                let _ = writeln!(out, "Target title: {}", state.rewrite.job_title);
            }
            if let Some(r) = &state.rewrite.slot.result {
                out.push_str(&rewrite(r));
            }
            (state.rewrite.slot.pending, state.rewrite.slot.error.as_ref())
        }
        Stage::Tailor => {
            let t = &state.tailor;
            if let Some(result) = &t.slot.result {
                out.push_str(&tailor(result, t.comparison.as_ref(), t.rescoring));
            }
            if let Some(e) = &t.export_error {
                let _ = writeln!(out, "Export failed: {e}");
            }
            (t.slot.pending, t.slot.error.as_ref())
        }
        Stage::CoverLetter => {
            out.push_str(&tones(state.cover_letter.tone));
            if let Some(c) = &state.cover_letter.slot.result {
                out.push_str(&cover_letter(c));
            }
            (
                state.cover_letter.slot.pending,
                state.cover_letter.slot.error.as_ref(),
            )
        }
        Stage::InterviewPrep => {
            if let Some(i) = &state.interview.slot.result {
                out.push_str(&interview(i));
            }
            (state.interview.slot.pending, state.interview.slot.error.as_ref())
        }
        Stage::FindJobs => {
            let _ = writeln!(out, "Suggested keywords: {}", state.search.form.keywords);
            if let Some(session) = state.search.pager.session() {
                let _ = writeln!(
                    out,
                    "{} of {} loaded",
                    session.results.len(),
                    session.total
                );
            }
            (state.search.pending, state.search.error.as_ref())
        }
        Stage::SavedJobs => (false, None),
    };

    if pending {
        out.push_str("Working…\n");
    }
    if let Some(e) = error {
        let _ = writeln!(out, "⚠ {e}");
    }
    out
}
