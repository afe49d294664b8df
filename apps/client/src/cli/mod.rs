//! Interactive line-command driver.
//!
//! Reads commands from stdin and drives the orchestrator. Remote operations
//! run as their own tasks so several stages can be in flight at once; their
//! results are printed when they land.

pub mod command;
pub mod render;

use std::future::Future;
use std::path::Path;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::documents::Document;
use crate::models::search::SearchParams;
use crate::state::AppState;
use crate::workflow::stages::{Screen, Stage};
use crate::workflow::WorkflowOrchestrator;

use command::{Command, SearchArgs, TextArg, HELP};

pub async fn run(state: AppState) -> Result<()> {
    println!("ApplyEdge v{} · server {}", env!("CARGO_PKG_VERSION"), state.config.api_url);
    show_stage(&state.orchestrator);
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(usage) => {
                println!("{usage}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        dispatch(&state, command).await;
    }

    info!("Driver finished");
    Ok(())
}

async fn dispatch(app: &AppState, command: Command) {
    let orch = app.orchestrator.clone();
    match command {
        Command::Upload(path) => upload(orch, &path).await,
        Command::Stage(stage) => match orch.select_stage(stage) {
            Ok(()) => show_stage(&orch),
            Err(e) => report(&e),
        },
        Command::Toggle(index) => match orch.toggle_bullet(index) {
            Ok(_) => show_stage(&orch),
            Err(e) => report(&e),
        },
        Command::Match(jd) => {
            with_text(jd, move |jd| async move {
                let m = orch.run_match(&jd).await?;
                Ok::<_, AppError>(render::job_match(&m))
            })
            .await
        }
        Command::Rewrite(title) => {
            if let Some(title) = title {
                if let Err(e) = orch.set_target_title(&title) {
                    report(&e);
                    return;
                }
            }
            background(async move {
                let r = orch.run_rewrite().await?;
                Ok::<_, AppError>(render::rewrite(&r))
            });
        }
        Command::Tailor(jd) => {
            with_text(jd, move |jd| async move {
                let t = orch.run_tailor(&jd).await?;
                Ok::<_, AppError>(render::tailor(&t, None, true))
            })
            .await
        }
        Command::Export(name) => {
            background(async move {
                let doc = orch.export_tailored(name.as_deref()).await?;
                tokio::fs::write(&doc.filename, &doc.bytes)
                    .await
                    .map_err(|e| AppError::Internal(e.into()))?;
                Ok::<_, AppError>(format!("Wrote {} ({} bytes)", doc.filename, doc.bytes.len()))
            });
        }
        Command::Cover(tone, jd) => {
            with_text(jd, move |jd| async move {
                let c = orch.run_cover_letter(&jd, tone).await?;
                Ok::<_, AppError>(render::cover_letter(&c))
            })
            .await
        }
        Command::Interview(jd) => {
            with_text(jd, move |jd| async move {
                let i = orch.run_interview(&jd).await?;
                Ok::<_, AppError>(render::interview(&i))
            })
            .await
        }
        Command::Search(args) => {
            let params = orch.view(|s| merge_search(&s.search.form, args));
            background(async move {
                let session = orch.search(params).await?;
                Ok::<_, AppError>(render::search(&session, &orch.search_results_with_saved()))
            });
        }
        Command::More => {
            background(async move {
                let session = orch.load_more().await?;
                Ok::<_, AppError>(render::search(&session, &orch.search_results_with_saved()))
            });
        }
        Command::Save(index) => {
            let rows = orch.search_results_with_saved();
            match rows.into_iter().nth(index) {
                Some((job, _)) => match orch.toggle_saved(job).await {
                    Ok(true) => println!("Saved ({} total)", orch.saved_count()),
                    Ok(false) => println!("Removed ({} saved)", orch.saved_count()),
                    Err(e) => report(&e),
                },
                None => println!("No search result #{}", index + 1),
            }
        }
        Command::Unsave(id) => match orch.unsave_job(&id).await {
            Ok(()) => println!("Removed ({} saved)", orch.saved_count()),
            Err(e) => report(&e),
        },
        Command::Saved => print!("{}", render::saved(&orch.saved_jobs())),
        Command::Reset => {
            orch.reset();
            show_stage(&orch);
        }
        Command::Status => status(app),
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}

async fn upload(orch: WorkflowOrchestrator, path: &Path) {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            println!("Could not read {}: {e}", path.display());
            return;
        }
    };
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let document = Document::from_file(filename, bytes);

    let (tx, mut rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(p) = rx.recv().await {
            println!("{}", render::progress(p));
        }
    });

    background(async move {
        let analysis = orch.upload(document, Some(&tx)).await?;
        Ok::<_, AppError>(render::analysis(&analysis))
    });
}

/// Resolves the job description text, then runs the operation in the background.
async fn with_text<F, Fut>(text: Option<TextArg>, op: F)
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<String, AppError>> + Send + 'static,
{
    let text = match text {
        Some(arg) => match arg.resolve().await {
            Ok(text) => text,
            Err(e) => {
                println!("Could not read job description: {e}");
                return;
            }
        },
        None => String::new(),
    };
    background(op(text));
}

fn background<Fut>(op: Fut)
where
    Fut: Future<Output = Result<String, AppError>> + Send + 'static,
{
    tokio::spawn(async move {
        match op.await {
            Ok(rendered) => print!("{rendered}"),
            Err(e) => report(&e),
        }
    });
}

fn report(err: &AppError) {
    debug!("{}: {err}", err.code());
    println!("⚠ {}", err.inline_message());
}

fn show_stage(orch: &WorkflowOrchestrator) {
    print!("{}", orch.view(render::stage));
}

fn status(app: &AppState) {
    let orch = &app.orchestrator;
    println!("Session {}", orch.session_id());
    match (orch.filename(), orch.analysis()) {
        (Some(name), Some(a)) => println!("Resume: {name} ({}/100)", a.overall_score),
        _ => println!("Resume: none"),
    }
    match orch.screen() {
        Screen::Upload => println!("Screen: upload"),
        Screen::Results(stage) => println!("Screen: {}", stage.label()),
    }
    orch.view(|s| {
        if let Some(name) = &s.uploading {
            println!("Analyzing {name}…");
        }
        if let Some(e) = &s.upload_error {
            println!("Last upload failed: {e}");
        }
        let pending: Vec<&str> = [
            (s.job_match.slot.pending, Stage::JobMatch),
            (s.rewrite.slot.pending, Stage::BulletRewrite),
            (s.tailor.slot.pending || s.tailor.exporting, Stage::Tailor),
            (s.cover_letter.slot.pending, Stage::CoverLetter),
            (s.interview.slot.pending, Stage::InterviewPrep),
            (s.search.pending, Stage::FindJobs),
        ]
        .into_iter()
        .filter(|(busy, _)| *busy)
        .map(|(_, stage)| stage.label())
        .collect();
        if !pending.is_empty() {
            println!("In flight: {}", pending.join(", "));
        }
    });
    println!("Saved jobs: {}", orch.saved_count());
}

/// Command-line filters layered over the current form.
fn merge_search(form: &SearchParams, args: SearchArgs) -> SearchParams {
    SearchParams {
        keywords: args.keywords.unwrap_or_else(|| form.keywords.clone()),
        location: args.location.unwrap_or_else(|| form.location.clone()),
        country: args.country.unwrap_or_else(|| form.country.clone()),
        sort: args.sort.unwrap_or(form.sort),
        full_time: args.full_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::search::SortOrder;

    #[test]
    fn test_merge_search_keeps_unset_form_fields() {
        let form = SearchParams {
            location: "Berlin".to_string(),
            ..SearchParams::with_keywords("Rust Kubernetes")
        };
        let merged = merge_search(
            &form,
            SearchArgs {
                sort: Some(SortOrder::Salary),
                ..SearchArgs::default()
            },
        );
        assert_eq!(merged.keywords, "Rust Kubernetes");
        assert_eq!(merged.location, "Berlin");
        assert_eq!(merged.sort, SortOrder::Salary);
        assert!(!merged.full_time);
    }
}
