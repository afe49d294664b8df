//! Line-command grammar for the interactive driver.

use std::path::PathBuf;

use crate::models::documents::Tone;
use crate::models::search::SortOrder;
use crate::workflow::stages::Stage;

/// Free text argument: inline, or `@path` to read it from a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextArg {
    Inline(String),
    File(PathBuf),
}

impl TextArg {
    fn parse(rest: &str) -> Option<TextArg> {
        let rest = rest.trim();
        if rest.is_empty() {
            return None;
        }
        Some(match rest.strip_prefix('@') {
            Some(path) => TextArg::File(PathBuf::from(path.trim())),
            None => TextArg::Inline(rest.to_string()),
        })
    }

    pub async fn resolve(&self) -> std::io::Result<String> {
        match self {
            TextArg::Inline(text) => Ok(text.clone()),
            TextArg::File(path) => tokio::fs::read_to_string(path).await,
        }
    }
}

/// Search filters typed after `search`. Unset fields keep the form's value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchArgs {
    pub keywords: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub sort: Option<SortOrder>,
    pub full_time: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upload(PathBuf),
    Stage(Stage),
    Match(Option<TextArg>),
    Toggle(usize),
    Rewrite(Option<String>),
    Tailor(Option<TextArg>),
    Export(Option<String>),
    Cover(Tone, Option<TextArg>),
    Interview(Option<TextArg>),
    Search(SearchArgs),
    More,
    Save(usize),
    Unsave(String),
    Saved,
    Reset,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  upload <path>                 analyze a resume (PDF or text)
  stage <name>                  overview | ats | match | rewrite | tailor | cover | interview | jobs | saved
  match <jd | @file>            score the resume against a job description
  toggle <n>                    select/deselect weak bullet #n
  rewrite [job title]           rewrite the selected bullets
  tailor <jd | @file>           tailor the resume, then re-score it
  export [filename]             download the tailored resume as PDF
  cover <tone> <jd | @file>     professional | conversational | enthusiastic
  interview <jd | @file>        generate interview questions
  search [keywords] [location=..] [country=..] [sort=date|salary|relevance] [fulltime]
  more                          load the next page of results
  save <n>                      bookmark search result #n (again to remove it)
  unsave <id>                   remove a bookmark
  saved                         list bookmarks
  reset                         start over with a new resume
  status                        show the session
  quit";

/// Parses one input line. `Ok(None)` for blank lines.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match verb.to_ascii_lowercase().as_str() {
        "upload" => {
            if rest.is_empty() {
                return Err("usage: upload <path>".to_string());
            }
            Command::Upload(PathBuf::from(rest))
        }
        "stage" => Command::Stage(
            Stage::parse(rest).ok_or_else(|| format!("unknown stage '{rest}'"))?,
        ),
        "match" => Command::Match(TextArg::parse(rest)),
        "toggle" => Command::Toggle(parse_index(rest)?),
        "rewrite" => Command::Rewrite(non_empty(rest)),
        "tailor" => Command::Tailor(TextArg::parse(rest)),
        "export" => Command::Export(non_empty(rest)),
        "cover" => {
            let (tone, jd) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let tone = Tone::parse(tone).ok_or_else(|| {
                "usage: cover <professional|conversational|enthusiastic> <jd>".to_string()
            })?;
            Command::Cover(tone, TextArg::parse(jd))
        }
        "interview" => Command::Interview(TextArg::parse(rest)),
        "search" => Command::Search(parse_search(rest)?),
        "more" => Command::More,
        "save" => Command::Save(parse_index(rest)?),
        "unsave" => Command::Unsave(
            non_empty(rest).ok_or_else(|| "usage: unsave <id>".to_string())?,
        ),
        "saved" => Command::Saved,
        "reset" => Command::Reset,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(Some(command))
}

fn non_empty(rest: &str) -> Option<String> {
    (!rest.is_empty()).then(|| rest.to_string())
}

/// 1-based on the command line, 0-based internally.
fn parse_index(rest: &str) -> Result<usize, String> {
    match rest.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("expected a number from 1, got '{rest}'")),
    }
}

fn parse_search(rest: &str) -> Result<SearchArgs, String> {
    let mut args = SearchArgs::default();
    let mut keywords = Vec::new();

    for token in rest.split_whitespace() {
        match token.split_once('=') {
            Some(("location", v)) => args.location = Some(v.replace('+', " ")),
            Some(("country", v)) => args.country = Some(v.to_lowercase()),
            Some(("sort", v)) => {
                args.sort = Some(SortOrder::parse(v).ok_or_else(|| format!("unknown sort '{v}'"))?)
            }
            Some((key, _)) => return Err(format!("unknown search filter '{key}'")),
            None if token.eq_ignore_ascii_case("fulltime") => args.full_time = true,
            None => keywords.push(token),
        }
    }

    if !keywords.is_empty() {
        args.keywords = Some(keywords.join(" "));
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line_is_nothing() {
        assert_eq!(parse("   "), Ok(None));
    }

    #[test]
    fn test_indices_are_one_based() {
        assert_eq!(parse("toggle 1"), Ok(Some(Command::Toggle(0))));
        assert!(parse("save 0").is_err());
        assert!(parse("save x").is_err());
    }

    #[test]
    fn test_text_argument_inline_or_file() {
        assert_eq!(
            parse("match Rust engineer with Kafka"),
            Ok(Some(Command::Match(Some(TextArg::Inline(
                "Rust engineer with Kafka".to_string()
            )))))
        );
        assert_eq!(
            parse("tailor @jd.txt"),
            Ok(Some(Command::Tailor(Some(TextArg::File(PathBuf::from("jd.txt"))))))
        );
        assert_eq!(parse("interview"), Ok(Some(Command::Interview(None))));
    }

    #[test]
    fn test_cover_requires_a_known_tone() {
        assert_eq!(
            parse("cover enthusiastic Backend role"),
            Ok(Some(Command::Cover(
                Tone::Enthusiastic,
                Some(TextArg::Inline("Backend role".to_string()))
            )))
        );
        assert!(parse("cover sarcastic Backend role").is_err());
    }

    #[test]
    fn test_search_filters() {
        let Ok(Some(Command::Search(args))) =
            parse("search rust engineer location=San+Francisco sort=salary fulltime")
        else {
            panic!("search should parse");
        };
        assert_eq!(args.keywords.as_deref(), Some("rust engineer"));
        assert_eq!(args.location.as_deref(), Some("San Francisco"));
        assert_eq!(args.sort, Some(SortOrder::Salary));
        assert!(args.full_time);
        assert!(parse("search salary=lots").is_err());
    }

    #[test]
    fn test_bare_search_keeps_form_keywords() {
        assert_eq!(
            parse("search"),
            Ok(Some(Command::Search(SearchArgs::default())))
        );
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(
            parse("stage interview"),
            Ok(Some(Command::Stage(Stage::InterviewPrep)))
        );
        assert!(parse("stage upload").is_err());
    }
}
