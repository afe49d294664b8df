//! Job listings as returned by the search service and stored as bookmarks.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// One search result or bookmark. `id` is the only equality key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobListing {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub contract: Option<String>,
}

impl PartialEq for JobListing {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for JobListing {}

impl JobListing {
    /// Salary range as `$90k – $120k`, `From $90k` or `Up to $120k`.
    /// A zero bound counts as absent.
    pub fn salary_label(&self) -> Option<String> {
        let min = self.salary_min.filter(|v| *v > 0.0);
        let max = self.salary_max.filter(|v| *v > 0.0);
        let fmt = |n: f64| format!("${}k", (n / 1000.0).round() as i64);
        match (min, max) {
            (Some(lo), Some(hi)) => Some(format!("{} – {}", fmt(lo), fmt(hi))),
            (Some(lo), None) => Some(format!("From {}", fmt(lo))),
            (None, Some(hi)) => Some(format!("Up to {}", fmt(hi))),
            (None, None) => None,
        }
    }

    /// How long ago the listing was posted, relative to `now`.
    pub fn posted_label(&self, now: DateTime<Utc>) -> Option<String> {
        let created = self.created?;
        let days = (now - created).num_days();
        let label = match days {
            i64::MIN..=0 => "Today".to_string(),
            1 => "Yesterday".to_string(),
            2..=6 => format!("{days}d ago"),
            7..=29 => format!("{}w ago", days / 7),
            _ => created.format("%b %-d").to_string(),
        };
        Some(label)
    }
}

/// Provider ids arrive as strings or bare numbers depending on the listing source.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
        Missing,
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Float(n) => n.to_string(),
        RawId::Missing => String::new(),
    })
}

/// The search service sends `""` for unknown timestamps. `created` is only
/// displayed, so anything unreadable is treated the same way instead of
/// failing the whole page.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    let Some(text) = raw.as_ref().and_then(|v| v.as_str()).map(str::trim) else {
        if let Some(other) = raw.filter(|v| !v.is_null()) {
            debug!("Ignoring non-text listing timestamp {other}");
        }
        return Ok(None);
    };
    if text.is_empty() {
        return Ok(None);
    }
    let parsed = DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S"))
                .map(|naive| naive.and_utc())
        });
    match parsed {
        Ok(created) => Ok(Some(created)),
        Err(e) => {
            debug!("Ignoring unreadable listing timestamp {text:?}: {e}");
            Ok(None)
        }
    }
}

fn deserialize_non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
pub(crate) fn sample_listing(id: &str) -> JobListing {
    JobListing {
        id: id.to_string(),
        title: format!("Engineer {id}"),
        company: "Acme".to_string(),
        location: "Remote".to_string(),
        description: "Build things".to_string(),
        url: format!("https://jobs.example.com/{id}"),
        salary_min: None,
        salary_max: None,
        created: None,
        category: None,
        contract: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_parses_search_payload_with_empty_fields() {
        let job: JobListing = serde_json::from_value(json!({
            "id": "4417284561",
            "title": "Backend Engineer",
            "company": "Acme",
            "location": "Austin, TX",
            "description": "Rust services...",
            "salary_min": 90000,
            "salary_max": null,
            "url": "https://example.com/job",
            "created": "",
            "category": "IT Jobs",
            "contract": ""
        }))
        .unwrap();
        assert_eq!(job.id, "4417284561");
        assert_eq!(job.created, None);
        assert_eq!(job.category.as_deref(), Some("IT Jobs"));
        assert_eq!(job.contract, None);
    }

    #[test]
    fn test_unreadable_timestamp_does_not_drop_the_listing() {
        let job: JobListing = serde_json::from_value(json!({
            "id": "1",
            "created": "last tuesday"
        }))
        .unwrap();
        assert_eq!(job.id, "1");
        assert_eq!(job.created, None);

        let job: JobListing =
            serde_json::from_value(json!({ "id": "2", "created": 1714564800 })).unwrap();
        assert_eq!(job.created, None);
    }

    #[test]
    fn test_space_separated_timestamp_is_read_as_utc() {
        let job: JobListing = serde_json::from_value(json!({
            "id": "1",
            "created": "2024-05-01 12:00:00"
        }))
        .unwrap();
        assert_eq!(
            job.created,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_missing_or_null_id_defaults_to_empty() {
        let job: JobListing = serde_json::from_value(json!({ "title": "Chef" })).unwrap();
        assert_eq!(job.id, "");
        let job: JobListing = serde_json::from_value(json!({ "id": null })).unwrap();
        assert_eq!(job.id, "");
    }

    #[test]
    fn test_numeric_id_is_stored_as_string() {
        let job: JobListing = serde_json::from_value(json!({ "id": 42 })).unwrap();
        assert_eq!(job.id, "42");
    }

    #[test]
    fn test_equality_is_by_id_only() {
        let a = sample_listing("7");
        let mut b = sample_listing("7");
        b.description = "Fresher text".to_string();
        assert_eq!(a, b);
        assert_ne!(a, sample_listing("8"));
    }

    #[test]
    fn test_salary_labels() {
        let mut job = sample_listing("1");
        assert_eq!(job.salary_label(), None);
        job.salary_min = Some(90_000.0);
        assert_eq!(job.salary_label().as_deref(), Some("From $90k"));
        job.salary_max = Some(120_400.0);
        assert_eq!(job.salary_label().as_deref(), Some("$90k – $120k"));
        job.salary_min = Some(0.0);
        assert_eq!(job.salary_label().as_deref(), Some("Up to $120k"));
    }

    #[test]
    fn test_posted_labels() {
        let now = Utc.with_ymd_and_hms(2026, 3, 20, 12, 0, 0).unwrap();
        let mut job = sample_listing("1");
        assert_eq!(job.posted_label(now), None);

        job.created = Some(now);
        assert_eq!(job.posted_label(now).as_deref(), Some("Today"));
        job.created = Some(now - chrono::Duration::days(1));
        assert_eq!(job.posted_label(now).as_deref(), Some("Yesterday"));
        job.created = Some(now - chrono::Duration::days(4));
        assert_eq!(job.posted_label(now).as_deref(), Some("4d ago"));
        job.created = Some(now - chrono::Duration::days(15));
        assert_eq!(job.posted_label(now).as_deref(), Some("2w ago"));
        job.created = Some(Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap());
        assert_eq!(job.posted_label(now).as_deref(), Some("Jan 5"));
    }
}
