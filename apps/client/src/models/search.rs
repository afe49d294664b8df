use serde::{Deserialize, Serialize};

use crate::models::job::JobListing;

/// Results per page. Fixed by the product, not user-configurable.
pub const PAGE_SIZE: u32 = 12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Date,
    Salary,
    Relevance,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Date => "date",
            SortOrder::Salary => "salary",
            SortOrder::Relevance => "relevance",
        }
    }

    pub fn parse(value: &str) -> Option<SortOrder> {
        match value.trim().to_lowercase().as_str() {
            "date" => Some(SortOrder::Date),
            "salary" => Some(SortOrder::Salary),
            "relevance" => Some(SortOrder::Relevance),
            _ => None,
        }
    }
}

/// Filter set for one search session. Two sessions are the same query
/// iff their params are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub keywords: String,
    pub location: String,
    pub country: String,
    pub sort: SortOrder,
    pub full_time: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            keywords: String::new(),
            location: String::new(),
            country: "us".to_string(),
            sort: SortOrder::Date,
            full_time: false,
        }
    }
}

impl SearchParams {
    pub fn with_keywords(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            ..Self::default()
        }
    }

    /// Query string pairs for the search endpoint.
    pub fn query_pairs(&self, page: u32) -> Vec<(&'static str, String)> {
        vec![
            ("keywords", self.keywords.clone()),
            ("location", self.location.clone()),
            ("country", self.country.clone()),
            ("sort_by", self.sort.as_str().to_string()),
            ("full_time", if self.full_time { "1" } else { "0" }.to_string()),
            ("page", page.to_string()),
            ("results_per_page", PAGE_SIZE.to_string()),
        ]
    }
}

/// One page as reported by the search service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub results: Vec<JobListing>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub filtered_out: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_pairs_encode_flags_and_page_size() {
        let params = SearchParams {
            full_time: true,
            sort: SortOrder::Salary,
            ..SearchParams::with_keywords("rust engineer")
        };
        let pairs = params.query_pairs(3);
        assert!(pairs.contains(&("full_time", "1".to_string())));
        assert!(pairs.contains(&("sort_by", "salary".to_string())));
        assert!(pairs.contains(&("page", "3".to_string())));
        assert!(pairs.contains(&("results_per_page", "12".to_string())));
        assert!(pairs.contains(&("country", "us".to_string())));
    }

    #[test]
    fn test_search_page_defaults_missing_counters() {
        let page: SearchPage = serde_json::from_value(json!({
            "results": [{ "id": "1" }],
            "total": 47,
            "page": 1
        }))
        .unwrap();
        assert_eq!(page.total, 47);
        assert_eq!(page.filtered_out, 0);
        assert_eq!(page.results.len(), 1);
    }

    #[test]
    fn test_one_bad_timestamp_keeps_the_whole_page() {
        let body = r#"{"results":[
            {"id":"a","created":"2024-05-01T12:00:00Z"},
            {"id":"b","created":"yesterday-ish"}
        ],"total":2}"#;
        let page: SearchPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.results.len(), 2);
        assert!(page.results[0].created.is_some());
        assert!(page.results[1].created.is_none());
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse("Relevance"), Some(SortOrder::Relevance));
        assert_eq!(SortOrder::parse("newest"), None);
    }
}
