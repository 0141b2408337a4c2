//! Pagination query and the envelopes every endpoint wraps its payload in.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Backend response envelope: the payload is `results[0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ResultsEnvelope<T> {
    #[serde(default)]
    pub results: Vec<T>,
}

impl<T> ResultsEnvelope<T> {
    pub fn into_first(self) -> Option<T> {
        self.results.into_iter().next()
    }
}

/// Filter parameters for `get-by-filter` / `filter` list endpoints.
///
/// Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page_number: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search_term: None,
            is_active: None,
        }
    }
}

impl PageQuery {
    pub fn page(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number: page_number.max(1),
            page_size: page_size.max(1),
            ..Self::default()
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search_term = (!term.trim().is_empty()).then_some(term);
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    /// Query-string pairs in wire order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("pageNumber".to_string(), self.page_number.to_string()),
            ("pageSize".to_string(), self.page_size.to_string()),
        ];
        if let Some(term) = &self.search_term {
            pairs.push(("searchTerm".to_string(), term.clone()));
        }
        if let Some(is_active) = self.is_active {
            pairs.push(("isActive".to_string(), is_active.to_string()));
        }
        pairs
    }
}

/// One page of a list endpoint. `totalCount` is the only total field honoured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default)]
    pub items: Vec<T>,
    #[serde(default)]
    pub total_count: u64,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
        }
    }

    pub fn total_pages(&self, page_size: u32) -> u64 {
        let size = u64::from(page_size.max(1));
        self.total_count.div_ceil(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_skip_unset_filters() {
        let pairs = PageQuery::page(2, 25).to_pairs();
        assert_eq!(
            pairs,
            vec![
                ("pageNumber".to_string(), "2".to_string()),
                ("pageSize".to_string(), "25".to_string()),
            ]
        );
    }

    #[test]
    fn query_pairs_include_search_and_status() {
        let pairs = PageQuery::default().search("shoe").active(false).to_pairs();
        assert!(pairs.contains(&("searchTerm".to_string(), "shoe".to_string())));
        assert!(pairs.contains(&("isActive".to_string(), "false".to_string())));
    }

    #[test]
    fn blank_search_is_dropped() {
        assert_eq!(PageQuery::default().search("   ").search_term, None);
    }

    #[test]
    fn page_zero_is_clamped() {
        let query = PageQuery::page(0, 0);
        assert_eq!(query.page_number, 1);
        assert_eq!(query.page_size, 1);
    }

    #[test]
    fn parses_envelope_with_total_count() {
        let json = r#"{"results":[{"items":[1,2,3],"totalCount":23}]}"#;
        let envelope: ResultsEnvelope<Page<u32>> = serde_json::from_str(json).unwrap();
        let page = envelope.into_first().unwrap();
        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.total_count, 23);
        assert_eq!(page.total_pages(10), 3);
    }

    #[test]
    fn decodes_records_without_default() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Token {
            value: String,
        }

        let json = r#"{"results":[{"items":[{"value":"a"}],"totalCount":1}]}"#;
        let page = serde_json::from_str::<ResultsEnvelope<Page<Token>>>(json)
            .unwrap()
            .into_first()
            .unwrap();
        assert_eq!(page.items, vec![Token { value: "a".to_string() }]);

        let empty: ResultsEnvelope<Token> = serde_json::from_str("{}").unwrap();
        assert!(empty.into_first().is_none());
    }

    #[test]
    fn missing_total_defaults_to_zero() {
        let page: Page<u32> = serde_json::from_str(r#"{"items":[],"total":5}"#).unwrap();
        assert_eq!(page.total_count, 0);
    }
}
