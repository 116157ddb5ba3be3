use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// Prefix marking a descending sort, e.g. `-createdAt`.
const DESCENDING_MARKER: char = '-';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("page must be 1 or greater")]
    InvalidPage,
    #[error("limit must be greater than 0")]
    InvalidLimit,
    #[error("sort key cannot be empty")]
    EmptySortKey,
    #[error("unknown filter '{0}'")]
    UnknownFilter(String),
    #[error("'{value}' is not a valid option for filter '{key}' (expected one of: {options})")]
    InvalidFilterOption {
        key: String,
        value: String,
        options: String,
    },
    #[error("filters are written as key=value, got '{0}'")]
    MalformedFilter(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

impl SortKey {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }
}

impl FromStr for SortKey {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (field, descending) = match s.strip_prefix(DESCENDING_MARKER) {
            | Some(rest) => (rest, true),
            | None => (s, false),
        };
        if field.is_empty() {
            return Err(QueryError::EmptySortKey);
        }
        Ok(Self {
            field: field.to_owned(),
            descending,
        })
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "{}{}", DESCENDING_MARKER, self.field)
        } else {
            write!(f, "{}", self.field)
        }
    }
}

/// Parses a `key=value` filter argument.
pub fn parse_filter(raw: &str) -> Result<(String, String), QueryError> {
    match raw.split_once('=') {
        | Some((k, v)) if !k.trim().is_empty() => {
            Ok((k.trim().to_owned(), v.trim().to_owned()))
        }
        | _ => Err(QueryError::MalformedFilter(raw.to_owned())),
    }
}

/// A snapshot of everything a list request is parameterized by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub sort: Option<SortKey>,
    pub search: Option<String>,
    pub filters: BTreeMap<String, String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort: None,
            search: None,
            filters: BTreeMap::new(),
        }
    }
}

impl ListQuery {
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.page < 1 {
            return Err(QueryError::InvalidPage);
        }
        if self.limit == 0 {
            return Err(QueryError::InvalidLimit);
        }
        Ok(())
    }

    /// Serializes the query into request parameters, in the order
    /// `page, limit, search, sort, <filters...>`. Blank search and absent
    /// sort are left out.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_owned(), self.page.to_string()),
            ("limit".to_owned(), self.limit.to_string()),
        ];
        if let Some(search) = self.search.as_deref() {
            if !search.trim().is_empty() {
                pairs.push(("search".to_owned(), search.to_owned()));
            }
        }
        if let Some(ref sort) = self.sort {
            pairs.push(("sort".to_owned(), sort.to_string()));
        }
        for (k, v) in &self.filters {
            pairs.push((k.clone(), v.clone()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;

    #[test]
    fn test_sort_key_parsing() -> Result<()> {
        let key: SortKey = "-createdAt".parse()?;
        assert_eq!(SortKey::descending("createdAt"), key);
        assert_eq!("-createdAt", key.to_string());

        let key: SortKey = "name".parse()?;
        assert_eq!(SortKey::ascending("name"), key);
        assert_eq!("name", key.to_string());

        assert_eq!(Err(QueryError::EmptySortKey), "-".parse::<SortKey>());
        assert_eq!(Err(QueryError::EmptySortKey), "  ".parse::<SortKey>());
        Ok(())
    }

    #[test]
    fn test_query_pairs() {
        let mut query = ListQuery {
            page: 2,
            limit: 25,
            sort: Some(SortKey::descending("createdAt")),
            search: Some("camp".to_owned()),
            ..Default::default()
        };
        query.filters.insert("status".into(), "pending".into());
        query.filters.insert("difficulty".into(), "easy".into());

        let pairs = query.query_pairs();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        // filters come out in key order after the fixed parameters
        assert_eq!(
            vec!["page", "limit", "search", "sort", "difficulty", "status"],
            keys
        );
        assert_eq!(("sort".to_owned(), "-createdAt".to_owned()), pairs[3]);
    }

    #[test]
    fn test_blank_search_is_omitted() {
        let query = ListQuery {
            search: Some("   ".to_owned()),
            ..Default::default()
        };
        let pairs = query.query_pairs();
        assert_eq!(2, pairs.len());
        assert!(pairs.iter().all(|(k, _)| k != "search"));
    }

    #[test]
    fn test_validate() {
        assert!(ListQuery::default().validate().is_ok());
        let query = ListQuery {
            page: 0,
            ..Default::default()
        };
        assert_eq!(Err(QueryError::InvalidPage), query.validate());
        let query = ListQuery {
            limit: 0,
            ..Default::default()
        };
        assert_eq!(Err(QueryError::InvalidLimit), query.validate());
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            Ok(("status".to_owned(), "pending".to_owned())),
            parse_filter("status = pending")
        );
        assert!(parse_filter("status").is_err());
        assert!(parse_filter("=pending").is_err());
    }
}
