//! URI matching: exact (normalized) or regex.

use crate::error::Result;
use crate::query::{parse_query_string, QueryMap};
use crate::uri::{variations, NormalizedUri};
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Query parameters supplied as a mapping or a raw query string.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParams {
    Map(QueryMap),
    Raw(String),
}

impl QueryParams {
    pub fn into_map(self) -> QueryMap {
        match self {
            QueryParams::Map(map) => map,
            QueryParams::Raw(raw) => parse_query_string(raw.trim_start_matches('?')),
        }
    }
}

impl From<QueryMap> for QueryParams {
    fn from(map: QueryMap) -> Self {
        QueryParams::Map(map)
    }
}

impl From<&str> for QueryParams {
    fn from(raw: &str) -> Self {
        QueryParams::Raw(raw.to_string())
    }
}

impl From<String> for QueryParams {
    fn from(raw: String) -> Self {
        QueryParams::Raw(raw)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        QueryParams::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
        )
    }
}

/// URI matching strategy.
#[derive(Debug, Clone)]
pub enum UriMatcher {
    /// Structural equality with a normalized URI.
    Exact(NormalizedUri),
    /// Regex tested against every textual variation of the URI, plus an
    /// optional query mapping that must be equal to the URI's.
    Regex {
        regex: Arc<Regex>,
        query: Option<QueryMap>,
    },
}

impl UriMatcher {
    pub fn exact(uri: &str) -> Result<Self> {
        Ok(UriMatcher::Exact(NormalizedUri::parse(uri)?))
    }

    pub fn exact_normalized(uri: NormalizedUri) -> Self {
        UriMatcher::Exact(uri)
    }

    pub fn regex(pattern: &str) -> Result<Self> {
        Ok(Self::from_regex(Regex::new(pattern)?))
    }

    pub fn from_regex(regex: Regex) -> Self {
        UriMatcher::Regex {
            regex: Arc::new(regex),
            query: None,
        }
    }

    pub fn matches(&self, uri: &NormalizedUri) -> bool {
        match self {
            UriMatcher::Exact(expected) => expected == uri,
            UriMatcher::Regex { regex, query } => {
                variations(uri).iter().any(|candidate| regex.is_match(candidate))
                    && query.as_ref().is_none_or(|expected| expected == uri.query())
            }
        }
    }

    /// Add query parameters.
    ///
    /// The exact strategy merges them into the URI's query (incoming keys
    /// win). The regex strategy replaces any earlier requirement outright.
    pub fn add_query_params(&mut self, params: impl Into<QueryParams>) {
        let params = params.into().into_map();
        match self {
            UriMatcher::Exact(uri) => uri.merge_query(params),
            UriMatcher::Regex { query, .. } => *query = Some(params),
        }
    }
}

impl fmt::Display for UriMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UriMatcher::Exact(uri) => write!(f, "{uri}"),
            UriMatcher::Regex { regex, query } => {
                write!(f, "/{}/", regex.as_str())?;
                if let Some(query) = query {
                    write!(f, " with query params {}", Value::Object(query.clone()))?;
                }
                Ok(())
            }
        }
    }
}
