//! Declarative request patterns loaded from YAML or JSON.
//!
//! ```yaml
//! method: post
//! uri: http://example.com/api
//! query: { page: "1" }
//! headers:
//!   Content-Type: application/json
//!   X-Trace: { matches: "^[0-9]+$" }
//! body:
//!   user:
//!     id: { matches: "\\d+" }
//! ```
//!
//! Exactly one of `uri` and `uriRegex` must be set. A `uriRegex` is tested
//! against whole URI strings, query included, so anchor the end with
//! `(\?|$)` rather than `$` when a query is expected. A leaf object whose
//! only key is `matches` is a regex; any other body object is a nested
//! mapping.

use crate::error::{PatternError, Result};
use crate::pattern::{
    BodyPattern, HeadersMatcher, PatternOptions, QueryParams, RequestPattern, UriMatcher,
    ValueMatcher,
};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

const REGEX_KEY: &str = "matches";

fn default_method() -> String {
    "any".to_string()
}

/// Query parameters as a mapping or a raw query string.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum QueryConfig {
    Raw(String),
    Map(Map<String, Value>),
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PatternConfig {
    /// Method token, or "any"
    #[serde(default = "default_method")]
    pub method: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_regex: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryConfig>,

    /// Header name to literal or `{ matches: regex }`. An empty mapping
    /// requires the request to carry no headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl PatternConfig {
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(contents).map_err(|e| PatternError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(contents).map_err(|e| PatternError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.json` files are parsed as JSON, anything else as YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pattern file {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
        .with_context(|| format!("Invalid pattern file {}", path.display()))?;

        debug!(path = %path.display(), pattern = ?config, "Loaded request pattern config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.method.trim().is_empty() {
            return Err(PatternError::Config("'method' must not be empty".to_string()));
        }
        match (&self.uri, &self.uri_regex) {
            (Some(_), Some(_)) => Err(PatternError::Config(
                "'uri' and 'uriRegex' are mutually exclusive".to_string(),
            )),
            (None, None) => Err(PatternError::Config(
                "one of 'uri' or 'uriRegex' is required".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Build the matcher. Regexes and the URI are compiled here.
    pub fn compile(&self) -> Result<RequestPattern> {
        self.validate()?;

        let uri = match (&self.uri, &self.uri_regex) {
            (Some(uri), None) => UriMatcher::exact(uri)?,
            (None, Some(regex)) => UriMatcher::regex(regex)?,
            _ => return Err(PatternError::Config("invalid uri configuration".to_string())),
        };

        let mut options = PatternOptions::new();
        if let Some(query) = &self.query {
            options.query = Some(match query {
                QueryConfig::Raw(raw) => QueryParams::Raw(raw.clone()),
                QueryConfig::Map(map) => QueryParams::Map(
                    map.iter()
                        .map(|(k, v)| (k.clone(), stringify_scalars(v)))
                        .collect(),
                ),
            });
        }
        if let Some(headers) = &self.headers {
            let mut matcher = HeadersMatcher::empty();
            for (name, value) in headers {
                matcher = matcher.header(name, header_value(value)?);
            }
            options.headers = Some(matcher);
        }
        if let Some(body) = &self.body {
            options.body = Some(body_pattern(body)?);
        }

        Ok(RequestPattern::new(self.method.as_str(), uri, options))
    }
}

/// `{ matches: "re" }` leaves.
fn regex_leaf(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) if map.len() == 1 => map.get(REGEX_KEY).and_then(Value::as_str),
        _ => None,
    }
}

/// Top-level scalars compare against the raw body text, so YAML numbers and
/// booleans become their string form. Leaves of a mapping keep their type.
fn body_pattern(value: &Value) -> Result<BodyPattern> {
    match value {
        Value::Number(_) | Value::Bool(_) => {
            Ok(BodyPattern::Scalar(ValueMatcher::Exact(stringify_scalars(value))))
        }
        other => body_entry(other),
    }
}

fn body_entry(value: &Value) -> Result<BodyPattern> {
    if let Some(regex) = regex_leaf(value) {
        return Ok(BodyPattern::Scalar(ValueMatcher::regex(regex)?));
    }
    match value {
        Value::Object(map) => {
            let mut entries = BTreeMap::new();
            for (key, nested) in map {
                entries.insert(key.clone(), body_entry(nested)?);
            }
            Ok(BodyPattern::Mapping(entries))
        }
        other => Ok(BodyPattern::Scalar(ValueMatcher::Exact(other.clone()))),
    }
}

/// Header values are always text, so YAML numbers and booleans are
/// compared as their string form.
fn header_value(value: &Value) -> Result<ValueMatcher> {
    if let Some(regex) = regex_leaf(value) {
        return ValueMatcher::regex(regex);
    }
    match value {
        Value::Object(_) => Err(PatternError::Config(format!(
            "header value must be a string, a list or {{ {REGEX_KEY}: <regex> }}, got {value}"
        ))),
        other => Ok(ValueMatcher::Exact(stringify_scalars(other))),
    }
}

fn stringify_scalars(value: &Value) -> Value {
    match value {
        Value::Number(n) => Value::String(n.to_string()),
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Array(items) => Value::Array(items.iter().map(stringify_scalars).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), stringify_scalars(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}
