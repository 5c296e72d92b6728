//! Captured request attributes used as matching input.

use crate::error::Result;
use crate::uri::NormalizedUri;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A header value as captured: a single value or the list of values sent
/// under the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Single(String),
    Multiple(Vec<String>),
}

impl HeaderValue {
    /// The first value, if any.
    pub fn first(&self) -> Option<&str> {
        match self {
            HeaderValue::Single(v) => Some(v),
            HeaderValue::Multiple(vs) => vs.first().map(String::as_str),
        }
    }

    /// The value as a matchable [`Value`]: a string, or an array of strings.
    pub fn to_value(&self) -> Value {
        match self {
            HeaderValue::Single(v) => Value::String(v.clone()),
            HeaderValue::Multiple(vs) => {
                Value::Array(vs.iter().cloned().map(Value::String).collect())
            }
        }
    }

    fn push(&mut self, other: HeaderValue) {
        let mut values = match std::mem::replace(self, HeaderValue::Multiple(Vec::new())) {
            HeaderValue::Single(v) => vec![v],
            HeaderValue::Multiple(vs) => vs,
        };
        match other {
            HeaderValue::Single(v) => values.push(v),
            HeaderValue::Multiple(vs) => values.extend(vs),
        }
        *self = HeaderValue::Multiple(values);
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        HeaderValue::Single(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        HeaderValue::Single(value)
    }
}

impl From<Vec<String>> for HeaderValue {
    fn from(values: Vec<String>) -> Self {
        HeaderValue::Multiple(values)
    }
}

impl From<Vec<&str>> for HeaderValue {
    fn from(values: Vec<&str>) -> Self {
        HeaderValue::Multiple(values.into_iter().map(str::to_string).collect())
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Single(v) => write!(f, "{v:?}"),
            HeaderValue::Multiple(vs) => write!(f, "{vs:?}"),
        }
    }
}

/// Headers as captured, keyed by the name the client used.
pub type Headers = HashMap<String, HeaderValue>;

/// Headers keyed by lowercased name, sorted.
pub type CanonicalHeaders = BTreeMap<String, HeaderValue>;

/// Fold header names to lowercase. Names that collide after folding have
/// their values combined into a list.
pub fn canonicalize_headers(headers: &Headers) -> CanonicalHeaders {
    let mut entries: Vec<_> = headers.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let mut canonical = CanonicalHeaders::new();
    for (name, value) in entries {
        let name = name.to_ascii_lowercase();
        match canonical.get_mut(&name) {
            Some(existing) => existing.push(value.clone()),
            None => {
                canonical.insert(name, value.clone());
            }
        }
    }
    canonical
}

/// The attributes of an outbound request that patterns are matched against.
#[derive(Debug, Clone)]
pub struct RequestSignature {
    /// Lowercase method token, e.g. `"get"`.
    pub method: String,
    pub uri: NormalizedUri,
    pub headers: Option<Headers>,
    pub body: Option<String>,
}

impl RequestSignature {
    pub fn new(method: &str, uri: NormalizedUri) -> Self {
        Self {
            method: method.to_ascii_lowercase(),
            uri,
            headers: None,
            body: None,
        }
    }

    /// Build a signature from a method and a textual URI.
    pub fn parse(method: &str, uri: &str) -> Result<Self> {
        Ok(Self::new(method, NormalizedUri::parse(uri)?))
    }

    /// Build a signature from `hyper` request parts.
    pub fn from_hyper(
        method: &hyper::Method,
        uri: &hyper::Uri,
        headers: &hyper::HeaderMap,
        body: Option<&str>,
    ) -> Result<Self> {
        let mut signature = Self::parse(method.as_str(), &uri.to_string())?;

        let mut captured = Headers::new();
        for name in headers.keys() {
            let values: Vec<String> = headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect();
            let value = match values.len() {
                1 => HeaderValue::Single(values.into_iter().next().unwrap_or_default()),
                _ => HeaderValue::Multiple(values),
            };
            captured.insert(name.as_str().to_string(), value);
        }
        if !captured.is_empty() {
            signature.headers = Some(captured);
        }
        signature.body = body.map(str::to_string);
        Ok(signature)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Look up a header by name, ignoring case. Names that differ only in
    /// case are combined the same way [`canonicalize_headers`] combines them.
    pub fn header(&self, name: &str) -> Option<HeaderValue> {
        canonicalize_headers(self.headers.as_ref()?).remove(&name.to_ascii_lowercase())
    }

    /// The declared content type (first value when several were sent), or
    /// `""` when none was sent.
    pub fn content_type(&self) -> String {
        self.header("Content-Type")
            .and_then(|value| value.first().map(str::to_string))
            .unwrap_or_default()
    }
}

impl fmt::Display for RequestSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method.to_ascii_uppercase(), self.uri)?;
        if let Some(body) = &self.body {
            write!(f, " with body {body:?}")?;
        }
        if let Some(headers) = &self.headers {
            let rendered: Vec<String> = canonicalize_headers(headers)
                .iter()
                .map(|(name, value)| format!("{name:?}: {value}"))
                .collect();
            write!(f, " with headers {{{}}}", rendered.join(", "))?;
        }
        Ok(())
    }
}
