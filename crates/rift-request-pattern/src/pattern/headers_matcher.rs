//! Header matching: case-insensitive subset comparison.

use super::matcher::ValueMatcher;
use crate::signature::{canonicalize_headers, Headers};
use std::collections::BTreeMap;
use std::fmt;

/// Expected headers keyed by lowercased name.
///
/// An empty matcher is still a constraint: it only accepts requests that
/// carry no headers at all. Leave the matcher off a pattern to accept any
/// headers.
#[derive(Debug, Clone, Default)]
pub struct HeadersMatcher {
    expected: BTreeMap<String, ValueMatcher>,
}

impl HeadersMatcher {
    pub fn new<I, K, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<ValueMatcher>,
    {
        let expected = headers
            .into_iter()
            .map(|(name, value)| (name.as_ref().to_ascii_lowercase(), value.into()))
            .collect();
        Self { expected }
    }

    /// A matcher that accepts only requests without headers.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: &str, value: impl Into<ValueMatcher>) -> Self {
        self.expected.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.expected.is_empty()
    }

    pub fn matches(&self, headers: Option<&Headers>) -> bool {
        let actual = headers.map(canonicalize_headers).unwrap_or_default();

        if self.expected.is_empty() {
            return actual.is_empty();
        }
        if actual.is_empty() {
            return false;
        }

        self.expected.iter().all(|(name, matcher)| {
            actual
                .get(name)
                .is_some_and(|value| matcher.matches(&value.to_value()))
        })
    }
}

impl fmt::Display for HeadersMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, matcher)) in self.expected.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name:?}: {matcher}")?;
        }
        f.write_str("}")
    }
}
